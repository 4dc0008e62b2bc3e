//! Drives ICE gathering/checks, the DTLS handshake, and SCTP bring-up to
//! completion, reporting back through a single event channel so
//! `PeerConnection` never has to block a public method on network I/O.
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::dtls::dtls_role::DtlsRole;
use crate::ice::type_ice::ice_agent::IceRole;
use crate::log::log_sink::LogSink;
use crate::pc::config::IceServerConfig;
use crate::pc::data_channel::OpenRequest;
use crate::pc::error::OrchestratorError;
use crate::pc::ice_candidate::IceCandidate;
use crate::pc::transport::{
    DtlsConnectionState, DtlsTransport, IceConnectionState, IceGatheringState, IceReactor, IceTransport,
    SctpTransport,
};
use crate::sctp::events::SctpEvents;
use crate::{sink_error, sink_info};

/// Reported back to `PeerConnection` as the connect sequence progresses.
#[derive(Debug)]
pub enum ConnectEvent {
    IceConnected,
    DtlsConnected,
    SctpConnected,
    DataChannelOpen { id: u16, request: OpenRequest },
    DataChannelAck { id: u16 },
    DataChannelMessage { id: u16, payload: Vec<u8> },
    ChannelClosed { id: u16 },
    Failed(OrchestratorError),
}

/// Owns the ICE/DTLS/SCTP transports for one `application` m-section and
/// advances them each time `poll` is called.
pub struct ConnectDriver {
    ice: IceTransport,
    reactor: Option<IceReactor>,
    sctp: Option<SctpTransport>,
    dtls: Option<DtlsTransport>,
    dtls_role: DtlsRole,
    logger: Arc<dyn LogSink>,
    config: Arc<Config>,
    ice_timeout: Duration,
    expected_fingerprint: Option<String>,
    dtls_done_tx: Sender<Result<SctpTransport, OrchestratorError>>,
    dtls_done_rx: Receiver<Result<SctpTransport, OrchestratorError>>,
    dtls_in_flight: bool,
}

impl ConnectDriver {
    #[must_use]
    pub fn new(
        ice_role: IceRole,
        dtls_role: DtlsRole,
        logger: Arc<dyn LogSink>,
        config: Arc<Config>,
        ice_timeout: Duration,
        ice_servers: &[IceServerConfig],
    ) -> Self {
        let (dtls_done_tx, dtls_done_rx) = channel();
        Self {
            ice: IceTransport::new(ice_role, logger.clone(), ice_servers),
            reactor: None,
            sctp: None,
            dtls: None,
            dtls_role,
            logger,
            config,
            ice_timeout,
            expected_fingerprint: None,
            dtls_done_tx,
            dtls_done_rx,
            dtls_in_flight: false,
        }
    }

    pub fn set_expected_fingerprint(&mut self, fingerprint: String) {
        self.expected_fingerprint = Some(fingerprint);
    }

    /// Finalizes the DTLS role once SDP negotiation has resolved it — at
    /// construction time only the offerer/answerer distinction is known,
    /// not which side the `a=setup` exchange actually assigns.
    pub fn set_dtls_role(&mut self, role: DtlsRole) {
        self.dtls_role = role;
    }

    #[must_use]
    pub fn local_credentials(&self) -> (String, String) {
        self.ice.local_credentials()
    }

    #[must_use]
    pub fn gathering_state(&self) -> IceGatheringState {
        self.ice.gathering_state()
    }

    #[must_use]
    pub fn sctp(&self) -> Option<&SctpTransport> {
        self.sctp.as_ref()
    }

    #[must_use]
    pub fn dtls_state(&self) -> Option<DtlsConnectionState> {
        self.dtls.as_ref().map(DtlsTransport::state)
    }

    pub fn set_remote_credentials(&mut self, ufrag: String, pwd: String) {
        self.ice.set_remote_credentials(ufrag, pwd);
    }

    /// # Errors
    ///
    /// Returns `OrchestratorError::TransportFailure` if candidate gathering fails.
    pub fn gather_local_candidates(&mut self) -> Result<Vec<IceCandidate>, OrchestratorError> {
        self.ice.gather_local_candidates()
    }

    /// # Errors
    ///
    /// Returns `OrchestratorError::InvalidArgument` if `line` isn't a valid
    /// candidate attribute.
    pub fn add_remote_candidate(&mut self, line: &str) -> Result<(), OrchestratorError> {
        self.ice.add_remote_candidate(line)
    }

    /// Starts ICE connectivity checks and the background packet reactor.
    /// Both local and remote descriptions must already be set.
    pub fn start(&mut self) {
        self.ice.start_connectivity_checks();
        self.reactor = Some(self.ice.spawn_reactor());
    }

    /// Drains pending network activity and returns every event produced
    /// since the last call. Must be polled regularly while connecting.
    pub fn poll(&mut self) -> Vec<ConnectEvent> {
        let mut events = Vec::new();

        if let Some(reactor) = &self.reactor {
            while let Some((packet, from)) = reactor.try_recv() {
                self.ice.handle_incoming_packet(&packet, from);
            }
        }

        if self.ice.state() == IceConnectionState::Checking
            && !self.dtls_in_flight
            && let Some((sock, remote)) = self.ice.nominate()
        {
            events.push(ConnectEvent::IceConnected);
            self.spawn_dtls_handshake(sock, remote);
        }

        if self.dtls_in_flight
            && let Ok(result) = self.dtls_done_rx.try_recv()
        {
            self.dtls_in_flight = false;
            match result {
                Ok(sctp) => {
                    events.push(ConnectEvent::DtlsConnected);
                    self.dtls = Some(DtlsTransport::new());
                    self.sctp = Some(sctp);
                }
                Err(e) => {
                    sink_error!(self.logger, "[CONNECT] DTLS handshake failed: {}", e);
                    events.push(ConnectEvent::Failed(e));
                }
            }
        }

        if let Some(sctp) = &self.sctp {
            while let Ok(event) = sctp.events.try_recv() {
                if matches!(event, SctpEvents::Shutdown) {
                    if let Some(dtls) = &mut self.dtls {
                        dtls.close();
                    }
                    continue;
                }
                if let Some(mapped) = map_sctp_event(event) {
                    events.push(mapped);
                }
            }
        }

        events
    }

    fn spawn_dtls_handshake(&mut self, sock: Arc<UdpSocket>, remote: SocketAddr) {
        self.dtls_in_flight = true;
        let role = self.dtls_role;
        let logger = self.logger.clone();
        let config = self.config.clone();
        let timeout = self.ice_timeout;
        let fingerprint = self.expected_fingerprint.clone();
        let done_tx = self.dtls_done_tx.clone();

        sink_info!(self.logger, "[CONNECT] ICE nominated, starting DTLS handshake with {}", remote);

        thread::spawn(move || {
            let (events_tx, events_rx) = SctpTransport::channel();
            let result = DtlsTransport::handshake_and_start_sctp(
                sock, remote, role, logger, timeout, fingerprint, config, events_tx,
            )
            .map(|session| SctpTransport::new(session, events_rx));
            let _ = done_tx.send(result);
        });
    }

    /// # Errors
    ///
    /// Returns `OrchestratorError::InvalidState` if SCTP hasn't connected yet.
    pub fn open_channel(&self, id: u16, open_payload: Vec<u8>) -> Result<(), OrchestratorError> {
        let sctp = self.sctp.as_ref().ok_or_else(|| {
            OrchestratorError::InvalidState("SCTP association not established yet".to_owned())
        })?;
        sctp.open_channel(id, open_payload);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `OrchestratorError::InvalidState` if SCTP hasn't connected yet.
    pub fn send_message(&self, id: u16, payload: Vec<u8>) -> Result<(), OrchestratorError> {
        let sctp = self.sctp.as_ref().ok_or_else(|| {
            OrchestratorError::InvalidState("SCTP association not established yet".to_owned())
        })?;
        sctp.send_message(id, payload);
        Ok(())
    }

    pub fn close_channel(&self, id: u16) {
        if let Some(sctp) = &self.sctp {
            sctp.close_channel(id);
        }
    }

    pub fn close(&mut self) {
        if let Some(sctp) = self.sctp.take() {
            sctp.shutdown();
        }
        if let Some(dtls) = &mut self.dtls {
            dtls.close();
        }
        if let Some(reactor) = &mut self.reactor {
            reactor.stop();
        }
        self.ice.close();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::log::NoopLogSink;

    fn new_driver() -> ConnectDriver {
        ConnectDriver::new(
            IceRole::Controlling,
            DtlsRole::Server,
            Arc::new(NoopLogSink),
            Arc::new(Config::empty()),
            Duration::from_secs(5),
            &[],
        )
    }

    #[test]
    fn local_credentials_are_nonempty() {
        let driver = new_driver();
        let (ufrag, pwd) = driver.local_credentials();
        assert!(!ufrag.is_empty());
        assert!(!pwd.is_empty());
    }

    #[test]
    fn add_remote_candidate_accepts_valid_rejects_garbage() {
        let mut driver = new_driver();
        assert!(driver.add_remote_candidate("1 1 udp 2130706431 10.0.0.1 5000 typ host").is_ok());
        assert!(driver.add_remote_candidate("not a candidate line").is_err());
    }

    #[test]
    fn set_dtls_role_overrides_constructor_role() {
        let mut driver = new_driver();
        driver.set_dtls_role(DtlsRole::Client);
        assert_eq!(driver.dtls_role, DtlsRole::Client);
    }

    #[test]
    fn open_channel_before_sctp_connects_is_invalid_state() {
        let driver = new_driver();
        let err = driver.open_channel(1, vec![0u8; 4]).unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidState(_)));
    }

    #[test]
    fn send_message_before_sctp_connects_is_invalid_state() {
        let driver = new_driver();
        let err = driver.send_message(1, b"hi".to_vec()).unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidState(_)));
    }

    #[test]
    fn close_channel_and_close_are_no_ops_without_sctp() {
        let mut driver = new_driver();
        driver.close_channel(1);
        driver.close();
    }

    #[test]
    fn gathering_state_starts_new() {
        let driver = new_driver();
        assert_eq!(driver.gathering_state(), IceGatheringState::New);
    }

    #[test]
    fn dtls_state_is_none_before_handshake() {
        let driver = new_driver();
        assert!(driver.dtls_state().is_none());
    }

    #[test]
    fn sctp_accessor_is_none_before_handshake() {
        let driver = new_driver();
        assert!(driver.sctp().is_none());
    }
}

fn map_sctp_event(event: SctpEvents) -> Option<ConnectEvent> {
    match event {
        SctpEvents::SctpConnected => Some(ConnectEvent::SctpConnected),
        SctpEvents::ReceivedDcepOpen { id, request } => {
            Some(ConnectEvent::DataChannelOpen { id, request })
        }
        SctpEvents::ReceivedDcepAck { id } => Some(ConnectEvent::DataChannelAck { id }),
        SctpEvents::ReceivedMessage { id, payload } => {
            Some(ConnectEvent::DataChannelMessage { id, payload })
        }
        SctpEvents::ChannelClosed { id } => Some(ConnectEvent::ChannelClosed { id }),
        SctpEvents::SctpErr(msg) => {
            Some(ConnectEvent::Failed(OrchestratorError::TransportFailure(msg)))
        }
        _ => None,
    }
}
