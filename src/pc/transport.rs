//! ICE / DTLS / SCTP assembly behind a single BUNDLEd transport.
//!
//! Since this orchestrator only ever negotiates one `application` m-section,
//! there is exactly one ICE transport, one DTLS transport riding on top of
//! it, and one SCTP association riding on top of that — every data channel
//! is just a stream within it.
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::dtls::dtls_role::DtlsRole;
use crate::dtls::runtime::run_dtls_handshake;
use crate::ice::type_ice::candidate::Candidate;
use crate::ice::type_ice::ice_agent::{BINDING_REQUEST, IceAgent, IceRole};
use crate::log::log_sink::LogSink;
use crate::pc::config::IceServerConfig;
use crate::pc::error::OrchestratorError;
use crate::pc::ice_candidate::IceCandidate;
use crate::sctp::events::SctpEvents;
use crate::sctp::sctp_session::SctpSession;
use std::sync::mpsc::{Receiver, Sender, channel};

/// `RTCIceGatheringState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IceGatheringState {
    New,
    Gathering,
    Complete,
}

/// `RTCIceConnectionState`, restricted to the subset this orchestrator's
/// single-pair nomination model can actually produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IceConnectionState {
    New,
    Checking,
    Connected,
    Failed,
    Closed,
}

/// Pulls the first configured STUN server's host:port out of its `stun:` URL,
/// for the one STUN hit `IceAgent::gather_candidates` makes per gathering
/// pass. `None` leaves the agent's own built-in server in place.
fn configured_stun_host(ice_servers: &[IceServerConfig]) -> Option<String> {
    let url = ice_servers.first()?.urls.first()?;
    Some(url.strip_prefix("stun:").unwrap_or(url).to_owned())
}

/// Wraps `IceAgent` with the mid/credential bookkeeping the orchestrator
/// needs to fold ICE into a single `application` SDP section.
pub struct IceTransport {
    agent: IceAgent,
    state: IceConnectionState,
    gathering_state: IceGatheringState,
    stun_host: Option<String>,
}

impl IceTransport {
    #[must_use]
    pub fn new(role: IceRole, logger: Arc<dyn LogSink>, ice_servers: &[IceServerConfig]) -> Self {
        Self {
            agent: IceAgent::with_logger(role, logger),
            state: IceConnectionState::New,
            gathering_state: IceGatheringState::New,
            stun_host: configured_stun_host(ice_servers),
        }
    }

    #[must_use]
    pub fn gathering_state(&self) -> IceGatheringState {
        self.gathering_state
    }

    #[must_use]
    pub fn local_credentials(&self) -> (String, String) {
        self.agent.local_credentials()
    }

    pub fn set_remote_credentials(&mut self, ufrag: String, pwd: String) {
        self.agent.set_remote_ufrag(ufrag);
        self.agent.set_remote_pwd(pwd);
    }

    /// Gathers host + server-reflexive candidates and returns them encoded
    /// for the local SDP's `a=candidate` lines.
    ///
    /// # Errors
    ///
    /// Returns `OrchestratorError::TransportFailure` if gathering fails.
    pub fn gather_local_candidates(&mut self) -> Result<Vec<IceCandidate>, OrchestratorError> {
        self.gathering_state = IceGatheringState::Gathering;
        let candidates = self
            .agent
            .gather_candidates_with_stun(self.stun_host.as_deref())
            .map_err(|e| OrchestratorError::TransportFailure(e.to_string()))?;
        let out = candidates
            .iter()
            .map(|c| IceCandidate::new(c.clone_light(), None, None))
            .collect();
        self.gathering_state = IceGatheringState::Complete;
        Ok(out)
    }

    /// # Errors
    ///
    /// Returns `OrchestratorError::InvalidArgument` if `line` isn't a valid
    /// RFC 8445 §5.1 candidate attribute.
    pub fn add_remote_candidate(&mut self, line: &str) -> Result<(), OrchestratorError> {
        let ice: IceCandidate = line.parse()?;
        let candidate = ice.to_candidate()?;
        self.agent.add_remote_candidate(candidate);
        Ok(())
    }

    pub fn start_connectivity_checks(&mut self) {
        self.state = IceConnectionState::Checking;
        self.agent.form_candidate_pairs();
        self.agent.start_checks();
    }

    /// Picks the highest-priority succeeded pair and hands back the local
    /// socket and remote address the DTLS handshake should run over.
    pub fn nominate(&mut self) -> Option<(Arc<UdpSocket>, SocketAddr)> {
        let pair = self.agent.select_valid_pair()?;
        let socket = pair.local.socket.clone()?;
        let remote = pair.remote.address;
        self.state = IceConnectionState::Connected;
        Some((socket, remote))
    }

    #[must_use]
    pub fn state(&self) -> IceConnectionState {
        self.state
    }

    pub fn close(&mut self) {
        self.state = IceConnectionState::Closed;
    }

    /// Spawns a background thread draining every local candidate's socket
    /// and periodically re-sending `BINDING_REQUEST` to each formed pair's
    /// remote address, handing inbound packets back over `rx`.
    #[must_use]
    pub fn spawn_reactor(&self) -> IceReactor {
        let run = Arc::new(AtomicBool::new(true));
        let (tx, rx) = channel();

        let sockets: Vec<Arc<UdpSocket>> = self
            .agent
            .local_candidates
            .iter()
            .filter_map(|c| c.socket.clone())
            .collect();

        let mut targets_per_sock: Vec<Vec<SocketAddr>> = vec![Vec::new(); sockets.len()];
        for pair in &self.agent.candidate_pairs {
            if let Some(ls) = &pair.local.socket
                && let Some(idx) = sockets.iter().position(|s| Arc::ptr_eq(s, ls))
            {
                targets_per_sock[idx].push(pair.remote.address);
            }
        }

        let run2 = Arc::clone(&run);
        let handle = thread::spawn(move || {
            for s in &sockets {
                let _ = s.set_nonblocking(true);
            }
            let mut buf = [0u8; 1500];
            let resend_every = Duration::from_millis(200);
            let mut last_tx = Instant::now();

            while run2.load(Ordering::SeqCst) {
                for s in &sockets {
                    loop {
                        match s.recv_from(&mut buf) {
                            Ok((n, from)) => {
                                let _ = tx.send((buf[..n].to_vec(), from));
                            }
                            Err(ref e)
                                if e.kind() == std::io::ErrorKind::WouldBlock
                                    || e.kind() == std::io::ErrorKind::TimedOut =>
                            {
                                break;
                            }
                            Err(_) => break,
                        }
                    }
                }
                if last_tx.elapsed() >= resend_every {
                    for (i, s) in sockets.iter().enumerate() {
                        for &dst in &targets_per_sock[i] {
                            let _ = s.send_to(BINDING_REQUEST, dst);
                        }
                    }
                    last_tx = Instant::now();
                }
                thread::sleep(Duration::from_millis(20));
            }
        });

        IceReactor {
            run,
            rx,
            handle: Some(handle),
        }
    }

    /// Feeds one packet read off a reactor socket into the ICE agent.
    pub fn handle_incoming_packet(&mut self, packet: &[u8], from: SocketAddr) {
        self.agent.handle_incoming_packet(packet, from);
    }
}

/// Background packet pump for connectivity checks, adapted from the
/// connection manager's ICE worker: one thread per `IceTransport` draining
/// every local candidate socket and forwarding inbound datagrams to whoever
/// drives the connect sequence.
pub struct IceReactor {
    run: Arc<AtomicBool>,
    rx: Receiver<(Vec<u8>, SocketAddr)>,
    handle: Option<thread::JoinHandle<()>>,
}

impl IceReactor {
    #[must_use]
    pub fn try_recv(&self) -> Option<(Vec<u8>, SocketAddr)> {
        self.rx.try_recv().ok()
    }

    pub fn stop(&mut self) {
        self.run.store(false, Ordering::SeqCst);
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

impl Drop for IceReactor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// `RTCDtlsTransportState`, restricted to the states this orchestrator's
/// single DTLS transport per connection can actually report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtlsConnectionState {
    New,
    Connected,
    Closed,
}

/// The DTLS transport riding on top of the nominated ICE pair, carrying the
/// SCTP association. One instance exists once the handshake completes; it
/// only ever moves from `Connected` to `Closed`.
pub struct DtlsTransport {
    state: DtlsConnectionState,
}

impl Default for DtlsTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl DtlsTransport {
    #[must_use]
    pub fn new() -> Self {
        Self { state: DtlsConnectionState::Connected }
    }

    #[must_use]
    pub fn state(&self) -> DtlsConnectionState {
        self.state
    }

    pub fn close(&mut self) {
        self.state = DtlsConnectionState::Closed;
    }

    /// Runs the handshake and starts the SCTP association on top of it.
    ///
    /// # Errors
    ///
    /// Returns `OrchestratorError::TransportFailure` if the handshake fails.
    #[allow(clippy::too_many_arguments)]
    pub fn handshake_and_start_sctp(
        sock: Arc<UdpSocket>,
        peer: SocketAddr,
        role: DtlsRole,
        logger: Arc<dyn LogSink>,
        timeout: Duration,
        expected_fingerprint: Option<String>,
        config: Arc<Config>,
        parent_tx: Sender<SctpEvents>,
    ) -> Result<SctpSession, OrchestratorError> {
        let stream =
            run_dtls_handshake(sock, peer, role, logger.clone(), timeout, expected_fingerprint, config)?;
        let is_client = matches!(role, DtlsRole::Client);
        Ok(SctpSession::new(logger, parent_tx, stream, is_client))
    }
}

/// Owns the SCTP association and the channel used to hear back from it.
pub struct SctpTransport {
    session: SctpSession,
    pub events: Receiver<SctpEvents>,
}

impl SctpTransport {
    #[must_use]
    pub fn new(session: SctpSession, events: Receiver<SctpEvents>) -> Self {
        Self { session, events }
    }

    /// Builds the `mpsc` pair `DtlsTransport::handshake_and_start_sctp`
    /// expects as its `parent_tx`, and the matching receiver for events this
    /// transport produces (`ReceivedDcepOpen`, `ReceivedMessage`, ...).
    #[must_use]
    pub fn channel() -> (Sender<SctpEvents>, Receiver<SctpEvents>) {
        channel()
    }

    pub fn open_channel(&self, id: u16, open_payload: Vec<u8>) {
        self.session.open_channel(id, open_payload);
    }

    pub fn send_message(&self, id: u16, payload: Vec<u8>) {
        self.session.send_message(id, payload);
    }

    pub fn close_channel(&self, id: u16) {
        self.session.close_channel(id);
    }

    pub fn deliver_incoming_dtls_payload(&self, packet: Vec<u8>) {
        self.session.handle_sctp_packet(packet);
    }

    pub fn shutdown(&self) {
        self.session.shutdown();
    }
}

/// Encodes a candidate the way `pc::session_description` expects it for the
/// `a=candidate` line, without importing `pc::ice_candidate`'s internals.
#[must_use]
pub fn candidate_sdp_line(c: &Candidate) -> String {
    IceCandidate::new(c.clone_light(), None, None).candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::NoopLogSink;

    #[test]
    fn reactor_has_no_packets_with_no_local_candidates() {
        let transport = IceTransport::new(IceRole::Controlling, Arc::new(NoopLogSink), &[]);
        let mut reactor = transport.spawn_reactor();
        assert!(reactor.try_recv().is_none());
        reactor.stop();
    }

    #[test]
    fn reactor_stop_is_idempotent() {
        let transport = IceTransport::new(IceRole::Controlling, Arc::new(NoopLogSink), &[]);
        let mut reactor = transport.spawn_reactor();
        reactor.stop();
        reactor.stop();
    }

    #[test]
    fn new_transport_starts_in_new_state() {
        let transport = IceTransport::new(IceRole::Controlled, Arc::new(NoopLogSink), &[]);
        assert_eq!(transport.state(), IceConnectionState::New);
    }
}
