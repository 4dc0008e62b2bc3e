//! The public `PeerConnection` orchestrator: owns the signalling state, the
//! SDP slots, the single ICE/DTLS/SCTP transport stack, and the data
//! channels riding on it. A plain `&mut self`-method struct driven by a
//! single caller thread, the way `ConnectionManager`/`Engine` are — the
//! background worker threads the transports need report back through
//! `ConnectDriver::poll`, drained by `PeerConnection::poll`.
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::Duration;

use crate::config::Config;
use crate::dtls::dtls_role::DtlsRole;
use crate::ice::type_ice::ice_agent::IceRole;
use crate::log::NoopLogSink;
use crate::log::log_sink::LogSink;
use crate::pc::config::PeerConnectionConfig;
use crate::pc::connect_driver::{ConnectDriver, ConnectEvent};
use crate::pc::data_channel::{DataChannel, DataChannelInit, DataChannelState, StreamIdAllocator, encode_open};
use crate::pc::error::OrchestratorError;
use crate::pc::ice_candidate::IceCandidate;
use crate::pc::session_description::{
    ApplicationSectionParams, DtlsSetup, SessionDescription, answer_setup_for, build_session_description,
    dtls_role_from_setup,
};
use crate::pc::signaling_state::{SdpType, Side, SignalingState, next_state};
use crate::pc::state_aggregator::{self, PeerConnectionState};
use crate::pc::transport::{DtlsConnectionState, IceConnectionState, IceGatheringState, SctpTransport};
use crate::sdp::attribute::Attribute;
use crate::sdp::media::Media;
use crate::{sink_error, sink_info, sink_warn};
use crate::tls_utils::get_local_fingerprint_sha256;

const MID: &str = "0";

/// Surfaced to the application through `PeerConnection::events`.
#[derive(Debug)]
pub enum PeerConnectionEvent {
    SignalingStateChange(SignalingState),
    IceConnectionStateChange(IceConnectionState),
    IceGatheringStateChange(IceGatheringState),
    ConnectionStateChange(PeerConnectionState),
    DataChannel(DataChannel),
    DataChannelStateChange { id: u16, state: DataChannelState },
    Message { id: u16, payload: Vec<u8> },
    /// Every DTLS transport closed; `close()` has already run.
    RemoteShutdown,
}

/// A data-channel-only `RTCPeerConnection`. Negotiates exactly one bundled
/// `application` m-section carrying ICE/DTLS/SCTP, per RFC 8843 BUNDLE with
/// a single group member.
pub struct PeerConnection {
    logger: Arc<dyn LogSink>,
    config: PeerConnectionConfig,
    cert_config: Arc<Config>,
    fingerprint: String,

    signaling: SignalingState,
    pending_local: Option<SessionDescription>,
    current_local: Option<SessionDescription>,
    pending_remote: Option<SessionDescription>,
    current_remote: Option<SessionDescription>,

    driver: Option<ConnectDriver>,
    dtls_role: Option<DtlsRole>,
    ice_role: Option<IceRole>,
    sctp_connected: bool,
    ice_state: IceConnectionState,
    ice_gathering_state: IceGatheringState,
    connection_state: PeerConnectionState,
    legacy_sctp_sdp: bool,

    stream_ids: Option<StreamIdAllocator>,
    channels: HashMap<u16, DataChannel>,
    pending_channel_opens: Vec<(u16, DataChannelInit)>,

    events_tx: Sender<PeerConnectionEvent>,
    events_rx: Receiver<PeerConnectionEvent>,
    closed: bool,
}

impl PeerConnection {
    /// # Errors
    ///
    /// Returns `OrchestratorError::TransportFailure` if the local DTLS
    /// certificate's fingerprint cannot be computed.
    pub fn new(config: PeerConnectionConfig, cert_config: Config) -> Result<Self, OrchestratorError> {
        Self::with_logger(config, cert_config, Arc::new(NoopLogSink))
    }

    /// # Errors
    ///
    /// Returns `OrchestratorError::TransportFailure` if the local DTLS
    /// certificate's fingerprint cannot be computed.
    pub fn with_logger(
        config: PeerConnectionConfig,
        cert_config: Config,
        logger: Arc<dyn LogSink>,
    ) -> Result<Self, OrchestratorError> {
        let cert_config = Arc::new(cert_config);
        let fingerprint = get_local_fingerprint_sha256(&cert_config)
            .map_err(|e| OrchestratorError::TransportFailure(e.to_string()))?;
        let (events_tx, events_rx) = channel();

        Ok(Self {
            logger,
            config,
            cert_config,
            fingerprint,
            signaling: SignalingState::Stable,
            pending_local: None,
            current_local: None,
            pending_remote: None,
            current_remote: None,
            driver: None,
            dtls_role: None,
            ice_role: None,
            sctp_connected: false,
            ice_state: IceConnectionState::New,
            ice_gathering_state: IceGatheringState::New,
            connection_state: PeerConnectionState::New,
            legacy_sctp_sdp: false,
            stream_ids: None,
            channels: HashMap::new(),
            pending_channel_opens: Vec::new(),
            events_tx,
            events_rx,
            closed: false,
        })
    }

    #[must_use]
    pub fn signaling_state(&self) -> SignalingState {
        self.signaling
    }

    #[must_use]
    pub fn ice_connection_state(&self) -> IceConnectionState {
        self.ice_state
    }

    #[must_use]
    pub fn connection_state(&self) -> PeerConnectionState {
        self.connection_state
    }

    #[must_use]
    pub fn ice_gathering_state(&self) -> IceGatheringState {
        self.ice_gathering_state
    }

    /// The SCTP transport carrying every data channel, once the DTLS
    /// handshake it rides on has completed.
    #[must_use]
    pub fn sctp(&self) -> Option<&SctpTransport> {
        self.driver.as_ref().and_then(ConnectDriver::sctp)
    }

    #[must_use]
    pub fn local_description(&self) -> Option<&SessionDescription> {
        self.pending_local.as_ref().or(self.current_local.as_ref())
    }

    #[must_use]
    pub fn remote_description(&self) -> Option<&SessionDescription> {
        self.pending_remote.as_ref().or(self.current_remote.as_ref())
    }

    #[must_use]
    pub fn events(&self) -> &Receiver<PeerConnectionEvent> {
        &self.events_rx
    }

    /// Builds a fresh offer. Does not mutate any signalling state — the
    /// offer only takes effect once passed to `set_local_description`.
    ///
    /// # Errors
    ///
    /// Returns `OrchestratorError::InvalidState` if the connection is closed.
    pub fn create_offer(&mut self) -> Result<SessionDescription, OrchestratorError> {
        if self.closed {
            return Err(OrchestratorError::InvalidState(
                "RTCPeerConnection is closed".to_owned(),
            ));
        }
        self.ensure_driver(IceRole::Controlling, DtlsRole::Server);
        self.build_local_description(SdpType::Offer, DtlsSetup::ActPass)
    }

    /// Builds an answer to the current remote offer.
    ///
    /// # Errors
    ///
    /// Returns `OrchestratorError::InvalidState` if signalling isn't in
    /// `have-remote-offer`/`have-local-pranswer`.
    pub fn create_answer(&mut self) -> Result<SessionDescription, OrchestratorError> {
        if !matches!(
            self.signaling,
            SignalingState::HaveRemoteOffer | SignalingState::HaveLocalPranswer
        ) {
            return Err(OrchestratorError::InvalidState(format!(
                "Cannot create answer in signaling state \"{}\"",
                self.signaling
            )));
        }

        let remote_setup = self.remote_setup()?;
        let setup = answer_setup_for(remote_setup);
        self.build_local_description(SdpType::Answer, setup)
    }

    /// # Errors
    ///
    /// Returns `OrchestratorError::InvalidState` if the transition is
    /// illegal for the current signalling state, or the connection is
    /// closed.
    pub fn set_local_description(&mut self, desc: SessionDescription) -> Result<(), OrchestratorError> {
        if self.closed {
            return Err(OrchestratorError::InvalidState(
                "RTCPeerConnection is closed".to_owned(),
            ));
        }
        let next = next_state(self.signaling, Side::Local, desc.sdp_type)?;

        if matches!(desc.sdp_type, SdpType::Answer) {
            let offer = self
                .pending_remote
                .as_ref()
                .or(self.current_remote.as_ref())
                .ok_or_else(|| OrchestratorError::InvalidState("no remote offer to answer".to_owned()))?;
            Self::validate_answer_sections(offer, &desc)?;

            let setup = self.section_setup(&desc)?;
            if matches!(setup, DtlsSetup::ActPass) {
                return Err(OrchestratorError::InvalidArgument(
                    "answer cannot carry a=setup:actpass".to_owned(),
                ));
            }
            let role = dtls_role_from_setup(setup);
            self.dtls_role = Some(role);
            if let Some(driver) = &mut self.driver {
                driver.set_dtls_role(role);
            }
        }

        self.apply_signaling(next);
        match desc.sdp_type {
            SdpType::Answer => {
                self.current_local = Some(desc);
                self.pending_local = None;
            }
            SdpType::Offer | SdpType::Pranswer => {
                self.pending_local = Some(desc);
            }
            SdpType::Rollback => {
                self.pending_local = None;
            }
        }

        self.maybe_start();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `OrchestratorError::InvalidState` if the transition is
    /// illegal, or `InvalidArgument` if the SDP is missing required ICE
    /// attributes.
    pub fn set_remote_description(&mut self, desc: SessionDescription) -> Result<(), OrchestratorError> {
        if self.closed {
            return Err(OrchestratorError::InvalidState(
                "RTCPeerConnection is closed".to_owned(),
            ));
        }
        let next = next_state(self.signaling, Side::Remote, desc.sdp_type)?;

        let setup = self.section_setup(&desc)?;
        if matches!(desc.sdp_type, SdpType::Answer) && matches!(setup, DtlsSetup::ActPass) {
            return Err(OrchestratorError::InvalidArgument(
                "remote answer cannot carry a=setup:actpass".to_owned(),
            ));
        }

        if matches!(desc.sdp_type, SdpType::Offer)
            && let Some(media) = Self::application_media(&desc)
        {
            self.legacy_sctp_sdp = Self::is_legacy_sctp_media(media);
        }

        if matches!(desc.sdp_type, SdpType::Answer) {
            let offer = self
                .pending_local
                .as_ref()
                .or(self.current_local.as_ref())
                .ok_or_else(|| OrchestratorError::InvalidState("no local offer to match this answer".to_owned()))?;
            Self::validate_answer_sections(offer, &desc)?;
        }

        let remote_is_ice_lite = self.section_attr(&desc, "ice-lite").is_some();
        let ice_role = if matches!(desc.sdp_type, SdpType::Offer) {
            if remote_is_ice_lite {
                IceRole::Controlling
            } else {
                IceRole::Controlled
            }
        } else {
            self.ice_role.clone().unwrap_or(IceRole::Controlling)
        };

        let dtls_role = if matches!(desc.sdp_type, SdpType::Offer) {
            DtlsRole::Server
        } else {
            dtls_role_from_setup(setup)
        };
        self.ensure_driver(ice_role, dtls_role);
        if matches!(desc.sdp_type, SdpType::Answer) {
            self.dtls_role = Some(dtls_role);
            if let Some(driver) = &mut self.driver {
                driver.set_dtls_role(dtls_role);
            }
        }

        let ufrag = self
            .section_attr(&desc, "ice-ufrag")
            .ok_or_else(|| OrchestratorError::InvalidArgument("remote SDP missing ice-ufrag".to_owned()))?;
        let pwd = self
            .section_attr(&desc, "ice-pwd")
            .ok_or_else(|| OrchestratorError::InvalidArgument("remote SDP missing ice-pwd".to_owned()))?;
        if let Some(driver) = &mut self.driver {
            driver.set_remote_credentials(ufrag, pwd);
        }

        let fingerprint = self.section_attr(&desc, "fingerprint");
        if let (Some(fp), Some(driver)) = (fingerprint, &mut self.driver) {
            let hex = fp.split_whitespace().nth(1).unwrap_or(&fp).to_owned();
            driver.set_expected_fingerprint(hex);
        }

        for line in self.section_candidates(&desc) {
            if let Some(driver) = &mut self.driver {
                if let Err(e) = driver.add_remote_candidate(&line) {
                    sink_warn!(self.logger, "[PC] ignoring malformed remote candidate: {}", e);
                }
            }
        }

        self.apply_signaling(next);
        match desc.sdp_type {
            SdpType::Answer => {
                self.current_remote = Some(desc);
                self.pending_remote = None;
            }
            SdpType::Offer | SdpType::Pranswer => {
                self.pending_remote = Some(desc);
            }
            SdpType::Rollback => {
                self.pending_remote = None;
            }
        }

        self.maybe_start();
        Ok(())
    }

    /// Forwards a trickled remote candidate to the transport and mirrors it
    /// into the matching media section(s) of the stored remote description,
    /// the way `ConnectionManager::add_remote_candidate` folds a trickled
    /// candidate back into its session state. `None` is the null candidate
    /// that marks end-of-candidates on every section.
    ///
    /// # Errors
    ///
    /// Returns `OrchestratorError::InvalidArgument` if the candidate line
    /// doesn't parse, or `InvalidState` if no transport has been assembled
    /// yet.
    pub fn add_ice_candidate(&mut self, candidate: Option<IceCandidate>) -> Result<(), OrchestratorError> {
        let Some(candidate) = candidate else {
            self.mark_end_of_candidates();
            return Ok(());
        };

        let driver = self
            .driver
            .as_mut()
            .ok_or_else(|| OrchestratorError::InvalidState("no transport to add a candidate to".to_owned()))?;
        driver.add_remote_candidate(&candidate.candidate)?;

        if let Some(desc) = self.pending_remote.as_mut().or(self.current_remote.as_mut()) {
            for media in &mut desc.sdp.media {
                if Self::media_matches_candidate(media, &candidate) {
                    media.add_attr(Attribute::new("candidate", Some(candidate.candidate.clone())));
                }
            }
        }
        Ok(())
    }

    fn mark_end_of_candidates(&mut self) {
        if let Some(desc) = self.pending_remote.as_mut().or(self.current_remote.as_mut()) {
            for media in &mut desc.sdp.media {
                media.add_attr(Attribute::new("end-of-candidates", None::<String>));
            }
        }
    }

    fn media_matches_candidate(media: &Media, candidate: &IceCandidate) -> bool {
        match &candidate.sdp_mid {
            Some(mid) => Self::media_mid(media).as_deref() == Some(mid.as_str()),
            None => true,
        }
    }

    /// Creates a data channel. If the SCTP association hasn't connected yet
    /// the DCEP `DATA_CHANNEL_OPEN` is queued and flushed once it does.
    ///
    /// # Errors
    ///
    /// Returns `OrchestratorError::InvalidArgument` if both
    /// `max_packet_life_time` and `max_retransmits` style reliability is
    /// ambiguous, or if the connection is closed.
    pub fn create_data_channel(&mut self, init: DataChannelInit) -> Result<DataChannel, OrchestratorError> {
        if self.closed {
            return Err(OrchestratorError::InvalidState(
                "RTCPeerConnection is closed".to_owned(),
            ));
        }
        let is_client = matches!(self.dtls_role, Some(DtlsRole::Client));
        let allocator = self
            .stream_ids
            .get_or_insert_with(|| StreamIdAllocator::new(is_client));
        let id = init.id.unwrap_or_else(|| allocator.allocate());

        let channel = DataChannel::new(id, &init);
        self.channels.insert(id, channel.clone());

        if let Some(driver) = &self.driver
            && self.sctp_connected
        {
            let _ = driver.open_channel(id, encode_open(&init));
        } else {
            self.pending_channel_opens.push((id, init));
        }

        Ok(channel)
    }

    /// # Errors
    ///
    /// Returns `OrchestratorError::InvalidState` if the SCTP association
    /// hasn't connected yet.
    pub fn send_message(&self, id: u16, payload: Vec<u8>) -> Result<(), OrchestratorError> {
        let driver = self
            .driver
            .as_ref()
            .ok_or_else(|| OrchestratorError::InvalidState("no transport to send on".to_owned()))?;
        driver.send_message(id, payload)
    }

    pub fn close_data_channel(&mut self, id: u16) {
        if let Some(driver) = &self.driver {
            driver.close_channel(id);
        }
        if let Some(ch) = self.channels.get_mut(&id) {
            ch.state = DataChannelState::Closing;
        }
        if let Some(allocator) = &mut self.stream_ids {
            allocator.free(id);
        }
    }

    /// Drains the connect driver's event queue and advances every derived
    /// state, emitting `PeerConnectionEvent`s. Must be called regularly
    /// while connecting (e.g. from the embedding application's own loop).
    pub fn poll(&mut self) {
        if self.closed {
            return;
        }
        self.flush_pending_channel_opens();

        let Some(driver) = &mut self.driver else {
            return;
        };
        for event in driver.poll() {
            match event {
                ConnectEvent::IceConnected => {
                    self.ice_state = IceConnectionState::Connected;
                    self.emit(PeerConnectionEvent::IceConnectionStateChange(self.ice_state));
                }
                ConnectEvent::DtlsConnected => {
                    sink_info!(self.logger, "[PC] DTLS connected");
                }
                ConnectEvent::SctpConnected => {
                    self.sctp_connected = true;
                }
                ConnectEvent::DataChannelOpen { id, request } => {
                    let init = DataChannelInit {
                        label: request.label,
                        protocol: request.protocol,
                        ordered: request.ordered,
                        ..DataChannelInit::default()
                    };
                    let channel = DataChannel::new(id, &init);
                    self.channels.insert(id, channel.clone());
                    self.emit(PeerConnectionEvent::DataChannel(channel));
                }
                ConnectEvent::DataChannelAck { id } => {
                    if let Some(ch) = self.channels.get_mut(&id) {
                        ch.state = DataChannelState::Open;
                        self.emit(PeerConnectionEvent::DataChannelStateChange {
                            id,
                            state: DataChannelState::Open,
                        });
                    }
                }
                ConnectEvent::DataChannelMessage { id, payload } => {
                    self.emit(PeerConnectionEvent::Message { id, payload });
                }
                ConnectEvent::ChannelClosed { id } => {
                    if let Some(ch) = self.channels.get_mut(&id) {
                        ch.state = DataChannelState::Closed;
                        self.emit(PeerConnectionEvent::DataChannelStateChange {
                            id,
                            state: DataChannelState::Closed,
                        });
                    }
                }
                ConnectEvent::Failed(e) => {
                    sink_error!(self.logger, "[PC] transport failed: {}", e);
                    self.ice_state = IceConnectionState::Failed;
                    self.emit(PeerConnectionEvent::IceConnectionStateChange(self.ice_state));
                }
            }
        }

        let gathering = driver.gathering_state();
        let gathering = state_aggregator::aggregate_gathering(&[gathering]);
        if gathering != self.ice_gathering_state {
            self.ice_gathering_state = gathering;
            self.emit(PeerConnectionEvent::IceGatheringStateChange(gathering));
        }

        let dtls_state = driver.dtls_state();
        let aggregate = state_aggregator::aggregate(self.ice_state, dtls_state, self.sctp_connected);
        if aggregate != self.connection_state {
            self.connection_state = aggregate;
            self.emit(PeerConnectionEvent::ConnectionStateChange(aggregate));
        }

        if matches!(dtls_state, Some(DtlsConnectionState::Closed)) && !self.closed {
            self.emit(PeerConnectionEvent::RemoteShutdown);
            self.close();
        }
    }

    /// Tears down the transports and moves to the terminal `closed` state.
    /// Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.signaling = SignalingState::Closed;
        self.emit(PeerConnectionEvent::SignalingStateChange(self.signaling));

        if let Some(driver) = &mut self.driver {
            driver.close();
        }
        self.ice_state = IceConnectionState::Closed;
        self.connection_state = PeerConnectionState::Closed;
        self.emit(PeerConnectionEvent::IceConnectionStateChange(self.ice_state));
        self.emit(PeerConnectionEvent::ConnectionStateChange(self.connection_state));
    }

    fn flush_pending_channel_opens(&mut self) {
        if !self.sctp_connected || self.pending_channel_opens.is_empty() {
            return;
        }
        let Some(driver) = &self.driver else { return };
        for (id, init) in self.pending_channel_opens.drain(..) {
            let _ = driver.open_channel(id, encode_open(&init));
        }
    }

    fn ensure_driver(&mut self, ice_role: IceRole, dtls_role: DtlsRole) {
        if self.driver.is_some() {
            return;
        }
        self.ice_role = Some(ice_role.clone());
        self.dtls_role = Some(dtls_role);
        let timeout = Duration::from_secs(self.config.ice_timeout_secs);
        let mut driver = ConnectDriver::new(
            ice_role,
            dtls_role,
            self.logger.clone(),
            self.cert_config.clone(),
            timeout,
            &self.config.ice_servers,
        );
        driver.set_expected_fingerprint(self.fingerprint.clone());
        self.driver = Some(driver);
    }

    fn maybe_start(&mut self) {
        let have_both = self.local_description().is_some() && self.remote_description().is_some();
        if !have_both || !matches!(self.signaling, SignalingState::Stable) {
            return;
        }
        if let Some(driver) = &mut self.driver {
            driver.start();
            self.ice_state = IceConnectionState::Checking;
            self.emit(PeerConnectionEvent::IceConnectionStateChange(self.ice_state));
        }
    }

    fn build_local_description(
        &mut self,
        sdp_type: SdpType,
        setup: DtlsSetup,
    ) -> Result<SessionDescription, OrchestratorError> {
        let driver = self
            .driver
            .as_mut()
            .ok_or_else(|| OrchestratorError::InvalidState("transport not assembled yet".to_owned()))?;
        let (ice_ufrag, ice_pwd) = driver.local_credentials();
        let candidates = driver.gather_local_candidates()?;
        let fingerprint_hex = self.fingerprint.clone();

        let params = ApplicationSectionParams {
            mid: MID,
            ice_ufrag: &ice_ufrag,
            ice_pwd: &ice_pwd,
            fingerprint_hex: &fingerprint_hex,
            setup,
            sctp_port: 5000,
            legacy_sctp_sdp: self.legacy_sctp_sdp,
            candidates: &candidates,
            end_of_candidates: true,
        };
        Ok(build_session_description(sdp_type, &params))
    }

    fn application_media(desc: &SessionDescription) -> Option<&crate::sdp::media::Media> {
        desc.sdp.media.iter().find(|m| m.proto().contains("SCTP"))
    }

    /// Distinguishes the pre-RFC `DTLS/SCTP` profile (SCTP port carried as
    /// the `m=` fmt and an `a=sctpmap`) from the modern `UDP/DTLS/SCTP`
    /// profile (`webrtc-datachannel` fmt and an `a=sctp-port`).
    fn is_legacy_sctp_media(m: &Media) -> bool {
        let modern_profile = m.proto().contains("UDP/DTLS/SCTP");
        let modern_fmt = m.fmts().first().is_some_and(|f| f == "webrtc-datachannel");
        let has_sctp_port = m.attrs().iter().any(|a| a.key() == "sctp-port");
        !(modern_profile && modern_fmt && has_sctp_port)
    }

    fn media_mid(m: &Media) -> Option<String> {
        m.attrs()
            .iter()
            .find(|a| a.key() == "mid")
            .and_then(|a| a.value().map(ToOwned::to_owned))
    }

    fn section_signature(desc: &SessionDescription) -> Vec<(String, Option<String>)> {
        desc.sdp.media.iter().map(|m| (m.kind().to_string(), Self::media_mid(m))).collect()
    }

    /// An answer must carry the same `(kind, mid)` sections, in the same
    /// order, as the offer it answers — RFC 8829 §5.3.1.
    fn validate_answer_sections(
        offer: &SessionDescription,
        answer: &SessionDescription,
    ) -> Result<(), OrchestratorError> {
        if Self::section_signature(offer) != Self::section_signature(answer) {
            return Err(OrchestratorError::InvalidArgument(
                "answer's media sections do not match the offer's (kind, mid) sequence".to_owned(),
            ));
        }
        Ok(())
    }

    fn section_attr(&self, desc: &SessionDescription, key: &str) -> Option<String> {
        Self::application_media(desc)?
            .attrs()
            .iter()
            .find(|a| a.key() == key)
            .map(|a| a.value().unwrap_or_default().to_owned())
    }

    fn section_candidates(&self, desc: &SessionDescription) -> Vec<String> {
        Self::application_media(desc).map_or_else(Vec::new, |m| {
            m.attrs()
                .iter()
                .filter(|a| a.key() == "candidate")
                .filter_map(|a| a.value().map(ToOwned::to_owned))
                .collect()
        })
    }

    fn section_setup(&self, desc: &SessionDescription) -> Result<DtlsSetup, OrchestratorError> {
        let raw = self
            .section_attr(desc, "setup")
            .ok_or_else(|| OrchestratorError::InvalidArgument("SDP missing a=setup".to_owned()))?;
        raw.parse()
    }

    fn remote_setup(&self) -> Result<DtlsSetup, OrchestratorError> {
        let desc = self
            .pending_remote
            .as_ref()
            .or(self.current_remote.as_ref())
            .ok_or_else(|| OrchestratorError::InvalidState("no remote offer to answer".to_owned()))?;
        self.section_setup(desc)
    }

    fn apply_signaling(&mut self, next: SignalingState) {
        self.signaling = next;
        self.emit(PeerConnectionEvent::SignalingStateChange(next));
    }

    fn emit(&self, event: PeerConnectionEvent) {
        let _ = self.events_tx.send(event);
    }
}

impl Drop for PeerConnection {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    /// Builds a `PeerConnection` without touching `get_local_fingerprint_sha256`'s
    /// disk-backed cert loading — none of these tests exercise a real DTLS
    /// handshake, only the signalling/state bookkeeping around it.
    fn new_pc() -> PeerConnection {
        let (events_tx, events_rx) = channel();
        PeerConnection {
            logger: Arc::new(NoopLogSink),
            config: PeerConnectionConfig::default(),
            cert_config: Arc::new(Config::empty()),
            fingerprint: "00:11:22:33:44:55:66:77:88:99:AA:BB:CC:DD:EE:FF".to_owned(),
            signaling: SignalingState::Stable,
            pending_local: None,
            current_local: None,
            pending_remote: None,
            current_remote: None,
            driver: None,
            dtls_role: None,
            ice_role: None,
            sctp_connected: false,
            ice_state: IceConnectionState::New,
            ice_gathering_state: IceGatheringState::New,
            connection_state: PeerConnectionState::New,
            legacy_sctp_sdp: false,
            stream_ids: None,
            channels: HashMap::new(),
            pending_channel_opens: Vec::new(),
            events_tx,
            events_rx,
            closed: false,
        }
    }

    #[test]
    fn create_answer_in_stable_is_rejected() {
        let mut pc = new_pc();
        let err = pc.create_answer().unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidState(_)));
    }

    #[test]
    fn create_offer_after_close_is_rejected() {
        let mut pc = new_pc();
        pc.close();
        let err = pc.create_offer().unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidState(_)));
    }

    #[test]
    fn close_is_idempotent_and_terminal() {
        let mut pc = new_pc();
        pc.close();
        pc.close();
        assert_eq!(pc.signaling_state(), SignalingState::Closed);
        assert_eq!(pc.connection_state(), PeerConnectionState::Closed);
    }

    #[test]
    fn create_data_channel_before_negotiation_queues_open() {
        let mut pc = new_pc();
        pc.create_offer().unwrap();
        let ch = pc.create_data_channel(DataChannelInit::new("chat")).unwrap();
        assert_eq!(ch.state, DataChannelState::Connecting);
        assert_eq!(pc.pending_channel_opens.len(), 1);
    }
}
