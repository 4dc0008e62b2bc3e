use super::candidate::Candidate;
use super::candidate_pair::CandidatePair;
use crate::log::log_sink::LogSink;
use crate::log::NoopLogSink;
use crate::ice::{
    gathering_service::gather_host_candidates, type_ice::candidate_pair::CandidatePairState,
};
use crate::ice::type_ice::candidate_type::CandidateType::ServerReflexive;
use crate::{sink_debug, sink_error, sink_info, sink_warn};
use rand::{Rng, rngs::OsRng};
use std::sync::Arc;
use std::{io::Error, net::SocketAddr, net::UdpSocket, time::Duration, net::ToSocketAddrs};

const NOMINATION_REQUEST: &[u8] = b"NOMINATE-BINDING-REQUEST";

/// Error message formatting constants
const ERROR_MSG: &str = "ERROR";
const WHITESPACE: &str = " ";
const QUOTE: &str = "\"";

/// Mensajes simulados para los checks
pub const BINDING_REQUEST: &[u8] = b"BINDING-REQUEST";
pub const BINDING_RESPONSE: &[u8] = b"BINDING-RESPONSE";

/// Configuration constants
const MAX_PAIR_LIMIT: usize = 100; // reasonable upper bound to avoid combinatorial explosion
const MIN_PRIORITY_THRESHOLD: u64 = 1; // pairs below this value are ignored

/// Helper to format error messages consistently
fn error_message(msg: &str) -> String {
    format!("{ERROR_MSG}{WHITESPACE}{QUOTE}{msg}{QUOTE}")
}

///Role for an agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IceRole {
    /// It's the role in which the final decision is made on which candidate pair will be used for the connection.
    Controlling,
    /// It's the role that accepts the nominated pair.
    Controlled,
}

/// It's responsible for orchestrating the flow of gathering, checks, nomination, etc.
pub struct IceAgent {
    /// logger handle
    logger: Arc<dyn LogSink>,
    /// set of local candidates.
    pub local_candidates: Vec<Candidate>,
    /// set of remote candidates.
    pub remote_candidates: Vec<Candidate>,
    /// set of pairs of candidates.
    pub candidate_pairs: Vec<CandidatePair>,
    /// role for the agent.
    pub role: IceRole,
    ufrag: String,
    pwd: String,
    remote_ufrag: String,
    remote_pwd: String,
    pub nominated_pair: Option<CandidatePair>,
}

impl IceAgent {
    #[must_use]
    /// Create a valid ice agent.
    ///
    /// # Arguments
    /// Same properties of ice agent.
    ///
    /// # Return
    /// A new ice agent.
    /// Default used by unit tests: no-op logging.
    pub fn new(role: IceRole) -> Self {
        Self::with_logger(role, Arc::new(NoopLogSink))
    }
    /// Production/integration: inject your real logger (or a test logger).
    pub fn with_logger(role: IceRole, logger: Arc<dyn LogSink>) -> Self {
        let (ufrag, pwd) = Self::fresh_credentials();
        Self {
            logger,
            local_candidates: vec![],
            remote_candidates: vec![],
            candidate_pairs: vec![],
            role,
            ufrag,
            pwd,
            remote_ufrag: String::new(),
            remote_pwd: String::new(),
            nominated_pair: None,
        }
    }

    /// Start the ICE data channel simulating a local P2P communication.
    ///
    /// Flow:
    /// 1. Verifies that a nominated pair (`nominated_pair`) exists.
    /// 2. Opens the local socket with `open_udp_channel()`.
    /// 3. Sends a test message "BINDING-DATA hello ICE".
    /// 4. Waits for a "BINDING-ACK" response.
    ///
    /// # Returns
    /// Ok(()) - sucessful message if all the flow was correct
    ///
    /// # Errors
    /// Err(String) - If any error occurs in any of the steps
    pub fn start_data_channel(&mut self) -> Result<(), String> {
        sink_info!(self.logger, "🔹 Starting ICE data channel...");

        if self.nominated_pair.is_none() {
            return Err("Cannot start data channel: no nominated pair available.".into());
        }

        let (socket, remote_addr) = self
            .get_data_channel_socket()
            .map_err(|e| format!("Failed to open UDP channel: {e}"))?;

        socket
            .connect(remote_addr)
            .map_err(|e| format!("Failed to connect UDP channel: {e}"))?;

        self.send_test_message(&socket, "hola ICE")
            .map_err(|e| format!("Failed to send test message: {e}"))?;

        match self.receive_test_message(&socket) {
            Ok(msg) if msg.contains("BINDING-ACK") => {
                sink_info!(self.logger, "ICE Data Channel established successfully!");
                Ok(())
            }
            Ok(msg) => Err(format!(
                "Unexpected message received instead of ACK: {msg}"
            )),
            Err(e) => Err(format!("Failed to receive ACK: {e}")),
        }
    }

    /// Sends a test message (e.g. "BINDING-DATA hola ICE") to the remote candidate.
    ///
    /// # Arguments
    /// * `socket` - Reference to a bound UDP socket.
    /// * `msg` - The message to send.
    ///
    /// # Returns
    /// * `Ok(())` if the message was sent successfully.
    ///
    /// # Errors
    /// * `Err(String)` if there was no nominated pair or sending failed.
    pub fn send_test_message(&self, socket: &UdpSocket, msg: &str) -> Result<(), String> {
        let Some(pair) = &self.nominated_pair else {
                return Err(String::from(
                    "Cannot send message: no nominated pair available",
                ));
        };

        let remote_addr = pair.remote.address;
        let payload = format!("BINDING-DATA {msg}");

        match socket.send_to(payload.as_bytes(), remote_addr) {
            Ok(sent) => {
                sink_debug!(
                    self.logger,
                    "[SEND] Sent {} bytes → {} ({})",
                    sent,
                    remote_addr,
                    payload
                );
                Ok(())
            }
            Err(e) => Err(format!(
                "Failed to send UDP message to {remote_addr}: {e}"
            )),
        }
    }

    /// Waits for a response message ("BINDING-ACK") from the remote peer.
    ///
    /// # Arguments
    /// * `socket` - UDP socket to listen on.
    ///
    /// # Returns
    /// * `Ok(String)` - The received message.
    ///
    /// # Errors
    /// * `Err(String)` - Timeout or read error.
    pub fn receive_test_message(&self, socket: &UdpSocket) -> Result<String, String> {
        socket
            .set_read_timeout(Some(Duration::from_secs(1)))
            .map_err(|e| format!("Failed to set timeout: {e}"))?;

        let mut buf = [0u8; 512];
        match socket.recv_from(&mut buf) {
            Ok((size, src)) => {
                let msg = String::from_utf8_lossy(&buf[..size]).to_string();
                sink_debug!(self.logger, "[RECV] From {} → \"{}\"", src, msg);
                Ok(msg)
            }
            Err(e) => {
                sink_warn!(
                    self.logger,
                    "Timeout or error while receiving UDP message: {}",
                    e
                );
                Err(format!(
                    "Timeout or error while receiving UDP message: {e}"
                ))
            }
        }
    }
    /// Returns a clone of the Arc'd UDP socket associated with the local candidate of the nominated pair.
    /// # Description
    /// This function provides access to the already bound UDP socket intended for the data channel.
    /// It does NOT bind a new socket.
    ///
    /// # Returns
    /// * `Ok(Arc<UdpSocket>)` — A clone of the socket Arc from the nominated local candidate.
    ///
    /// # Errors
    /// * `Err(String)` — If no nominated pair exists, the pair is not 'Succeeded', or the local candidate lacks a socket.
    // in impl IceAgent
    pub fn get_data_channel_socket(&self) -> Result<(Arc<UdpSocket>, SocketAddr), String> {
        // 1) Must have a nominated pair recorded
        let np = self
            .nominated_pair
            .as_ref()
            .ok_or_else(|| "No nominated pair available to get UDP channel socket.".to_string())?;

        if !matches!(np.state, CandidatePairState::Succeeded) {
            return Err(format!(
                "Cannot get UDP channel socket — pair not in Succeeded state (current: {:?})",
                np.state
            ));
        }

        // 2) Find the corresponding full pair (with socket) by addresses
        let pair = self
            .candidate_pairs
            .iter()
            .find(|p| p.local.address == np.local.address && p.remote.address == np.remote.address)
            .ok_or_else(|| "Nominated pair not found in candidate_pairs.".to_string())?;

        // 3) Extract socket and peer
        let sock = pair
            .local
            .socket
            .as_ref()
            .ok_or_else(|| {
                format!(
                    "Nominated local candidate {} has no associated socket.",
                    pair.local.address
                )
            })?
            .clone();

        Ok((sock, pair.remote.address))
    }

    /// Executes role-specific logic according to ICE role.
    /// - Controlling → select the best valid pair (nomination).
    /// - Controlled  → wait for nomination (mocked for local tests).
    ///
    /// This prepares both agents for the final ICE connection phase.
    pub fn run_role_logic(&mut self) {
        match self.role {
            IceRole::Controlling => {
                sink_debug!(
                    self.logger,
                    "Role: CONTROLLING — selecting the nominated pair..."
                );
                if let Some(pair) = self.select_valid_pair() {
                    sink_debug!(
                        self.logger,
                        "Nominated pair: [local={}, remote={}, prio={}]",
                        pair.local.address,
                        pair.remote.address,
                        pair.priority
                    );
                } else {
                    sink_warn!(self.logger, "No valid pair available for nomination.");
                }
            }
            IceRole::Controlled => {
                sink_debug!(
                    self.logger,
                    "Role: CONTROLLED — Waiting for nomination from controlling peer..."
                );
            }
        }
    }

    /// Selects the valid (nominated) pair based on ICE role and priority.
    /// - Finds the `Succeeded` pair with the highest priority.
    /// - If role is Controlling → marks it as nominated.
    /// - Stores it in `self.nominated_pair` for later use.
    ///
    /// # Returns
    /// the nominated pair, if found.
    ///
    /// #Errors
    ///
    pub fn select_valid_pair(&mut self) -> Option<&CandidatePair> {
        let succeeded_indices: Vec<usize> = self
            .candidate_pairs
            .iter()
            .enumerate()
            .filter_map(|(i, p)| {
                if matches!(p.state, CandidatePairState::Succeeded) {
                    Some(i)
                } else {
                    None
                }
            })
            .collect();

        if succeeded_indices.is_empty() {
            sink_warn!(self.logger, "No succeeded pairs available for nomination.");
            return None;
        }

        let best_index = succeeded_indices
            .into_iter()
            .max_by_key(|&i| self.candidate_pairs[i].priority);

        if let Some(idx) = best_index {
            let pair = &mut self.candidate_pairs[idx];
            pair.is_nominated = true;

            self.nominated_pair = Some(CandidatePair {
                local: pair.local.clone_light(),
                remote: pair.remote.clone_light(),
                priority: pair.priority,
                state: pair.state,
                is_nominated: true,
            });

            self.candidate_pairs.get(idx)
        }else{
            sink_error!(self.logger, "Could not determine nominated pair index.");
            None
        }
    }
    pub fn add_local_candidate(&mut self, candidate: Candidate) {
        self.local_candidates.push(candidate);
    }

    pub fn add_remote_candidate(&mut self, candidate: Candidate) {
        self.remote_candidates.push(candidate);
    }

    // RFC 5389 constants
    const HOSTNAME_STUN_GOOGLE: &str = "stun.l.google.com:19302";
    /// Gathers local ICE candidates and adds them to the agent.
    ///
    /// This method collects the local host candidates available on the system and
    /// registers them in the agent's local candidate list. Currently synchronous,
    /// but will be asynchronous in the future.
    ///
    /// # Returns
    ///
    /// * `Ok(&Vec<Candidate>)` - Reference to the updated list of local candidates.
    ///
    /// # Errors
    ///
    /// * Returns an `Error` if candidate gathering fails. Currently, this is a placeholder
    ///   for future scenarios where gathering may fail asynchronously or due to network/system issues.
    pub fn gather_candidates(&mut self) -> Result<&Vec<Candidate>, Error> {
        self.gather_candidates_with_stun(None)
    }

    /// Same as `gather_candidates`, but hits `stun_server` (`host:port`,
    /// no scheme) instead of the built-in Google STUN server when given one.
    ///
    /// # Errors
    ///
    /// Candidate gathering itself cannot fail; this always returns `Ok`.
    /// Kept fallible to match `gather_candidates`'s signature.
    pub fn gather_candidates_with_stun(
        &mut self,
        stun_server: Option<&str>,
    ) -> Result<&Vec<Candidate>, Error> {
        let mut candidates = gather_host_candidates();
        match self.gather_stun_candidates(stun_server.unwrap_or(HOSTNAME_STUN_GOOGLE)) {
            Ok(srflx) => candidates.extend(srflx),
            Err(e) => sink_warn!(self.logger, "STUN gathering failed: {}", e),
        }
        for c in candidates {
            self.add_local_candidate(c);
        }
        Ok(&self.local_candidates)
    }

    // RFC 5389 constants
    const STUN_BINDING_REQUEST: u16 = 0x0001;
    const STUN_MAGIC_COOKIE: u32 = 0x2112A442;
    const ATTR_XOR_MAPPED_ADDRESS: u16 = 0x0020;
    const FAMILY_IPV4: u8 = 0x01;
    const TIMEOUT_SECS: u64 = 2;
    /// Gathers Server Reflexive (srflx) candidates using a public STUN server.
    ///
    /// This method discovers the public (NAT-translated) address of the local socket,
    /// and returns a `Candidate` of type `ServerReflexive`.
    ///
    /// It follows RFC 5389, sending a Binding Request and parsing the XOR-MAPPED-ADDRESS.
    ///
    /// # Arguments
    /// * `stun_server` - STUN server (domain:port), e.g. "stun.l.google.com:19302"
    ///
    /// # Returns
    /// * `Ok(Vec<Candidate>)` with one `ServerReflexive` candidate
    /// * `Err(String)` if no reflexive address could be retrieved
    pub fn gather_stun_candidates(&self, stun_server: &str) -> Result<Vec<Candidate>, String> {
        
        // Resolver STUN server
        let server_addr = stun_server
            .to_socket_addrs()
            .map_err(|_| format!("Cannot resolve STUN server: {stun_server}"))?
            .next()
            .ok_or_else(|| format!("No valid address found for STUN server: {stun_server}"))?;

        // Bind UDP socket localmente (0.0.0.0:0 → cualquier puerto libre)
        let socket = UdpSocket::bind("0.0.0.0:0")
            .map_err(|e| format!("Failed to bind UDP socket: {e}"))?;
        socket
            .set_read_timeout(Some(Duration::from_secs(TIMEOUT_SECS)))
            .map_err(|e| format!("Failed to set socket timeout: {e}"))?;

        let local_addr = socket
            .local_addr()
            .map_err(|e| format!("Could not get local address: {e}"))?;

        // Construir un STUN Binding Request minimal
        let transaction_id: [u8; 12] = rand::random();
        let mut request = Vec::with_capacity(20);
        request.extend_from_slice(&STUN_BINDING_REQUEST.to_be_bytes()); // type
        request.extend_from_slice(&0u16.to_be_bytes()); // message length
        request.extend_from_slice(&STUN_MAGIC_COOKIE.to_be_bytes());
        request.extend_from_slice(&transaction_id);

        //  Enviar el request al STUN server
        socket
            .send_to(&request, server_addr)
            .map_err(|e| format!("Failed to send STUN request: {e}"))?;

        //  Esperar respuesta (Binding Response)
        let mut buf = [0u8; 512];
        let (len, _) = socket
            .recv_from(&mut buf)
            .map_err(|e| format!("No STUN response received: {e}"))?;

        if len < 20 {
            return Err("Invalid STUN response (too short)".into());
        }

        // Parsear XOR-MAPPED-ADDRESS
        let mut offset = 20;
        let mut reflexive_addr: Option<SocketAddr> = None;

        while offset + 4 <= len {
            let attr_type = u16::from_be_bytes([buf[offset], buf[offset + 1]]);
            let attr_len = u16::from_be_bytes([buf[offset + 2], buf[offset + 3]]) as usize;
            offset += 4;

            if attr_type == ATTR_XOR_MAPPED_ADDRESS && attr_len >= 8 {
                let family = buf[offset + 1];
                if family == FAMILY_IPV4 {
                    let port = u16::from_be_bytes([buf[offset + 2], buf[offset + 3]])
                        ^ ((STUN_MAGIC_COOKIE >> 16) as u16);
                    let ip = [
                        buf[offset + 4] ^ ((STUN_MAGIC_COOKIE >> 24) as u8),
                        buf[offset + 5] ^ ((STUN_MAGIC_COOKIE >> 16) as u8),
                        buf[offset + 6] ^ ((STUN_MAGIC_COOKIE >> 8) as u8),
                        buf[offset + 7] ^ (STUN_MAGIC_COOKIE as u8),
                    ];
                    reflexive_addr = Some(SocketAddr::from((ip, port)));
                    break;
                }
            }

            offset += attr_len + (attr_len % 4);
        }

        let public_addr = reflexive_addr
            .ok_or("XOR-MAPPED-ADDRESS not found in STUN response")?;

        sink_info!(
            self.logger,
            "[STUN] Reflexive address discovered: {} => public {}",
            local_addr,
            public_addr
        );

        // Create candidate of type ServerReflexive
        let candidate = Candidate::new(
            String::new(), // calculate foundation by default
            1,            
            "udp",
            0,             // calculate priority by default
            public_addr,
            ServerReflexive,
            Some(local_addr),
            Some(Arc::new(socket)),
        );

        Ok(vec![candidate])
    }


    /// Builds all possible candidate pairs between local and remote candidates.
    /// According to RFC 8445 §6.1.2.3:
    /// - Each local candidate is paired with each remote candidate.
    /// - The pair’s priority is calculated based on the agent's role (controlling or controlled).
    /// - Pairs with invalid priority values are ignored.
    /// - The resulting list is sorted by descending priority.
    ///
    /// # Arguments
    /// * `self` - Self entity.
    ///
    /// # Returns
    /// The number of valid pairs generated.
    ///
    /// # Errors
    ///
    pub fn form_candidate_pairs(&mut self) -> usize {
        let mut pairs = Vec::new();

        for local in &self.local_candidates {
            if pairs.len() >= MAX_PAIR_LIMIT {
                break;
            }
            for remote in &self.remote_candidates {
                let priority = CandidatePair::calculate_pair_priority(local, remote, &self.role);

                if local.address.is_ipv4() != remote.address.is_ipv4() {
                    sink_error!(
                        self.logger,
                        "{}",
                        error_message(&format!(
                            "Incompatible address families (local={}, remote={})",
                            local.address, remote.address
                        ))
                    );
                    continue;
                }

                if local.transport != remote.transport {
                    sink_error!(
                        self.logger,
                        "{}",
                        error_message(&format!(
                            "Incompatible transport protocols (local={}, remote={})",
                            local.transport, remote.transport
                        ))
                    );
                    continue;
                }

                if priority < MIN_PRIORITY_THRESHOLD {
                    sink_warn!(
                        self.logger,
                        "Ignored pair because of invalid priority (local={}, remote={}, prio={})",
                        local.address,
                        remote.address,
                        priority
                    );
                    continue;
                }

                pairs.push(CandidatePair::new(local.clone(), remote.clone(), priority));

                if pairs.len() >= MAX_PAIR_LIMIT {
                    sink_warn!(
                        self.logger,
                        "Límite máximo de pares alcanzado ({}). Truncando lista.",
                        MAX_PAIR_LIMIT
                    );
                    break;
                }
            }
        }

        pairs.sort_by(|a, b| b.priority.cmp(&a.priority));

        let count = pairs.len();
        self.candidate_pairs = pairs;
        count
    }

    /// Inicia los 'connectivity checks' para todos los pares en estado 'Waiting'.
    /// Envía un BINDING-REQUEST para cada par pero NO espera respuesta.
    /// Cambia el estado de los pares a `InProgress`.
    pub fn start_checks(&mut self) {
        sink_info!(self.logger, "ICE: Starting connectivity checks...");
        for pair in &mut self.candidate_pairs {
            if !matches!(pair.state, CandidatePairState::Waiting) {
                continue;
            }

            let Some(local_sock) = &pair.local.socket else {
                sink_warn!(
                    self.logger,
                    "No socket for local candidate: {}",
                    pair.local.address
                );
                pair.state = CandidatePairState::Failed;
                continue;
            };

            if let Err(e) = local_sock.send_to(BINDING_REQUEST, pair.remote.address) {
                sink_error!(
                    self.logger,
                    "Send failed from {} → {}: {}",
                    pair.local.address,
                    pair.remote.address,
                    e
                );
                pair.state = CandidatePairState::Failed;
            } else {
                pair.state = CandidatePairState::InProgress;
            }
        }
    }

    /// Maneja un paquete UDP entrante recibido por el `ConnectionManager`.
    /// Esta función es el corazón del ICE reactivo.
    ///
    /// # Arguments
    /// * `packet` - Los bytes del paquete recibido.
    /// * `from_addr` - El `SocketAddr` de donde vino el paquete.
    pub fn handle_incoming_packet(&mut self, packet: &[u8], from_addr: SocketAddr) {
        let Some(pair) = self
            .candidate_pairs
            .iter_mut()
            .find(|p| p.remote.address == from_addr)
        else {
            sink_warn!(
                self.logger,
                "[ICE] Ignoring unknown packet received from: {}",
                from_addr
            );
            return;
        };

        if packet == BINDING_RESPONSE {
            sink_info!(
                self.logger,
                "[ICE] Received BINDING-RESPONSE from {}",
                from_addr
            );
            if !matches!(pair.state, CandidatePairState::Succeeded) {
                pair.state = CandidatePairState::Succeeded;
                sink_info!(
                    self.logger,
                    "[ICE] Candidate Peer Succeeded: [local={}, remote={}]",
                    pair.local.address,
                    pair.remote.address
                );

                if self.role == IceRole::Controlling {
                    let should_nominate = match &self.nominated_pair {
                        None => true,
                        Some(current_nominated) => pair.priority > current_nominated.priority,
                    };

                    if should_nominate {
                        sink_info!(
                            self.logger,
                            "[ICE] Nominating pair: [local={}, remote={}]",
                            pair.local.address,
                            pair.remote.address
                        );
                        pair.is_nominated = true;
                        self.nominated_pair = Some(pair.clone_light());

                        if let Some(local_sock) = &pair.local.socket {
                            if let Err(e) =
                                local_sock.send_to(NOMINATION_REQUEST, pair.remote.address)
                            {
                                sink_error!(
                                    self.logger,
                                    "[ICE] Error sending NOMINATION_REQUEST to {}: {}",
                                    pair.remote.address,
                                    e
                                );
                            } else {
                                sink_info!(
                                    self.logger,
                                    "[ICE] Sent NOMINATION_REQUEST to {}",
                                    pair.remote.address
                                );
                            }
                        } else {
                            sink_warn!(
                                self.logger,
                                "[ICE] Cannot nominate: No local socket for pair."
                            );
                        }
                    }
                }
            }
        } else if packet == BINDING_REQUEST || packet == NOMINATION_REQUEST {
            if self.role == IceRole::Controlled && packet == NOMINATION_REQUEST {
                sink_info!(
                    self.logger,
                    "[ICE] Received NOMINATION_REQUEST from {}",
                    from_addr
                );
                if self.nominated_pair.as_ref().map_or(true, |np| {
                    np.local.address != pair.local.address
                        || np.remote.address != pair.remote.address
                }) {
                    pair.is_nominated = true;
                    pair.state = CandidatePairState::Succeeded;
                    self.nominated_pair = Some(pair.clone_light());
                    sink_info!(
                        self.logger,
                        "[ICE] Pair nominated by peer: [local={}, remote={}]",
                        pair.local.address,
                        pair.remote.address
                    );
                }
            } else {
                sink_debug!(
                    self.logger,
                    "[ICE] Received BINDING-REQUEST from {}",
                    from_addr
                );
            }

            let Some(local_sock) = &pair.local.socket else {
                sink_warn!(
                    self.logger,
                    "[ICE] No socket available to answer BINDING-REQUEST: {}",
                    pair.local.address
                );
                return;
            };
            if let Err(e) = local_sock.send_to(BINDING_RESPONSE, from_addr) {
                sink_error!(
                    self.logger,
                    "[ICE] Socket error sending BINDING-RESPONSE to {}: {}",
                    from_addr,
                    e
                );
            } else {
                sink_debug!(
                    self.logger,
                    "[ICE] Sending BINDING-RESPONSE to {}",
                    from_addr
                );
            }
        } else {
            sink_warn!(
                self.logger,
                "[ICE] Unknown packet from {}: {:?}",
                from_addr,
                packet
            );
        }
    }
    pub(crate) fn local_credentials(&self) -> (String, String) {
        (self.ufrag.clone(), self.pwd.clone())
    }

    fn gen_token(len: usize) -> String {
        const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        let mut s = String::with_capacity(len);
        for _ in 0..len {
            let idx = OsRng.gen_range(0..ALPHABET.len());
            s.push(ALPHABET[idx] as char);
        }
        s
    }

    fn fresh_credentials() -> (String, String) {
        // ICE: ufrag >= 4 chars; pwd >= 22 chars
        (Self::gen_token(8), Self::gen_token(24))
    }

    //print every state of candidates pair
    pub fn print_pair_states(&self) {
        if self.candidate_pairs.is_empty() {
            sink_warn!(self.logger, "No candidate pairs available.");
            return;
        }
        sink_info!(self.logger, "=== Candidate Pair States ===");
        for pair in &self.candidate_pairs {
            pair.debug_state(&self.logger);
        }
    }
    /// Updates the state of a candidate pair by index.
    ///
    /// # Arguments
    /// * `pair_index` - index within `self.candidate_pairs`
    /// * `new_state` - new [`CandidatePairState`] to assign
    ///
    /// # Behavior
    /// - If the index is valid, updates the pair's state.
    /// - If it's out of bounds, prints a warning.
    pub fn update_pair_state(&mut self, pair_index: usize, new_state: CandidatePairState) {
        if let Some(pair) = self.candidate_pairs.get_mut(pair_index) {
            sink_info!(
                self.logger,
                "[ICE] Updating pair {} [{} → {:?}]",
                pair_index,
                pair.local.address,
                new_state
            );
            pair.state = new_state;
        } else {
            sink_warn!(self.logger, "[ICE] Invalid pair index: {}", pair_index);
        }
    }
    /// Returns all successfully validated candidate pairs.
    pub fn get_valid_pairs(&self) -> Vec<&CandidatePair> {
        self.candidate_pairs
            .iter()
            .filter(|p| matches!(p.state, CandidatePairState::Succeeded))
            .collect()
    }

    pub fn set_remote_ufrag(&mut self, remote_ufrag: String) {
        self.remote_ufrag = remote_ufrag;
    }

    pub fn set_remote_pwd(&mut self, remote_pwd: String) {
        self.remote_pwd = remote_pwd;
    }
}
