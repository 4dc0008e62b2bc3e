use crate::log::log_sink::LogSink;
use crate::sctp::events::SctpEvents;
use crate::sctp::stream::{SctpStream, StreamPhase};
use crate::{sink_debug, sink_error, sink_info, sink_trace, sink_warn};
use bytes::Bytes;
use sctp_proto::{
    Association, AssociationHandle, ClientConfig, Endpoint, Error, Payload,
    PayloadProtocolIdentifier,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

/// Dummy peer address: the real transport is the DTLS channel, not raw UDP,
/// so `sctp_proto`'s association never actually addresses packets anywhere.
const DUMMY_PEER_ADDR: &str = "192.168.1.1:5000";

pub struct SctpSender {
    pub log_sink: Arc<dyn LogSink>,
    pub tx: Sender<SctpEvents>,
    pub rx: Receiver<SctpEvents>,
    pub association: Arc<Mutex<Option<Association>>>,
    pub association_handle: Arc<Mutex<Option<AssociationHandle>>>,
    pub streams: Arc<RwLock<HashMap<u16, SctpStream>>>,
    pub endpoint: Arc<Mutex<Endpoint>>,
    pub is_client: bool,
}

impl SctpSender {
    pub fn new(
        log_sink: Arc<dyn LogSink>,
        tx: Sender<SctpEvents>,
        rx: Receiver<SctpEvents>,
        association: Arc<Mutex<Option<Association>>>,
        association_handle: Arc<Mutex<Option<AssociationHandle>>>,
        streams: Arc<RwLock<HashMap<u16, SctpStream>>>,
        endpoint: Arc<Mutex<Endpoint>>,
        is_client: bool,
    ) -> Self {
        Self {
            log_sink,
            tx,
            rx,
            association,
            association_handle,
            streams,
            endpoint,
            is_client,
        }
    }

    #[allow(clippy::expect_used)]
    pub fn run(&self) {
        let mut pending_writes: Vec<(u16, Vec<u8>)> = Vec::new();
        use std::time::Duration;

        self.ensure_connection();

        loop {
            let timeout = {
                let mut assoc_guard = self.association.lock().expect("association lock poisoned");
                if let Some(assoc) = assoc_guard.as_mut() {
                    assoc
                        .poll_timeout()
                        .map(|inst| inst.saturating_duration_since(Instant::now()))
                } else {
                    None
                }
            };

            let wait_duration = timeout.unwrap_or(Duration::from_millis(100));
            let wait_duration = wait_duration.min(Duration::from_secs(1));

            let event = self.rx.recv_timeout(wait_duration);

            match event {
                Ok(SctpEvents::OpenChannel { id, open_payload }) => {
                    sink_trace!(self.log_sink, "[SCTP_SENDER] Opening channel {}", id);
                    {
                        let mut streams = self.streams.write().expect("streams lock poisoned");
                        streams.insert(id, SctpStream::new(id, StreamPhase::AwaitingAck));
                    }
                    self.write_to_stream(id, open_payload, &mut pending_writes);
                }
                Ok(SctpEvents::SendAck { id }) => {
                    sink_trace!(self.log_sink, "[SCTP_SENDER] Acking channel {}", id);
                    self.write_to_stream(
                        id,
                        crate::pc::data_channel::encode_ack(),
                        &mut pending_writes,
                    );
                }
                Ok(SctpEvents::SendMessage { id, payload }) => {
                    sink_trace!(
                        self.log_sink,
                        "[SCTP_SENDER] Sending {} bytes on channel {}",
                        payload.len(),
                        id
                    );
                    {
                        let mut streams = self.streams.write().expect("streams lock poisoned");
                        if let Some(stream) = streams.get_mut(&id) {
                            stream.update_activity();
                        }
                    }
                    self.write_to_stream(id, payload, &mut pending_writes);
                }
                Ok(SctpEvents::CloseChannel { id }) => {
                    sink_trace!(self.log_sink, "[SCTP_SENDER] Closing channel {}", id);
                    let mut streams = self.streams.write().expect("streams lock poisoned");
                    streams.remove(&id);
                }
                Ok(SctpEvents::KickSender) => {
                    sink_trace!(self.log_sink, "[SCTP_SENDER] KickSender received");
                }
                Ok(SctpEvents::SctpConnected) => {
                    sink_info!(
                        self.log_sink,
                        "[SCTP_SENDER] SCTP connected, flushing {} queued writes",
                        pending_writes.len()
                    );
                    let writes = std::mem::take(&mut pending_writes);
                    for (id, payload) in writes {
                        self.write_to_stream(id, payload, &mut pending_writes);
                    }
                }
                Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
                Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
                _ => {}
            }

            {
                let mut assoc_guard = self.association.lock().expect("association lock poisoned");
                if let Some(assoc) = assoc_guard.as_mut() {
                    let now = Instant::now();
                    if let Some(next_timeout) = assoc.poll_timeout()
                        && now >= next_timeout
                    {
                        assoc.handle_timeout(now);
                    }
                    while let Some(transmit) = assoc.poll_transmit(now) {
                        if let Payload::RawEncode(bytes_vec) = transmit.payload {
                            for b in bytes_vec {
                                let payload = b.to_vec();
                                let _ = self.tx.send(SctpEvents::TransmitSctpPacket { payload });
                            }
                        }
                    }
                }
            }
        }
    }

    #[allow(clippy::expect_used)]
    fn ensure_connection(&self) {
        let mut assoc_guard = self.association.lock().expect("association lock poisoned");
        if assoc_guard.is_none() {
            if !self.is_client {
                return;
            }
            sink_info!(
                self.log_sink,
                "[SCTP_SENDER] Initiating SCTP association as client"
            );
            let mut endpoint = self.endpoint.lock().expect("endpoint lock poisoned");
            let remote: SocketAddr = DUMMY_PEER_ADDR.parse().expect("invalid dummy IP address");
            let config = ClientConfig::default();
            match endpoint.connect(config, remote) {
                Ok((handle, assoc)) => {
                    *assoc_guard = Some(assoc);
                    let mut handle_guard = self
                        .association_handle
                        .lock()
                        .expect("association handle lock poisoned");
                    *handle_guard = Some(handle);
                }
                Err(e) => {
                    sink_error!(
                        self.log_sink,
                        "[SCTP_SENDER] Failed to initiate SCTP association: {:?}",
                        e
                    );
                }
            }
        }
    }

    #[allow(clippy::expect_used)]
    fn write_to_stream(&self, id: u16, payload: Vec<u8>, pending: &mut Vec<(u16, Vec<u8>)>) {
        self.ensure_connection();

        let mut assoc_guard = self.association.lock().expect("association lock poisoned");
        let Some(assoc) = assoc_guard.as_mut() else {
            sink_warn!(
                self.log_sink,
                "[SCTP_SENDER] No association yet, queuing write for channel {}",
                id
            );
            pending.push((id, payload));
            return;
        };

        let bytes = Bytes::from(payload.clone());
        let stream_handle = match assoc.stream(id) {
            Ok(s) => Ok(s),
            Err(_) => assoc.open_stream(id, PayloadProtocolIdentifier::Binary),
        };

        match stream_handle {
            Ok(mut stream) => {
                if let Err(e) = stream.write(&bytes) {
                    if e == Error::ErrPayloadDataStateNotExist {
                        sink_info!(
                            self.log_sink,
                            "[SCTP_SENDER] Association not ready, queuing write for channel {}",
                            id
                        );
                        pending.push((id, payload));
                    } else {
                        sink_warn!(
                            self.log_sink,
                            "[SCTP_SENDER] Error writing to channel {}: {:?}",
                            id,
                            e
                        );
                    }
                }
            }
            Err(e) => {
                sink_warn!(
                    self.log_sink,
                    "[SCTP_SENDER] Failed to open stream {}: {:?}",
                    id,
                    e
                );
            }
        }

        let now = Instant::now();
        while let Some(transmit) = assoc.poll_transmit(now) {
            if let Payload::RawEncode(bytes_vec) = transmit.payload {
                for b in bytes_vec {
                    let payload = b.to_vec();
                    sink_debug!(
                        self.log_sink,
                        "[SCTP_SENDER] handing {} bytes to DTLS",
                        payload.len()
                    );
                    let _ = self.tx.send(SctpEvents::TransmitSctpPacket { payload });
                }
            }
        }
    }
}
