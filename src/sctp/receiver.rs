use crate::log::log_sink::LogSink;
use crate::pc::data_channel;
use crate::sctp::events::SctpEvents;
use crate::sctp::stream::{SctpStream, StreamPhase};
use crate::{sink_debug, sink_error, sink_info, sink_trace, sink_warn};
use bytes::Bytes;
use sctp_proto::{
    Association, AssociationHandle, DatagramEvent, Endpoint, Event, Payload, StreamEvent,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

pub struct SctpReceiver {
    pub log_sink: Arc<dyn LogSink>,
    pub tx: Sender<SctpEvents>,
    pub rx: Receiver<SctpEvents>,
    pub streams: Arc<RwLock<HashMap<u16, SctpStream>>>,
    pub endpoint: Arc<Mutex<Endpoint>>,
    pub association: Arc<Mutex<Option<Association>>>,
    pub association_handle: Arc<Mutex<Option<AssociationHandle>>>,
}

impl SctpReceiver {
    pub fn new(
        log_sink: Arc<dyn LogSink>,
        tx: Sender<SctpEvents>,
        rx: Receiver<SctpEvents>,
        streams: Arc<RwLock<HashMap<u16, SctpStream>>>,
        endpoint: Arc<Mutex<Endpoint>>,
        association: Arc<Mutex<Option<Association>>>,
        association_handle: Arc<Mutex<Option<AssociationHandle>>>,
    ) -> Self {
        Self {
            log_sink,
            tx,
            rx,
            streams,
            endpoint,
            association,
            association_handle,
        }
    }

    #[allow(clippy::expect_used)]
    pub fn run(&self) {
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
                Ok(SctpEvents::ReadableSctpPacket { sctp_packet }) => {
                    self.handle_packet(sctp_packet);
                }
                Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                    let mut assoc_guard =
                        self.association.lock().expect("association lock poisoned");
                    if let Some(assoc) = assoc_guard.as_mut()
                        && let Some(next_timeout) = assoc.poll_timeout()
                        && Instant::now() >= next_timeout
                    {
                        assoc.handle_timeout(Instant::now());
                    }
                    drop(assoc_guard);
                    self.poll_association();
                }
                Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
                _ => {}
            }
        }
    }

    #[allow(clippy::expect_used)]
    fn handle_packet(&self, packet: Vec<u8>) {
        sink_trace!(
            self.log_sink,
            "[SCTP_RECEIVER] Handling incoming SCTP packet of size {}",
            packet.len()
        );
        let mut endpoint = self.endpoint.lock().expect("endpoint lock poisoned");
        let now = Instant::now();
        // Dummy address: the real transport is the DTLS channel, not raw UDP.
        let remote: SocketAddr = "127.0.0.1:5000".parse().expect("invalid dummy IP address");

        let bytes = Bytes::from(packet);

        match endpoint.handle(now, remote, None, None, bytes) {
            Some((handle, DatagramEvent::NewAssociation(assoc))) => {
                sink_info!(self.log_sink, "[SCTP_RECEIVER] New SCTP association created");
                let mut my_assoc = self.association.lock().expect("association lock poisoned");
                *my_assoc = Some(assoc);
                let mut my_handle = self
                    .association_handle
                    .lock()
                    .expect("association handle lock poisoned");
                *my_handle = Some(handle);
            }
            Some((_handle, DatagramEvent::AssociationEvent(event))) => {
                let mut my_assoc_guard =
                    self.association.lock().expect("association lock poisoned");
                if let Some(assoc) = my_assoc_guard.as_mut() {
                    assoc.handle_event(event);
                } else {
                    sink_warn!(
                        self.log_sink,
                        "[SCTP_RECEIVER] Received AssociationEvent but no association exists"
                    );
                }
            }
            None => {}
        }
        self.poll_association();
    }

    #[allow(clippy::expect_used)]
    fn poll_association(&self) {
        let mut assoc_guard = self.association.lock().expect("association lock poisoned");
        let Some(assoc) = assoc_guard.as_mut() else {
            return;
        };
        let now = Instant::now();

        while let Some(transmit) = assoc.poll_transmit(now) {
            if let Payload::RawEncode(bytes_vec) = transmit.payload {
                let mut payload = Vec::new();
                for b in bytes_vec {
                    payload.extend_from_slice(&b);
                }
                let _ = self.tx.send(SctpEvents::TransmitSctpPacket { payload });
            }
        }

        while let Some(event) = assoc.poll() {
            match event {
                Event::Connected => {
                    sink_info!(self.log_sink, "[SCTP_RECEIVER] SCTP association connected");
                    let _ = self.tx.send(SctpEvents::SctpConnected);
                }
                Event::AssociationLost { reason } => {
                    sink_error!(
                        self.log_sink,
                        "[SCTP_RECEIVER] SCTP association lost: {:?}",
                        reason
                    );
                    let _ = self.tx.send(SctpEvents::SctpErr(format!("{reason:?}")));
                }
                Event::Stream(StreamEvent::Readable { id }) => {
                    self.drain_stream(assoc, id);
                }
                _ => {}
            }
        }
    }

    #[allow(clippy::expect_used)]
    fn drain_stream(&self, assoc: &mut Association, id: u16) {
        let Ok(mut stream) = assoc.stream(id) else {
            sink_warn!(
                self.log_sink,
                "[SCTP_RECEIVER] Stream {} readable but no stream handle",
                id
            );
            return;
        };

        loop {
            match stream.read_sctp() {
                Ok(Some(chunks)) => {
                    let mut buf = vec![0u8; 65535];
                    match chunks.read(&mut buf) {
                        Ok(len) => self.handle_stream_payload(id, &buf[..len]),
                        Err(e) => {
                            sink_warn!(
                                self.log_sink,
                                "[SCTP_RECEIVER] Error reading chunk on stream {}: {:?}",
                                id,
                                e
                            );
                            break;
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    sink_warn!(
                        self.log_sink,
                        "[SCTP_RECEIVER] Error reading from stream {}: {:?}",
                        id,
                        e
                    );
                    break;
                }
            }
        }
    }

    /// A stream's first inbound message, if we didn't open it ourselves, is
    /// always the `DATA_CHANNEL_OPEN` message (RFC 8832 §6) — there is no
    /// reliable `ppid` surfaced by the association, so the phase recorded in
    /// `self.streams` disambiguates control from application data instead.
    #[allow(clippy::expect_used)]
    fn handle_stream_payload(&self, id: u16, data: &[u8]) {
        let phase = {
            let streams = self.streams.read().expect("streams lock poisoned");
            streams.get(&id).map(|s| s.phase)
        };

        match phase {
            None => match data_channel::decode_open(data) {
                Ok(request) => {
                    sink_debug!(
                        self.log_sink,
                        "[SCTP_RECEIVER] Received DATA_CHANNEL_OPEN on stream {}: label={}",
                        id,
                        request.label
                    );
                    {
                        let mut streams = self.streams.write().expect("streams lock poisoned");
                        streams.insert(id, SctpStream::new(id, StreamPhase::Established));
                    }
                    let _ = self.tx.send(SctpEvents::SendAck { id });
                    let _ = self.tx.send(SctpEvents::ReceivedDcepOpen { id, request });
                }
                Err(e) => {
                    sink_warn!(
                        self.log_sink,
                        "[SCTP_RECEIVER] Unrecognized first message on stream {}: {}",
                        id,
                        e
                    );
                }
            },
            Some(StreamPhase::AwaitingAck) => {
                if data_channel::decode_ack(data).is_ok() {
                    sink_debug!(self.log_sink, "[SCTP_RECEIVER] Channel {} ACKed", id);
                    {
                        let mut streams = self.streams.write().expect("streams lock poisoned");
                        if let Some(stream) = streams.get_mut(&id) {
                            stream.phase = StreamPhase::Established;
                        }
                    }
                    let _ = self.tx.send(SctpEvents::ReceivedDcepAck { id });
                } else {
                    sink_warn!(
                        self.log_sink,
                        "[SCTP_RECEIVER] Expected ACK on stream {}, got {} bytes",
                        id,
                        data.len()
                    );
                }
            }
            Some(StreamPhase::Established) => {
                {
                    let mut streams = self.streams.write().expect("streams lock poisoned");
                    if let Some(stream) = streams.get_mut(&id) {
                        stream.update_activity();
                    }
                }
                let _ = self.tx.send(SctpEvents::ReceivedMessage {
                    id,
                    payload: data.to_vec(),
                });
            }
        }
    }
}
