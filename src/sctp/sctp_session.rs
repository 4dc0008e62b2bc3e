use crate::dtls::buffered_udp_channel::BufferedUdpChannel;
use crate::log::log_sink::LogSink;
use crate::sctp::events::SctpEvents;
use crate::sctp::receiver::SctpReceiver;
use crate::sctp::sender::SctpSender;
use crate::sctp::stream::SctpStream;
use crate::sctp::transport::SctpTransport;
use openssl::ssl::SslStream;
use sctp_proto::{Association, AssociationHandle, Endpoint, EndpointConfig, ServerConfig};
use std::collections::HashMap;
use std::sync::mpsc::{Sender, channel};
use std::sync::{Arc, Mutex, RwLock};
use std::thread;

/// Drives one SCTP association over an established DTLS channel, carrying
/// every data channel stream for a single `PeerConnection`.
pub struct SctpSession {
    pub tx: Sender<SctpEvents>,
}

impl SctpSession {
    pub fn new(
        log_sink: Arc<dyn LogSink>,
        parent_tx: Sender<SctpEvents>,
        ssl_stream: SslStream<BufferedUdpChannel>,
        is_client: bool,
    ) -> Self {
        let (tx, rx) = channel();

        let (tx_receiver, rx_receiver) = channel();
        let (tx_sender, rx_sender) = channel();
        let (tx_transport, rx_transport) = channel();

        let streams = Arc::new(RwLock::new(HashMap::<u16, SctpStream>::new()));
        let association = Arc::new(Mutex::new(None::<Association>));
        let association_handle = Arc::new(Mutex::new(None::<AssociationHandle>));

        let config = EndpointConfig::default();
        let server_config = ServerConfig::default();
        let endpoint = Endpoint::new(Arc::new(config), Some(Arc::new(server_config)));
        let endpoint = Arc::new(Mutex::new(endpoint));

        let receiver = SctpReceiver::new(
            log_sink.clone(),
            tx.clone(),
            rx_receiver,
            streams.clone(),
            endpoint.clone(),
            association.clone(),
            association_handle.clone(),
        );

        let sender = SctpSender::new(
            log_sink.clone(),
            tx.clone(),
            rx_sender,
            association.clone(),
            association_handle.clone(),
            streams.clone(),
            endpoint.clone(),
            is_client,
        );

        let transport = SctpTransport::new(ssl_stream, log_sink.clone(), tx.clone(), rx_transport);

        thread::spawn(move || receiver.run());
        thread::spawn(move || sender.run());
        thread::spawn(move || transport.run());

        let tx_receiver_clone = tx_receiver.clone();
        let tx_sender_clone = tx_sender.clone();
        let tx_transport_clone = tx_transport.clone();

        thread::spawn(move || {
            while let Ok(event) = rx.recv() {
                match event {
                    SctpEvents::SctpConnected => {
                        let _ = tx_sender_clone.send(SctpEvents::SctpConnected);
                        let _ = parent_tx.send(SctpEvents::SctpConnected);
                    }
                    SctpEvents::IncomingSctpPacket { .. } => {
                        let _ = tx_transport_clone.send(event);
                    }
                    SctpEvents::ReadableSctpPacket { .. } => {
                        let _ = tx_receiver_clone.send(event);
                    }
                    SctpEvents::OpenChannel { .. }
                    | SctpEvents::SendAck { .. }
                    | SctpEvents::SendMessage { .. }
                    | SctpEvents::CloseChannel { .. }
                    | SctpEvents::KickSender => {
                        let _ = tx_sender_clone.send(event);
                    }
                    SctpEvents::TransmitSctpPacket { .. } => {
                        let _ = tx_transport_clone.send(event);
                    }
                    SctpEvents::ReceivedDcepOpen { .. }
                    | SctpEvents::ReceivedDcepAck { .. }
                    | SctpEvents::ReceivedMessage { .. }
                    | SctpEvents::ChannelClosed { .. }
                    | SctpEvents::SctpErr(_) => {
                        let _ = parent_tx.send(event);
                    }
                    SctpEvents::Shutdown => {
                        let _ = parent_tx.send(SctpEvents::Shutdown);
                        break;
                    }
                }
            }
        });

        Self { tx }
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(SctpEvents::Shutdown);
    }

    pub fn handle_sctp_packet(&self, packet: Vec<u8>) {
        let _ = self.tx.send(SctpEvents::IncomingSctpPacket {
            sctp_packet: packet,
        });
    }

    pub fn open_channel(&self, id: u16, open_payload: Vec<u8>) {
        let _ = self.tx.send(SctpEvents::OpenChannel { id, open_payload });
    }

    pub fn send_message(&self, id: u16, payload: Vec<u8>) {
        let _ = self.tx.send(SctpEvents::SendMessage { id, payload });
    }

    pub fn close_channel(&self, id: u16) {
        let _ = self.tx.send(SctpEvents::CloseChannel { id });
    }
}
