use crate::pc::data_channel::OpenRequest;

#[derive(Debug, Clone)]
pub enum SctpEvents {
    /// Opens `id` and writes the `DATA_CHANNEL_OPEN` message for it.
    OpenChannel { id: u16, open_payload: Vec<u8> },
    /// Writes a `DATA_CHANNEL_ACK` on `id`.
    SendAck { id: u16 },
    /// Writes an application message on an already-established channel.
    SendMessage { id: u16, payload: Vec<u8> },
    /// Resets the stream underlying `id` (RFC 8831 §6.7 closing procedure).
    CloseChannel { id: u16 },
    IncomingSctpPacket { sctp_packet: Vec<u8> },
    ReadableSctpPacket { sctp_packet: Vec<u8> },
    ReceivedDcepOpen { id: u16, request: OpenRequest },
    ReceivedDcepAck { id: u16 },
    ReceivedMessage { id: u16, payload: Vec<u8> },
    ChannelClosed { id: u16 },
    SctpConnected,
    SctpErr(String),
    TransmitSctpPacket { payload: Vec<u8> },
    KickSender,
    Shutdown,
}
