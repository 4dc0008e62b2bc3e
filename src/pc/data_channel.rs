//! DCEP (RFC 8832): the in-band control protocol data channels use to agree
//! on a label/protocol/reliability policy before either side can send
//! application data on a stream.
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read, Write};

use crate::pc::error::OrchestratorError;

/// SCTP payload protocol identifiers used on data channel streams.
pub mod ppid {
    pub const DCEP: u32 = 50;
    pub const STRING: u32 = 51;
    pub const BINARY: u32 = 53;
    pub const STRING_EMPTY: u32 = 56;
    pub const BINARY_EMPTY: u32 = 57;
}

const DCEP_MSG_OPEN: u8 = 0x03;
const DCEP_MSG_ACK: u8 = 0x02;

const CHANNEL_TYPE_RELIABLE: u8 = 0x00;
const CHANNEL_TYPE_RELIABLE_UNORDERED: u8 = 0x80;
const CHANNEL_TYPE_PARTIAL_RELIABLE_REXMIT: u8 = 0x01;
const CHANNEL_TYPE_PARTIAL_RELIABLE_REXMIT_UNORDERED: u8 = 0x81;
const CHANNEL_TYPE_PARTIAL_RELIABLE_TIMED: u8 = 0x02;
const CHANNEL_TYPE_PARTIAL_RELIABLE_TIMED_UNORDERED: u8 = 0x82;

/// How unreliable delivery is bounded, if at all. Mirrors
/// `RTCDataChannelInit.maxRetransmits`/`maxPacketLifeTime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reliability {
    Reliable,
    MaxRetransmits(u16),
    MaxPacketLifeTime(u16),
}

impl Default for Reliability {
    fn default() -> Self {
        Self::Reliable
    }
}

/// Parameters a caller supplies to `PeerConnection::create_data_channel`.
#[derive(Debug, Clone)]
pub struct DataChannelInit {
    pub label: String,
    pub protocol: String,
    pub ordered: bool,
    pub reliability: Reliability,
    /// `negotiated: true` skips the DCEP handshake entirely; both peers must
    /// supply the same `id` out of band.
    pub negotiated: bool,
    pub id: Option<u16>,
}

impl Default for DataChannelInit {
    fn default() -> Self {
        Self {
            label: String::new(),
            protocol: String::new(),
            ordered: true,
            reliability: Reliability::Reliable,
            negotiated: false,
            id: None,
        }
    }
}

impl DataChannelInit {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    fn channel_type(&self) -> u8 {
        match (self.ordered, self.reliability) {
            (true, Reliability::Reliable) => CHANNEL_TYPE_RELIABLE,
            (false, Reliability::Reliable) => CHANNEL_TYPE_RELIABLE_UNORDERED,
            (true, Reliability::MaxRetransmits(_)) => CHANNEL_TYPE_PARTIAL_RELIABLE_REXMIT,
            (false, Reliability::MaxRetransmits(_)) => {
                CHANNEL_TYPE_PARTIAL_RELIABLE_REXMIT_UNORDERED
            }
            (true, Reliability::MaxPacketLifeTime(_)) => CHANNEL_TYPE_PARTIAL_RELIABLE_TIMED,
            (false, Reliability::MaxPacketLifeTime(_)) => {
                CHANNEL_TYPE_PARTIAL_RELIABLE_TIMED_UNORDERED
            }
        }
    }

    fn reliability_param(&self) -> u16 {
        match self.reliability {
            Reliability::Reliable => 0,
            Reliability::MaxRetransmits(n) | Reliability::MaxPacketLifeTime(n) => n,
        }
    }
}

/// Lifecycle of a single channel, mirroring `RTCDataChannelState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataChannelState {
    Connecting,
    Open,
    Closing,
    Closed,
}

/// Stream-id parity allocator: the offerer (DTLS client) uses even ids, the
/// answerer (DTLS server) uses odd ids (RFC 8832 §6). Closed ids go back into
/// a free list so a later channel on the same side can reuse the lowest one
/// available instead of climbing forever.
#[derive(Debug)]
pub struct StreamIdAllocator {
    next: u16,
    free_ids: Vec<u16>,
}

impl StreamIdAllocator {
    #[must_use]
    pub fn new(is_dtls_client: bool) -> Self {
        Self {
            next: if is_dtls_client { 0 } else { 1 },
            free_ids: Vec::new(),
        }
    }

    /// Hands back the lowest freed id for this peer's parity, if one exists,
    /// otherwise the next id never handed out, and advances by 2.
    pub fn allocate(&mut self) -> u16 {
        if let Some((pos, &id)) = self.free_ids.iter().enumerate().min_by_key(|(_, &id)| id) {
            self.free_ids.remove(pos);
            return id;
        }
        let id = self.next;
        self.next += 2;
        id
    }

    /// Returns a closed channel's id to the pool so it can be reused by the
    /// same side. Ids of the other parity (channels opened by the remote
    /// peer) are silently ignored — this allocator only owns its own side's
    /// ids.
    pub fn free(&mut self, id: u16) {
        if id % 2 == self.next % 2 {
            self.free_ids.push(id);
        }
    }
}

/// A handle to a single negotiated data channel stream.
#[derive(Debug, Clone)]
pub struct DataChannel {
    pub id: u16,
    pub label: String,
    pub protocol: String,
    pub ordered: bool,
    pub reliability: Reliability,
    pub state: DataChannelState,
}

impl DataChannel {
    #[must_use]
    pub fn new(id: u16, init: &DataChannelInit) -> Self {
        Self {
            id,
            label: init.label.clone(),
            protocol: init.protocol.clone(),
            ordered: init.ordered,
            reliability: init.reliability,
            state: if init.negotiated {
                DataChannelState::Open
            } else {
                DataChannelState::Connecting
            },
        }
    }
}

/// `DATA_CHANNEL_OPEN` message body (RFC 8832 §5.1).
#[must_use]
pub fn encode_open(init: &DataChannelInit) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.write_u8(DCEP_MSG_OPEN).ok();
    buf.write_u8(init.channel_type()).ok();
    buf.write_u16::<BigEndian>(0).ok(); // priority: unused, always 0
    buf.write_u32::<BigEndian>(u32::from(init.reliability_param()))
        .ok();
    buf.write_u16::<BigEndian>(init.label.len() as u16).ok();
    buf.write_u16::<BigEndian>(init.protocol.len() as u16).ok();
    buf.write_all(init.label.as_bytes()).ok();
    buf.write_all(init.protocol.as_bytes()).ok();
    buf
}

/// Parsed contents of an inbound `DATA_CHANNEL_OPEN` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
    pub ordered: bool,
    pub reliability: ReliabilityWire,
    pub label: String,
    pub protocol: String,
}

/// Reliability as decoded off the wire, before being paired with `ordered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReliabilityWire {
    Reliable,
    MaxRetransmits(u16),
    MaxPacketLifeTime(u16),
}

/// # Errors
///
/// Returns `OrchestratorError::InvalidArgument` if `data` is shorter than the
/// fixed header, carries an unrecognized channel-type byte, or the label/
/// protocol lengths overrun the buffer.
pub fn decode_open(data: &[u8]) -> Result<OpenRequest, OrchestratorError> {
    let mut cursor = Cursor::new(data);
    let msg_type = read_u8(&mut cursor)?;
    if msg_type != DCEP_MSG_OPEN {
        return Err(OrchestratorError::InvalidArgument(format!(
            "expected DATA_CHANNEL_OPEN (0x03), got {msg_type:#04x}"
        )));
    }

    let channel_type = read_u8(&mut cursor)?;
    let _priority = read_u16(&mut cursor)?;
    let reliability_param = read_u32(&mut cursor)?;
    let label_len = read_u16(&mut cursor)? as usize;
    let protocol_len = read_u16(&mut cursor)? as usize;

    let mut label_bytes = vec![0u8; label_len];
    cursor
        .read_exact(&mut label_bytes)
        .map_err(|e| OrchestratorError::InvalidArgument(format!("truncated label: {e}")))?;
    let mut protocol_bytes = vec![0u8; protocol_len];
    cursor
        .read_exact(&mut protocol_bytes)
        .map_err(|e| OrchestratorError::InvalidArgument(format!("truncated protocol: {e}")))?;

    let label = String::from_utf8(label_bytes)
        .map_err(|e| OrchestratorError::InvalidArgument(format!("label not UTF-8: {e}")))?;
    let protocol = String::from_utf8(protocol_bytes)
        .map_err(|e| OrchestratorError::InvalidArgument(format!("protocol not UTF-8: {e}")))?;

    let (ordered, reliability) = match channel_type {
        CHANNEL_TYPE_RELIABLE => (true, ReliabilityWire::Reliable),
        CHANNEL_TYPE_RELIABLE_UNORDERED => (false, ReliabilityWire::Reliable),
        CHANNEL_TYPE_PARTIAL_RELIABLE_REXMIT => {
            (true, ReliabilityWire::MaxRetransmits(reliability_param as u16))
        }
        CHANNEL_TYPE_PARTIAL_RELIABLE_REXMIT_UNORDERED => {
            (false, ReliabilityWire::MaxRetransmits(reliability_param as u16))
        }
        CHANNEL_TYPE_PARTIAL_RELIABLE_TIMED => {
            (true, ReliabilityWire::MaxPacketLifeTime(reliability_param as u16))
        }
        CHANNEL_TYPE_PARTIAL_RELIABLE_TIMED_UNORDERED => {
            (false, ReliabilityWire::MaxPacketLifeTime(reliability_param as u16))
        }
        other => {
            return Err(OrchestratorError::InvalidArgument(format!(
                "unknown DCEP channel type {other:#04x}"
            )));
        }
    };

    Ok(OpenRequest {
        ordered,
        reliability,
        label,
        protocol,
    })
}

/// `DATA_CHANNEL_ACK` message body (RFC 8832 §5.2): a single type byte.
#[must_use]
pub fn encode_ack() -> Vec<u8> {
    vec![DCEP_MSG_ACK]
}

/// # Errors
///
/// Returns `OrchestratorError::InvalidArgument` if `data` isn't exactly the
/// one-byte ACK message.
pub fn decode_ack(data: &[u8]) -> Result<(), OrchestratorError> {
    if data == [DCEP_MSG_ACK] {
        Ok(())
    } else {
        Err(OrchestratorError::InvalidArgument(
            "expected single-byte DATA_CHANNEL_ACK (0x02)".to_owned(),
        ))
    }
}

fn read_u8(cursor: &mut Cursor<&[u8]>) -> Result<u8, OrchestratorError> {
    cursor
        .read_u8()
        .map_err(|e| OrchestratorError::InvalidArgument(format!("truncated DCEP message: {e}")))
}

fn read_u16(cursor: &mut Cursor<&[u8]>) -> Result<u16, OrchestratorError> {
    cursor
        .read_u16::<BigEndian>()
        .map_err(|e| OrchestratorError::InvalidArgument(format!("truncated DCEP message: {e}")))
}

fn read_u32(cursor: &mut Cursor<&[u8]>) -> Result<u32, OrchestratorError> {
    cursor
        .read_u32::<BigEndian>()
        .map_err(|e| OrchestratorError::InvalidArgument(format!("truncated DCEP message: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_reliable_ordered_open() {
        let init = DataChannelInit {
            label: "chat".to_owned(),
            protocol: "json".to_owned(),
            ordered: true,
            reliability: Reliability::Reliable,
            negotiated: false,
            id: None,
        };
        let wire = encode_open(&init);
        let parsed = decode_open(&wire).unwrap();
        assert!(parsed.ordered);
        assert_eq!(parsed.reliability, ReliabilityWire::Reliable);
        assert_eq!(parsed.label, "chat");
        assert_eq!(parsed.protocol, "json");
    }

    #[test]
    fn round_trips_unordered_max_retransmits() {
        let init = DataChannelInit {
            ordered: false,
            reliability: Reliability::MaxRetransmits(3),
            ..DataChannelInit::new("unreliable")
        };
        let wire = encode_open(&init);
        let parsed = decode_open(&wire).unwrap();
        assert!(!parsed.ordered);
        assert_eq!(parsed.reliability, ReliabilityWire::MaxRetransmits(3));
    }

    #[test]
    fn rejects_truncated_open() {
        let wire = encode_open(&DataChannelInit::new("x"));
        assert!(decode_open(&wire[..4]).is_err());
    }

    #[test]
    fn ack_round_trips() {
        let wire = encode_ack();
        assert!(decode_ack(&wire).is_ok());
        assert!(decode_ack(&[0x03]).is_err());
    }

    #[test]
    fn stream_id_allocator_respects_parity() {
        let mut client = StreamIdAllocator::new(true);
        assert_eq!(client.allocate(), 0);
        assert_eq!(client.allocate(), 2);

        let mut server = StreamIdAllocator::new(false);
        assert_eq!(server.allocate(), 1);
        assert_eq!(server.allocate(), 3);
    }

    #[test]
    fn freed_id_is_reused_before_climbing_further() {
        let mut client = StreamIdAllocator::new(true);
        assert_eq!(client.allocate(), 0);
        assert_eq!(client.allocate(), 2);
        assert_eq!(client.allocate(), 4);

        client.free(2);
        assert_eq!(client.allocate(), 2);
        assert_eq!(client.allocate(), 6);
    }

    #[test]
    fn freeing_the_other_sides_id_is_ignored() {
        let mut client = StreamIdAllocator::new(true);
        assert_eq!(client.allocate(), 0);
        client.free(7);
        assert_eq!(client.allocate(), 2);
    }

    #[test]
    fn fresh_negotiated_channel_is_already_open() {
        let init = DataChannelInit {
            negotiated: true,
            ..DataChannelInit::new("pre-agreed")
        };
        let dc = DataChannel::new(4, &init);
        assert_eq!(dc.state, DataChannelState::Open);
    }

    #[test]
    fn fresh_in_band_channel_starts_connecting() {
        let dc = DataChannel::new(0, &DataChannelInit::new("negotiated-in-band"));
        assert_eq!(dc.state, DataChannelState::Connecting);
    }
}
