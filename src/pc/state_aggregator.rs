//! Derives the aggregate `RTCPeerConnectionState`/`RTCIceGatheringState` from
//! the per-transport states, mirroring how a browser folds per-transport
//! state into one connection-level signal.
use crate::pc::transport::{DtlsConnectionState, IceConnectionState, IceGatheringState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerConnectionState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// `sctp_connected` is `true` once the SCTP association itself has reported
/// `Connected` — ICE alone only gets a connection to `Connecting`. A `Closed`
/// DTLS transport always wins: once the transport carrying the association
/// is gone the connection is closed regardless of what ICE last reported.
#[must_use]
pub fn aggregate(
    ice: IceConnectionState,
    dtls: Option<DtlsConnectionState>,
    sctp_connected: bool,
) -> PeerConnectionState {
    if matches!(dtls, Some(DtlsConnectionState::Closed)) {
        return PeerConnectionState::Closed;
    }
    match ice {
        IceConnectionState::New => PeerConnectionState::New,
        IceConnectionState::Checking => PeerConnectionState::Connecting,
        IceConnectionState::Connected if sctp_connected => PeerConnectionState::Connected,
        IceConnectionState::Connected => PeerConnectionState::Connecting,
        IceConnectionState::Failed => PeerConnectionState::Failed,
        IceConnectionState::Closed => PeerConnectionState::Closed,
    }
}

/// All configured ICE gatherers `completed` -> `complete`; any `gathering`
/// -> `gathering`; otherwise `new`. This orchestrator only ever assembles one
/// ICE gatherer (the single bundled transport), but the rule folds over
/// however many a future multi-transport build would have.
#[must_use]
pub fn aggregate_gathering(states: &[IceGatheringState]) -> IceGatheringState {
    if states.iter().all(|s| matches!(s, IceGatheringState::Complete)) && !states.is_empty() {
        IceGatheringState::Complete
    } else if states.iter().any(|s| matches!(s, IceGatheringState::Gathering)) {
        IceGatheringState::Gathering
    } else {
        IceGatheringState::New
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ice_is_new_connection() {
        assert_eq!(aggregate(IceConnectionState::New, None, false), PeerConnectionState::New);
    }

    #[test]
    fn connected_ice_without_sctp_is_still_connecting() {
        assert_eq!(
            aggregate(IceConnectionState::Connected, Some(DtlsConnectionState::Connected), false),
            PeerConnectionState::Connecting
        );
    }

    #[test]
    fn connected_ice_with_sctp_is_connected() {
        assert_eq!(
            aggregate(IceConnectionState::Connected, Some(DtlsConnectionState::Connected), true),
            PeerConnectionState::Connected
        );
    }

    #[test]
    fn failed_ice_is_failed_regardless_of_sctp() {
        assert_eq!(
            aggregate(IceConnectionState::Failed, None, true),
            PeerConnectionState::Failed
        );
    }

    #[test]
    fn closed_ice_is_closed() {
        assert_eq!(aggregate(IceConnectionState::Closed, None, false), PeerConnectionState::Closed);
    }

    #[test]
    fn closed_dtls_closes_connection_even_if_ice_is_connected() {
        assert_eq!(
            aggregate(IceConnectionState::Connected, Some(DtlsConnectionState::Closed), true),
            PeerConnectionState::Closed
        );
    }

    #[test]
    fn gathering_with_no_gatherers_is_new() {
        assert_eq!(aggregate_gathering(&[]), IceGatheringState::New);
    }

    #[test]
    fn gathering_with_one_incomplete_gatherer_is_gathering() {
        assert_eq!(
            aggregate_gathering(&[IceGatheringState::Gathering]),
            IceGatheringState::Gathering
        );
    }

    #[test]
    fn gathering_complete_when_all_gatherers_complete() {
        assert_eq!(
            aggregate_gathering(&[IceGatheringState::Complete, IceGatheringState::Complete]),
            IceGatheringState::Complete
        );
    }

    #[test]
    fn gathering_not_complete_if_any_gatherer_still_new() {
        assert_eq!(
            aggregate_gathering(&[IceGatheringState::Complete, IceGatheringState::New]),
            IceGatheringState::New
        );
    }
}
