use crate::pc::error::OrchestratorError;
use std::fmt;

/// The six signalling states from the offer/answer state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalingState {
    Stable,
    HaveLocalOffer,
    HaveRemoteOffer,
    HaveLocalPranswer,
    HaveRemotePranswer,
    Closed,
}

impl fmt::Display for SignalingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stable => "stable",
            Self::HaveLocalOffer => "have-local-offer",
            Self::HaveRemoteOffer => "have-remote-offer",
            Self::HaveLocalPranswer => "have-local-pranswer",
            Self::HaveRemotePranswer => "have-remote-pranswer",
            Self::Closed => "closed",
        })
    }
}

/// The kind of SDP being set, mirrors `RTCSdpType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdpType {
    Offer,
    Pranswer,
    Answer,
    Rollback,
}

impl fmt::Display for SdpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Offer => "offer",
            Self::Pranswer => "pranswer",
            Self::Answer => "answer",
            Self::Rollback => "rollback",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Local,
    Remote,
}

/// Validates and applies a `setLocalDescription`/`setRemoteDescription` SDP
/// type against the current state, returning the next state.
///
/// Table (side, sdp_type, current) -> next, per the spec's signalling state
/// machine:
/// - (Local, Offer, Stable | HaveLocalOffer) -> HaveLocalOffer
/// - (Remote, Offer, Stable | HaveRemoteOffer) -> HaveRemoteOffer
/// - (Local, Pranswer, HaveRemoteOffer) -> HaveLocalPranswer
/// - (Remote, Pranswer, HaveLocalOffer) -> HaveRemotePranswer
/// - (Local, Answer, HaveRemoteOffer | HaveLocalPranswer) -> Stable
/// - (Remote, Answer, HaveLocalOffer | HaveRemotePranswer) -> Stable
/// - (_, Rollback, HaveLocalOffer | HaveRemoteOffer) -> Stable
/// everything else is rejected.
pub fn next_state(
    current: SignalingState,
    side: Side,
    sdp_type: SdpType,
) -> Result<SignalingState, OrchestratorError> {
    use SdpType::{Answer, Offer, Pranswer, Rollback};
    use Side::{Local, Remote};
    use SignalingState::{
        Closed, HaveLocalOffer, HaveLocalPranswer, HaveRemoteOffer, HaveRemotePranswer, Stable,
    };

    if matches!(current, Closed) {
        return Err(OrchestratorError::InvalidState(
            "connection is closed".to_owned(),
        ));
    }

    let next = match (side, sdp_type, current) {
        (Local, Offer, Stable | HaveLocalOffer) => HaveLocalOffer,
        (Remote, Offer, Stable | HaveRemoteOffer) => HaveRemoteOffer,
        (Local, Pranswer, HaveRemoteOffer | HaveLocalPranswer) => HaveLocalPranswer,
        (Remote, Pranswer, HaveLocalOffer | HaveRemotePranswer) => HaveRemotePranswer,
        (Local, Answer, HaveRemoteOffer | HaveLocalPranswer) => Stable,
        (Remote, Answer, HaveLocalOffer | HaveRemotePranswer) => Stable,
        (_, Rollback, HaveLocalOffer | HaveRemoteOffer) => Stable,
        _ => {
            return Err(OrchestratorError::InvalidState(format!(
                "cannot apply {side:?} {sdp_type} while in {current}"
            )));
        }
    };
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_answer_round_trip() {
        let s = SignalingState::Stable;
        let s = next_state(s, Side::Local, SdpType::Offer).unwrap();
        assert_eq!(s, SignalingState::HaveLocalOffer);
        let s = next_state(s, Side::Remote, SdpType::Answer).unwrap();
        assert_eq!(s, SignalingState::Stable);
    }

    #[test]
    fn pranswer_then_answer() {
        let s = SignalingState::Stable;
        let s = next_state(s, Side::Remote, SdpType::Offer).unwrap();
        assert_eq!(s, SignalingState::HaveRemoteOffer);
        let s = next_state(s, Side::Local, SdpType::Pranswer).unwrap();
        assert_eq!(s, SignalingState::HaveLocalPranswer);
        let s = next_state(s, Side::Local, SdpType::Answer).unwrap();
        assert_eq!(s, SignalingState::Stable);
    }

    #[test]
    fn rollback_from_have_local_offer() {
        let s = SignalingState::HaveLocalOffer;
        let s = next_state(s, Side::Local, SdpType::Rollback).unwrap();
        assert_eq!(s, SignalingState::Stable);
    }

    #[test]
    fn rejects_offer_while_have_remote_offer() {
        let s = SignalingState::HaveRemoteOffer;
        assert!(next_state(s, Side::Local, SdpType::Offer).is_err());
    }

    #[test]
    fn resetting_the_same_local_offer_stays_in_have_local_offer() {
        let s = SignalingState::HaveLocalOffer;
        let s = next_state(s, Side::Local, SdpType::Offer).unwrap();
        assert_eq!(s, SignalingState::HaveLocalOffer);
    }

    #[test]
    fn resetting_the_same_remote_offer_stays_in_have_remote_offer() {
        let s = SignalingState::HaveRemoteOffer;
        let s = next_state(s, Side::Remote, SdpType::Offer).unwrap();
        assert_eq!(s, SignalingState::HaveRemoteOffer);
    }

    #[test]
    fn rejects_everything_once_closed() {
        assert!(next_state(SignalingState::Closed, Side::Local, SdpType::Offer).is_err());
    }
}
