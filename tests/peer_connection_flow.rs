//! Drives two `PeerConnection`s through offer/answer negotiation the way a
//! signalling server would relay SDP between them, without actually
//! completing an ICE/DTLS handshake (no network peer to complete it with).
#![allow(clippy::unwrap_used, clippy::expect_used)]
mod common;

use rustyrtc::pc::config::PeerConnectionConfig;
use rustyrtc::pc::data_channel::DataChannelInit;
use rustyrtc::pc::error::OrchestratorError;
use rustyrtc::pc::ice_candidate::IceCandidate;
use rustyrtc::pc::peer_connection::PeerConnection;
use rustyrtc::pc::signaling_state::SignalingState;

fn new_pc() -> PeerConnection {
    PeerConnection::new(PeerConnectionConfig::default(), common::cert_config()).expect("new pc")
}

#[test]
fn offer_answer_exchange_reaches_stable_on_both_sides() {
    let mut offerer = new_pc();
    let mut answerer = new_pc();

    let offer = offerer.create_offer().expect("create offer");
    offerer.set_local_description(offer.clone()).expect("set local offer");
    assert_eq!(offerer.signaling_state(), SignalingState::HaveLocalOffer);

    answerer.set_remote_description(offer).expect("set remote offer");
    assert_eq!(answerer.signaling_state(), SignalingState::HaveRemoteOffer);

    let answer = answerer.create_answer().expect("create answer");
    answerer.set_local_description(answer.clone()).expect("set local answer");
    assert_eq!(answerer.signaling_state(), SignalingState::Stable);

    offerer.set_remote_description(answer).expect("set remote answer");
    assert_eq!(offerer.signaling_state(), SignalingState::Stable);
}

#[test]
fn data_channel_created_before_negotiation_is_queued_then_flushed_on_reoffer() {
    let mut offerer = new_pc();
    let mut answerer = new_pc();

    let offer = offerer.create_offer().expect("create offer");
    offerer.set_local_description(offer.clone()).expect("set local offer");

    let channel = offerer
        .create_data_channel(DataChannelInit::new("chat"))
        .expect("create data channel");
    assert_eq!(channel.label, "chat");

    answerer.set_remote_description(offer).expect("set remote offer");
    let answer = answerer.create_answer().expect("create answer");
    answerer.set_local_description(answer.clone()).expect("set local answer");
    offerer.set_remote_description(answer).expect("set remote answer");

    assert_eq!(offerer.signaling_state(), SignalingState::Stable);
}

#[test]
fn answer_with_mismatched_sections_is_rejected() {
    let mut offerer = new_pc();
    let mut answerer = new_pc();

    let offer = offerer.create_offer().expect("create offer");
    offerer.set_local_description(offer.clone()).expect("set local offer");
    answerer.set_remote_description(offer).expect("set remote offer");

    let mut answer = answerer.create_answer().expect("create answer");
    // Drop the only media section, breaking the offer's (kind, mid) sequence.
    answer.sdp.media.clear();

    let err = answerer.set_local_description(answer).unwrap_err();
    assert!(matches!(err, OrchestratorError::InvalidArgument(_)));
}

#[test]
fn add_ice_candidate_mirrors_into_stored_remote_description() {
    let mut offerer = new_pc();
    let mut answerer = new_pc();

    let offer = offerer.create_offer().expect("create offer");
    offerer.set_local_description(offer.clone()).expect("set local offer");
    answerer.set_remote_description(offer).expect("set remote offer");

    let candidate = IceCandidate {
        candidate: "1 1 udp 2130706431 10.0.0.5 54321 typ host".to_owned(),
        sdp_mid: Some("0".to_owned()),
        sdp_mline_index: Some(0),
    };
    answerer.add_ice_candidate(Some(candidate)).expect("add candidate");

    let remote = answerer.remote_description().expect("remote description stored");
    let has_mirrored_candidate = remote.sdp.media[0]
        .attrs()
        .iter()
        .any(|a| a.key() == "candidate" && a.value() == Some("1 1 udp 2130706431 10.0.0.5 54321 typ host"));
    assert!(has_mirrored_candidate);

    answerer.add_ice_candidate(None).expect("end of candidates");
    let remote = answerer.remote_description().expect("remote description stored");
    assert!(remote.sdp.media[0].attrs().iter().any(|a| a.key() == "end-of-candidates"));
}

#[test]
fn close_is_idempotent_and_terminal_for_both_peers() {
    let mut offerer = new_pc();
    let mut answerer = new_pc();

    offerer.close();
    answerer.close();
    offerer.close();

    assert_eq!(offerer.signaling_state(), SignalingState::Closed);
    assert_eq!(answerer.signaling_state(), SignalingState::Closed);
    assert!(matches!(
        offerer.create_offer().unwrap_err(),
        OrchestratorError::InvalidState(_)
    ));
}
