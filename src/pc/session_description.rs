use crate::dtls::dtls_role::DtlsRole;
use crate::pc::error::OrchestratorError;
use crate::pc::ice_candidate::IceCandidate;
use crate::pc::signaling_state::SdpType;
use crate::sdp::attribute::Attribute;
use crate::sdp::connection::Connection;
use crate::sdp::media::{Media, MediaKind};
use crate::sdp::origin::Origin;
use crate::sdp::port_spec::PortSpec;
use crate::sdp::sdpc::Sdp;
use crate::sdp::time_desc::TimeDesc;
use std::fmt;

const DEFAULT_CONN_ADDR: &str = "0.0.0.0";
const DISCARD_PORT: u16 = 9;

/// `a=setup` value, RFC 8842. Offers always carry `ActPass`; answers always
/// carry `Active` or `Passive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtlsSetup {
    ActPass,
    Active,
    Passive,
}

impl DtlsSetup {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ActPass => "actpass",
            Self::Active => "active",
            Self::Passive => "passive",
        }
    }
}

impl std::str::FromStr for DtlsSetup {
    type Err = OrchestratorError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "actpass" => Ok(Self::ActPass),
            "active" => Ok(Self::Active),
            "passive" => Ok(Self::Passive),
            other => Err(OrchestratorError::InvalidArgument(format!(
                "unrecognized a=setup value: {other}"
            ))),
        }
    }
}

impl fmt::Display for DtlsSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The answerer's `a=setup` value given what the offer carried. An answer
/// may never echo `actpass` — RFC 8842 §5.3: the answerer must pick a
/// concrete side, defaulting to `active` whenever the offer leaves it open
/// or already claims `passive`.
pub const fn answer_setup_for(remote_offer_setup: DtlsSetup) -> DtlsSetup {
    match remote_offer_setup {
        DtlsSetup::Active => DtlsSetup::Passive,
        DtlsSetup::Passive | DtlsSetup::ActPass => DtlsSetup::Active,
    }
}

/// Maps a resolved (non-`actpass`) `a=setup` value to the DTLS handshake
/// role the local transport must play.
pub const fn dtls_role_from_setup(setup: DtlsSetup) -> DtlsRole {
    match setup {
        DtlsSetup::Active => DtlsRole::Client,
        DtlsSetup::Passive | DtlsSetup::ActPass => DtlsRole::Server,
    }
}

/// A typed view over `Sdp` carrying the offer/answer/pranswer/rollback kind,
/// mirroring `RTCSessionDescription`.
#[derive(Debug, Clone)]
pub struct SessionDescription {
    pub sdp_type: SdpType,
    pub sdp: Sdp,
}

impl SessionDescription {
    pub fn parse(sdp_type: SdpType, text: &str) -> Result<Self, OrchestratorError> {
        let sdp = Sdp::parse(text)?;
        Ok(Self { sdp_type, sdp })
    }

    #[must_use]
    pub fn to_sdp_string(&self) -> String {
        self.sdp.encode()
    }
}

/// Everything the single `application` m-section needs, gathered from the
/// transports before the SDP is assembled. This orchestrator is
/// data-channel-only, so there is always exactly one bundled section.
pub struct ApplicationSectionParams<'a> {
    pub mid: &'a str,
    pub ice_ufrag: &'a str,
    pub ice_pwd: &'a str,
    pub fingerprint_hex: &'a str,
    pub setup: DtlsSetup,
    pub sctp_port: u16,
    pub legacy_sctp_sdp: bool,
    pub candidates: &'a [IceCandidate],
    pub end_of_candidates: bool,
}

/// Builds a full session description around the single `application`
/// section, with a one-item BUNDLE group, mirroring
/// `ConnectionManager::build_local_sdp`/`build_media_description` but for
/// a data-channel transport instead of an RTP media line.
#[must_use]
pub fn build_session_description(
    sdp_type: SdpType,
    params: &ApplicationSectionParams<'_>,
) -> SessionDescription {
    let media = build_application_media(params);

    let sdp = Sdp::new(
        0,
        Origin::new_blank(),
        "-".to_owned(),
        None,
        None,
        Vec::new(),
        Vec::new(),
        Some(Connection::new("IN", crate::sdp::addr_type::AddrType::IP4, DEFAULT_CONN_ADDR)),
        Vec::new(),
        vec![TimeDesc::new_blank()],
        vec![
            Attribute::new("group", Some(format!("BUNDLE {}", params.mid))),
            Attribute::new("msid-semantic", Some(" WMS *".to_owned())),
        ],
        vec![media],
        Vec::new(),
    );

    SessionDescription { sdp_type, sdp }
}

fn build_application_media(params: &ApplicationSectionParams<'_>) -> Media {
    let (proto, fmts) = if params.legacy_sctp_sdp {
        ("DTLS/SCTP".to_owned(), vec![params.sctp_port.to_string()])
    } else {
        (
            "UDP/DTLS/SCTP".to_owned(),
            vec!["webrtc-datachannel".to_owned()],
        )
    };

    let mut attrs = vec![
        Attribute::new("mid", Some(params.mid.to_owned())),
        Attribute::new("ice-ufrag", Some(params.ice_ufrag.to_owned())),
        Attribute::new("ice-pwd", Some(params.ice_pwd.to_owned())),
        Attribute::new(
            "fingerprint",
            Some(format!("sha-256 {}", params.fingerprint_hex)),
        ),
        Attribute::new("setup", Some(params.setup.as_str().to_owned())),
    ];

    for cand in params.candidates {
        attrs.push(Attribute::new(
            "candidate",
            Some(cand.candidate.clone()),
        ));
    }
    if params.end_of_candidates {
        attrs.push(Attribute::new("end-of-candidates", None::<String>));
    }

    if params.legacy_sctp_sdp {
        attrs.push(Attribute::new(
            "sctpmap",
            Some(format!("{} webrtc-datachannel 65535", params.sctp_port)),
        ));
    } else {
        attrs.push(Attribute::new(
            "sctp-port",
            Some(params.sctp_port.to_string()),
        ));
    }

    Media::new(
        MediaKind::Application,
        PortSpec::new(DISCARD_PORT, None),
        proto,
        fmts,
        None,
        Some(Connection::new("IN", crate::sdp::addr_type::AddrType::IP4, DEFAULT_CONN_ADDR)),
        Vec::new(),
        attrs,
        Vec::new(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(setup: DtlsSetup, legacy: bool) -> ApplicationSectionParams<'static> {
        ApplicationSectionParams {
            mid: "0",
            ice_ufrag: "ufrag",
            ice_pwd: "password1234567890123",
            fingerprint_hex: "AA:BB",
            setup,
            sctp_port: 5000,
            legacy_sctp_sdp: legacy,
            candidates: &[],
            end_of_candidates: true,
        }
    }

    #[test]
    fn answer_setup_defaults_to_active() {
        assert_eq!(answer_setup_for(DtlsSetup::ActPass), DtlsSetup::Active);
        assert_eq!(answer_setup_for(DtlsSetup::Passive), DtlsSetup::Active);
        assert_eq!(answer_setup_for(DtlsSetup::Active), DtlsSetup::Passive);
    }

    #[test]
    fn setup_maps_to_dtls_role() {
        assert!(matches!(
            dtls_role_from_setup(DtlsSetup::Active),
            DtlsRole::Client
        ));
        assert!(matches!(
            dtls_role_from_setup(DtlsSetup::Passive),
            DtlsRole::Server
        ));
    }

    #[test]
    fn modern_profile_emits_sctp_port() {
        let desc = build_session_description(SdpType::Offer, &params(DtlsSetup::ActPass, false));
        let text = desc.to_sdp_string();
        assert!(text.contains("m=application 9 UDP/DTLS/SCTP webrtc-datachannel"));
        assert!(text.contains("a=sctp-port:5000"));
        assert!(text.contains("a=setup:actpass"));
        assert!(text.contains("a=group:BUNDLE 0"));
    }

    #[test]
    fn legacy_profile_emits_sctpmap() {
        let desc = build_session_description(SdpType::Answer, &params(DtlsSetup::Active, true));
        let text = desc.to_sdp_string();
        assert!(text.contains("m=application 9 DTLS/SCTP 5000"));
        assert!(text.contains("a=sctpmap:5000 webrtc-datachannel 65535"));
        assert!(!text.contains("a=sctp-port"));
    }
}
