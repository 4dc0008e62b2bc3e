use crate::ice::type_ice::candidate::Candidate;
use crate::ice::type_ice::candidate_type::CandidateType;
use crate::pc::error::OrchestratorError;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

/// A trickled or bundled ICE candidate as exchanged over the signalling
/// channel, mirroring `RTCIceCandidateInit`.
#[derive(Debug, Clone)]
pub struct IceCandidate {
    /// The `candidate:` attribute line, without the leading `a=`.
    pub candidate: String,
    pub sdp_mid: Option<String>,
    pub sdp_mline_index: Option<u16>,
}

impl IceCandidate {
    pub fn new(candidate: Candidate, sdp_mid: Option<String>, sdp_mline_index: Option<u16>) -> Self {
        Self {
            candidate: encode_candidate(&candidate),
            sdp_mid,
            sdp_mline_index,
        }
    }

    /// Parses the `candidate` field back into an `ice::Candidate`.
    ///
    /// # Errors
    /// Returns `OrchestratorError::InvalidArgument` if the candidate line
    /// doesn't follow RFC 8445 §5.1 grammar.
    pub fn to_candidate(&self) -> Result<Candidate, OrchestratorError> {
        decode_candidate(&self.candidate)
    }
}

/// `candidate-attribute = foundation component transport priority
/// connection-address port "typ" cand-type [rel-addr rel-port]`, RFC 8445
/// §5.1. No leading `candidate:` token — that's the SDP attribute key, added
/// by whoever wraps this into an `a=` line.
fn encode_candidate(c: &Candidate) -> String {
    let typ = match c.cand_type {
        CandidateType::Host => "host",
        CandidateType::ServerReflexive => "srflx",
        CandidateType::PeerReflexive => "prflx",
        CandidateType::Relayed => "relay",
    };
    let mut out = format!(
        "{} {} {} {} {} {} typ {}",
        c.foundation,
        c.component,
        c.transport,
        c.priority,
        c.address.ip(),
        c.address.port(),
        typ,
    );
    if let Some(rel) = c.related_address {
        use std::fmt::Write as _;
        let _ = write!(out, " raddr {} rport {}", rel.ip(), rel.port());
    }
    out
}

fn decode_candidate(s: &str) -> Result<Candidate, OrchestratorError> {
    let s = s.trim().strip_prefix("candidate:").unwrap_or(s.trim());
    let parts: Vec<&str> = s.split_whitespace().collect();
    if parts.len() < 8 {
        return Err(OrchestratorError::InvalidArgument(format!(
            "candidate line too short: '{s}'"
        )));
    }

    let foundation = parts[0].to_owned();
    let component: u8 = parts[1]
        .parse()
        .map_err(|_| OrchestratorError::InvalidArgument("invalid component".to_owned()))?;
    let transport = parts[2].to_owned();
    let priority: u32 = parts[3]
        .parse()
        .map_err(|_| OrchestratorError::InvalidArgument("invalid priority".to_owned()))?;
    let ip: IpAddr = parts[4]
        .parse()
        .map_err(|_| OrchestratorError::InvalidArgument("invalid address".to_owned()))?;
    let port: u16 = parts[5]
        .parse()
        .map_err(|_| OrchestratorError::InvalidArgument("invalid port".to_owned()))?;

    if parts.get(6) != Some(&"typ") {
        return Err(OrchestratorError::InvalidArgument(
            "missing 'typ' token".to_owned(),
        ));
    }
    let cand_type = match parts.get(7).copied() {
        Some("host") => CandidateType::Host,
        Some("srflx") => CandidateType::ServerReflexive,
        Some("prflx") => CandidateType::PeerReflexive,
        Some("relay") => CandidateType::Relayed,
        Some(other) => {
            return Err(OrchestratorError::InvalidArgument(format!(
                "unknown candidate type: {other}"
            )));
        }
        None => {
            return Err(OrchestratorError::InvalidArgument(
                "missing candidate type".to_owned(),
            ));
        }
    };

    let mut related_address = None;
    let mut i = 8;
    while i + 1 < parts.len() {
        match parts[i] {
            "raddr" => {
                let rel_ip: IpAddr = parts[i + 1]
                    .parse()
                    .map_err(|_| OrchestratorError::InvalidArgument("invalid raddr".to_owned()))?;
                related_address = Some(SocketAddr::new(rel_ip, 0));
                i += 2;
            }
            "rport" => {
                let rel_port: u16 = parts[i + 1]
                    .parse()
                    .map_err(|_| OrchestratorError::InvalidArgument("invalid rport".to_owned()))?;
                if let Some(sa) = related_address {
                    related_address = Some(SocketAddr::new(sa.ip(), rel_port));
                }
                i += 2;
            }
            _ => i += 1,
        }
    }

    Ok(Candidate::new(
        foundation,
        component,
        &transport,
        priority,
        SocketAddr::new(ip, port),
        cand_type,
        related_address,
        None,
    ))
}

impl FromStr for IceCandidate {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_candidate(s)?;
        Ok(Self {
            candidate: s.to_owned(),
            sdp_mid: None,
            sdp_mline_index: None,
        })
    }
}

impl fmt::Display for IceCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Candidate {
        Candidate::host("127.0.0.1:5000".parse().unwrap(), "UDP", 1, None)
    }

    #[test]
    fn round_trips_host_candidate() {
        let c = sample();
        let ice = IceCandidate::new(c, Some("0".to_owned()), Some(0));
        let back = ice.to_candidate().unwrap();
        assert_eq!(back.address, "127.0.0.1:5000".parse().unwrap());
        assert!(matches!(back.cand_type, CandidateType::Host));
    }

    #[test]
    fn rejects_malformed_line() {
        assert!(decode_candidate("garbage").is_err());
    }

    #[test]
    fn strips_candidate_colon_prefix() {
        let c = sample();
        let ice = IceCandidate::new(c, None, Some(0));
        let line = format!("candidate:{ice}");
        let parsed: IceCandidate = line.parse().unwrap();
        assert!(parsed.to_candidate().is_ok());
    }
}
