use crate::dtls::dtls_error::DtlsError;
use crate::sdp::sdp_error::SdpError;
use std::fmt;

/// Error type returned by every public `PeerConnection` operation.
#[derive(Debug)]
pub enum OrchestratorError {
    /// A caller asked for an operation the current signalling/ICE/DTLS state
    /// doesn't allow (e.g. `set_local_description` with no matching pending type).
    InvalidState(String),
    /// Malformed or semantically invalid input: unparsable SDP, an answer
    /// carrying an illegal `a=setup`, a candidate missing both `sdpMid` and
    /// `sdpMLineIndex`, etc.
    InvalidArgument(String),
    /// The negotiated transports (ICE/DTLS/SCTP) failed to establish or were
    /// torn down unexpectedly.
    TransportFailure(String),
    /// Every DTLS transport for this connection has closed. Triggers an
    /// implicit `close()`.
    RemoteShutdown(String),
}

impl fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidState(s) => write!(f, "invalid state: {s}"),
            Self::InvalidArgument(s) => write!(f, "invalid argument: {s}"),
            Self::TransportFailure(s) => write!(f, "transport failure: {s}"),
            Self::RemoteShutdown(s) => write!(f, "remote shutdown: {s}"),
        }
    }
}

impl std::error::Error for OrchestratorError {}

impl From<SdpError> for OrchestratorError {
    fn from(e: SdpError) -> Self {
        Self::InvalidArgument(format!("{e:?}"))
    }
}

impl From<DtlsError> for OrchestratorError {
    fn from(e: DtlsError) -> Self {
        Self::TransportFailure(e.to_string())
    }
}

impl From<std::io::Error> for OrchestratorError {
    fn from(e: std::io::Error) -> Self {
        Self::TransportFailure(e.to_string())
    }
}
