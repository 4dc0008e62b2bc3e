use crate::ice::type_ice::candidate::Candidate;

/// RFC 8445 §6.1.2.6 connectivity-check state machine for a single candidate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidatePairState {
    Waiting,
    InProgress,
    Succeeded,
    Failed,
}

#[derive(Debug)]
pub struct CandidatePair {
    pub local: Candidate,
    pub remote: Candidate,
    pub priority: u64,
    pub state: CandidatePairState,
    pub is_nominated: bool,
}

impl CandidatePair {
    pub fn new(local: Candidate, remote: Candidate, priority: u64) -> Self {
        CandidatePair {
            local,
            remote,
            priority,
            state: CandidatePairState::Waiting,
            is_nominated: false,
        }
    }

    /// Light copy for stashing a pair (e.g. as `nominated_pair`) without
    /// duplicating the underlying `UdpSocket`s.
    pub fn clone_light(&self) -> Self {
        Self {
            local: self.local.clone_light(),
            remote: self.remote.clone_light(),
            priority: self.priority,
            state: self.state,
            is_nominated: self.is_nominated,
        }
    }
}
