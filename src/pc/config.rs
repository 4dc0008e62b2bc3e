use crate::config::Config;

/// How aggressively to collapse media/application sections onto shared
/// ICE/DTLS transports. Stored for API compatibility; this orchestrator only
/// ever negotiates a single `application` section, so every policy behaves
/// like `max-bundle` in practice (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundlePolicy {
    Balanced,
    MaxCompat,
    MaxBundle,
}

impl Default for BundlePolicy {
    fn default() -> Self {
        Self::MaxBundle
    }
}

/// A single configured ICE server (STUN only — this orchestrator never
/// authenticates against a TURN relay).
#[derive(Debug, Clone)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
}

impl IceServerConfig {
    pub fn new(urls: Vec<String>) -> Self {
        Self { urls }
    }
}

/// Configuration accepted by `PeerConnection::new`.
#[derive(Debug, Clone)]
pub struct PeerConnectionConfig {
    pub ice_servers: Vec<IceServerConfig>,
    pub bundle_policy: BundlePolicy,
    /// Seconds to wait for ICE connectivity checks before declaring the
    /// transport `failed`. Read from `[ICE] ice_timeout_secs` when built via
    /// `from_config`.
    pub ice_timeout_secs: u64,
}

impl Default for PeerConnectionConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig::new(vec![
                "stun:stun.l.google.com:19302".to_owned(),
            ])],
            bundle_policy: BundlePolicy::default(),
            ice_timeout_secs: 10,
        }
    }
}

impl PeerConnectionConfig {
    /// Builds a config from the teacher's INI-style `Config`, falling back to
    /// the same defaults `PeerConnectionConfig::default()` uses.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let default = Self::default();
        let stun_url = config
            .get_non_empty_or_default("ICE", "stun_url", "stun:stun.l.google.com:19302")
            .to_owned();
        let ice_timeout_secs = config
            .get_non_empty_or_default("ICE", "ice_timeout_secs", "10")
            .parse()
            .unwrap_or(default.ice_timeout_secs);

        Self {
            ice_servers: vec![IceServerConfig::new(vec![stun_url])],
            bundle_policy: default.bundle_policy,
            ice_timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_one_stun_server() {
        let cfg = PeerConnectionConfig::default();
        assert_eq!(cfg.ice_servers.len(), 1);
        assert_eq!(cfg.bundle_policy, BundlePolicy::MaxBundle);
    }

    #[test]
    fn from_empty_config_falls_back_to_defaults() {
        let config = Config::empty();
        let cfg = PeerConnectionConfig::from_config(&config);
        assert_eq!(cfg.ice_timeout_secs, 10);
        assert_eq!(cfg.ice_servers[0].urls[0], "stun:stun.l.google.com:19302");
    }
}
