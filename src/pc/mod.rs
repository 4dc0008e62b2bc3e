pub mod config;
pub mod connect_driver;
pub mod data_channel;
pub mod error;
pub mod ice_candidate;
pub mod peer_connection;
pub mod session_description;
pub mod signaling_state;
pub mod state_aggregator;
pub mod transport;
