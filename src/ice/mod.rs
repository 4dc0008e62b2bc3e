pub mod gathering_service;
pub mod signaling_mock;
pub mod type_ice;
