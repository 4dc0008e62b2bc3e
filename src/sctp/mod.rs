pub mod events;
pub mod receiver;
#[allow(clippy::module_inception)]
pub mod sctp_session;
pub mod sender;
pub mod stream;
pub mod transport;
