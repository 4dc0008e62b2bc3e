pub mod addr_type;
pub mod attribute;
pub mod bandwidth;
pub mod connection;
pub mod media;
pub mod origin;
pub mod port_spec;
pub mod sdp_error;
#[allow(clippy::module_inception)]
pub mod sdpc;
pub mod time_desc;
pub mod util;
