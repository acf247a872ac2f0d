//! Port traits at the I/O seams.

pub mod config_port;
pub mod model_port;
pub mod quote_port;
