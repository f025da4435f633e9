//! Port traits between the domain and its I/O adapters.

pub mod config_port;
pub mod quote_port;
pub mod snapshot_port;
