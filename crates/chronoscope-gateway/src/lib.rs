//! Chronoscope Gateway - filesystem store and the HTTP server in front of it

pub mod fs_store;
pub mod server;

pub use fs_store::FsStore;
pub use server::{build_store, router, start_gateway, GatewayState};
