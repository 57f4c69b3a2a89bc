//! Chat relay: wire protocol, HTTP service and client transport.

pub mod client;
pub mod protocol;
pub mod server;

pub use client::{HttpRelay, RelayTransport};
pub use protocol::{Message, RelayErrorBody, RelayRequest, RelayResponse, Role};
pub use server::{RelayOptions, RelayState, build_router, run_relay_server};
