//! Transport layer for the MCP server.
//!
//! - **STDIO**: newline-delimited JSON-RPC over stdin/stdout (default) - feature: `stdio`
//! - **TCP**: the same framing over a TCP socket, one MCP session per connection - feature: `tcp`
//!
//! Each transport handles the connection lifecycle and delegates message
//! processing to the MCP server handler. Logs always go to stderr so that
//! stdout stays reserved for protocol frames.

mod config;
mod error;
mod service;

#[cfg(feature = "tcp")]
pub mod tcp;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

#[cfg(feature = "tcp")]
pub use config::TcpConfig;
