//! TIDAL MCP Server Library
//!
//! A Model Context Protocol server that lets AI agents search the TIDAL
//! catalog, manage playlists and read the user's library.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the server handler and transports
//! - **domains**: business logic organized by bounded contexts
//!   - **tidal**: streaming client, OAuth device login and session persistence
//!   - **tools**: the MCP tools exposed to clients
//!
//! # Example
//!
//! ```rust,no_run
//! use tidal_mcp_server::{core::McpServer, core::Config, core::TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config.clone())?;
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
