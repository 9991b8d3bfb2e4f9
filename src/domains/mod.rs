//! Domains module containing business logic organized by bounded contexts.
//!
//! - `tidal`: the streaming-service client and the shared login session
//! - `tools`: the MCP tools built on top of it

pub mod tidal;
pub mod tools;
