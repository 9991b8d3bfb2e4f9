//! Tools domain module.
//!
//! Tools are the functions MCP clients call. Every TIDAL tool checks the
//! shared session, calls the streaming client once, and reshapes the result
//! into one of the records in `definitions/schemas.rs`.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `router.rs` - ToolRouter builder for STDIO/TCP transport
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` with params, `execute()` and `create_route()`
//! 2. Export it from the matching `mod.rs`
//! 3. Add its route in `router.rs`

pub mod definitions;
mod error;
pub mod router;

pub use error::ToolError;
pub use router::build_tool_router;
