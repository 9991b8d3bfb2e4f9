//! MCP Server implementation and lifecycle management.
//!
//! This module contains the server handler that implements the MCP protocol
//! by routing tool calls to the TIDAL tools.
//!
//! ## Tool Architecture
//!
//! Tools are defined in `domains/tools/definitions/` with one file per tool.
//! Each tool defines:
//! - Parameters struct (deserialized from the call arguments)
//! - `execute()` method (core logic, returns `Result<Record, ToolError>`)
//! - `create_route()` method (rmcp route sharing the `SessionManager`)
//!
//! The ToolRouter is built in `domains/tools/router.rs`.

use rmcp::{ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler};
use std::sync::Arc;
use tracing::info;

use super::config::Config;
use crate::domains::tidal::{SessionManager, TidalClient};
use crate::domains::tools::build_tool_router;

/// Instructions sent to clients during initialization.
pub const SERVER_INSTRUCTIONS: &str = "MCP server for TIDAL music streaming service integration.

Provides tools for searching music, managing playlists, and accessing your TIDAL library.

Authentication:
- Use the 'login' tool first to authenticate with TIDAL via OAuth
- Session is persisted and reused across restarts

Search:
- Use 'search_tracks' to find music (works best with artist names or song titles)

Playlist Management:
- Create playlists with 'create_playlist'
- Add tracks with 'add_tracks_to_playlist'
- List your playlists with 'get_user_playlists'
- Get playlist tracks with 'get_playlist_tracks'

Library Access:
- Get favorite tracks with 'get_favorites'
";

/// The main MCP server handler.
///
/// Cloned once per MCP session; every clone shares the same TIDAL session.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Shared TIDAL session used by every tool.
    session: Arc<SessionManager>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a server talking to TIDAL with the configured credentials.
    pub fn new(config: Config) -> crate::Result<Self> {
        let client = TidalClient::new(&config.tidal)?;
        let session = SessionManager::new(Arc::new(client), &config.tidal);
        info!("TIDAL session file: {:?}", session.session_file());
        Ok(Self::with_session(config, Arc::new(session)))
    }

    /// Create a server around an existing session manager.
    pub fn with_session(config: Config, session: Arc<SessionManager>) -> Self {
        Self {
            tool_router: build_tool_router::<Self>(session.clone()),
            config: Arc::new(config),
            session,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Get the shared TIDAL session.
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Tools exposed by this server.
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
