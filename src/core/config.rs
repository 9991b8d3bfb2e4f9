//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables (optionally through a `.env` file)
//! or defaults.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default TIDAL REST API root.
pub const DEFAULT_TIDAL_API_URL: &str = "https://api.tidal.com/v1";

/// Default TIDAL OAuth root.
pub const DEFAULT_TIDAL_AUTH_URL: &str = "https://auth.tidal.com/v1/oauth2";

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// TIDAL client and session configuration.
    pub tidal: TidalConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

/// TIDAL client, OAuth and session persistence settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct TidalConfig {
    /// OAuth client id used for the device login and token refresh.
    pub client_id: Option<String>,

    /// OAuth client secret paired with `client_id`.
    #[serde(skip_serializing)]
    pub client_secret: Option<String>,

    /// File holding the persisted session (tokens, user id, country).
    pub session_file: PathBuf,

    /// Upper bound on how long `login` waits for the browser flow.
    pub login_timeout_secs: u64,

    /// Launch the system browser on the verification URL during `login`.
    pub open_browser: bool,

    /// REST API root.
    pub api_url: String,

    /// OAuth root.
    pub auth_url: String,

    /// Per-request HTTP timeout.
    pub request_timeout_secs: u64,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for TidalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TidalConfig")
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("session_file", &self.session_file)
            .field("login_timeout_secs", &self.login_timeout_secs)
            .field("open_browser", &self.open_browser)
            .field("api_url", &self.api_url)
            .field("auth_url", &self.auth_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl TidalConfig {
    /// Login wait bound as a `Duration`.
    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }

    /// HTTP request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Whether both halves of the OAuth client credentials are present.
    pub fn has_client_credentials(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }
}

impl Default for TidalConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            session_file: PathBuf::from(".tidal-sessions").join("session.json"),
            login_timeout_secs: 300,
            open_browser: true,
            api_url: DEFAULT_TIDAL_API_URL.to_string(),
            auth_url: DEFAULT_TIDAL_AUTH_URL.to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "tidal-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                with_timestamps: true,
            },
            transport: TransportConfig::default(),
            tidal: TidalConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `MCP_`.
    /// For example: `MCP_SERVER_NAME`, `MCP_LOG_LEVEL`, `MCP_TIDAL_CLIENT_ID`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        config.tidal = TidalConfig::from_env();

        config
    }
}

impl TidalConfig {
    /// Load the TIDAL section from `MCP_TIDAL_*` variables.
    pub fn from_env() -> Self {
        let mut tidal = Self::default();

        tidal.client_id = non_empty_var("MCP_TIDAL_CLIENT_ID");
        tidal.client_secret = non_empty_var("MCP_TIDAL_CLIENT_SECRET");

        if let Some(path) = non_empty_var("MCP_TIDAL_SESSION_FILE") {
            tidal.session_file = PathBuf::from(path);
        }

        if let Ok(secs) = std::env::var("MCP_TIDAL_LOGIN_TIMEOUT_SECS") {
            tidal.login_timeout_secs = secs.parse().unwrap_or(tidal.login_timeout_secs);
        }

        if let Ok(open) = std::env::var("MCP_TIDAL_OPEN_BROWSER") {
            tidal.open_browser = open.to_lowercase() != "false" && open != "0";
        }

        if let Some(url) = non_empty_var("MCP_TIDAL_API_URL") {
            tidal.api_url = url.trim_end_matches('/').to_string();
        }

        if let Some(url) = non_empty_var("MCP_TIDAL_AUTH_URL") {
            tidal.auth_url = url.trim_end_matches('/').to_string();
        }

        if let Ok(secs) = std::env::var("MCP_TIDAL_REQUEST_TIMEOUT_SECS") {
            tidal.request_timeout_secs = secs.parse().unwrap_or(tidal.request_timeout_secs);
        }

        tidal
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
