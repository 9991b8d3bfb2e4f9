//! TIDAL client and session error types.

use thiserror::Error;

/// Errors raised by the streaming client and the session layer.
#[derive(Debug, Error)]
pub enum TidalError {
    /// No usable session: never logged in, or tokens expired without refresh.
    #[error("not logged in to TIDAL")]
    NotAuthenticated,

    /// OAuth client id/secret are required for this call but not configured.
    #[error("TIDAL client credentials are not configured (set MCP_TIDAL_CLIENT_ID and MCP_TIDAL_CLIENT_SECRET)")]
    MissingClientCredentials,

    /// The API answered with a non-success status.
    #[error("TIDAL API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The OAuth endpoint rejected a device or token request.
    #[error("OAuth error '{code}': {description}")]
    OAuth { code: String, description: String },

    /// The device code expired before the user finished the browser flow.
    #[error("device authorization expired before it was approved")]
    DeviceCodeExpired,

    /// The browser flow did not finish within the configured bound.
    #[error("login did not complete within {0} seconds")]
    LoginTimeout(u64),

    /// The handshake finished but the resulting session is not valid.
    #[error("OAuth flow did not complete")]
    LoginIncomplete,

    /// The configured API root is not a usable base URL.
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),

    /// Transport-level HTTP failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Session file could not be read or written.
    #[error("session file error: {0}")]
    Io(#[from] std::io::Error),

    /// Session file or response body could not be (de)serialized.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl TidalError {
    /// Create an API error from a status code and message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }
}
