//! Tool-specific error types.

use thiserror::Error;

use crate::domains::tidal::TidalError;

/// Ways a tool call can fail. Every variant is reported to the caller as
/// an error result; none of them stops the server.
#[derive(Debug, Error)]
pub enum ToolError {
    /// No valid TIDAL session.
    #[error("Not authenticated. Please run the 'login' tool first.")]
    NotAuthenticated,

    /// A referenced resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A track id is not numeric.
    #[error("Invalid track ID format: {0}")]
    InvalidTrackId(String),

    /// The streaming service call failed.
    #[error("{context}: {source}")]
    Upstream {
        context: &'static str,
        #[source]
        source: TidalError,
    },

    /// The service reported failure without an error.
    #[error("{0}")]
    ExecutionFailed(String),

    /// The OAuth flow did not produce a valid session.
    #[error("Authentication failed - {0}")]
    AuthenticationFailed(String),

    /// The user did not finish the browser login in time.
    #[error("Authentication timed out after {0} seconds; run 'login' again")]
    LoginTimeout(u64),
}

impl ToolError {
    /// Create a "playlist not found" error.
    pub fn playlist_not_found(playlist_id: &str) -> Self {
        Self::NotFound(format!("Playlist with ID '{}' not found", playlist_id))
    }

    /// Create an "invalid track id" error.
    pub fn invalid_track_id(detail: impl Into<String>) -> Self {
        Self::InvalidTrackId(detail.into())
    }

    /// Create an "execution failed" error.
    pub fn execution_failed(msg: impl Into<String>) -> Self {
        Self::ExecutionFailed(msg.into())
    }

    /// Returns a closure wrapping a client error with `context`, for `map_err`.
    pub fn upstream(context: &'static str) -> impl FnOnce(TidalError) -> Self {
        move |source| Self::Upstream { context, source }
    }

    /// Short category name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "not_authenticated",
            Self::NotFound(_) => "not_found",
            Self::InvalidTrackId(_) => "invalid_input",
            Self::Upstream { .. } | Self::ExecutionFailed(_) => "upstream_failure",
            Self::AuthenticationFailed(_) | Self::LoginTimeout(_) => "authentication_failure",
        }
    }
}
