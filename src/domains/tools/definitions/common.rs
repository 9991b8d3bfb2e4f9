//! Helpers shared by all TIDAL tools.
//!
//! [`into_call_result`] is the one place where a handler's
//! `Result<Record, ToolError>` becomes an MCP `CallToolResult`.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content, JsonObject},
};
use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

use super::schemas::ErrorResult;
use crate::domains::tidal::{SessionManager, StreamingClient};
use crate::domains::tools::ToolError;

/// Upper bound for `search_tracks` results.
pub const MAX_SEARCH_LIMIT: i64 = 50;

/// Decode tool arguments, rejecting malformed input at the protocol level.
pub fn parse_params<P: DeserializeOwned>(arguments: Option<JsonObject>) -> Result<P, McpError> {
    let args = arguments.unwrap_or_default();
    serde_json::from_value(serde_json::Value::Object(args))
        .map_err(|e| McpError::invalid_params(e.to_string(), None))
}

/// The streaming client, once the shared session is a valid login.
pub async fn authenticated_client(
    session: &SessionManager,
) -> Result<&dyn StreamingClient, ToolError> {
    if session.ensure_authenticated().await {
        Ok(session.client())
    } else {
        Err(ToolError::NotAuthenticated)
    }
}

/// Convert a handler outcome into a tool result.
///
/// Success records become structured content. Failures become an error
/// result (`isError: true`) carrying an [`ErrorResult`].
pub fn into_call_result<T: Serialize>(tool: &str, result: Result<T, ToolError>) -> CallToolResult {
    match result {
        Ok(record) => match serde_json::to_value(&record) {
            Ok(value) => CallToolResult {
                content: vec![Content::text(value.to_string())],
                structured_content: Some(value),
                is_error: Some(false),
                meta: None,
            },
            Err(e) => error_result(tool, "serialization", format!("Failed to encode result: {}", e)),
        },
        Err(e) => error_result(tool, e.kind(), e.to_string()),
    }
}

fn error_result(tool: &str, kind: &str, message: String) -> CallToolResult {
    warn!(tool, kind, "{}", message);
    let body = serde_json::to_value(ErrorResult::new(message.clone())).ok();
    CallToolResult {
        content: vec![Content::text(message)],
        structured_content: body,
        is_error: Some(true),
        meta: None,
    }
}

/// Clamp a requested search size into `1..=MAX_SEARCH_LIMIT`.
pub fn clamp_search_limit(limit: i64) -> u32 {
    limit.clamp(1, MAX_SEARCH_LIMIT) as u32
}

/// Parse catalog track ids, failing on the first non-numeric one.
pub fn parse_track_ids(track_ids: &[String]) -> Result<Vec<u64>, ToolError> {
    track_ids
        .iter()
        .map(|raw| {
            raw.trim().parse::<u64>().map_err(|e| {
                ToolError::invalid_track_id(format!("'{}' is not a track ID ({})", raw, e))
            })
        })
        .collect()
}
