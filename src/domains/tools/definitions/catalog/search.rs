//! Track search tool definition.

use futures::FutureExt;
use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRoute, schema_for_type},
    model::{Tool, ToolAnnotations},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::domains::tidal::SessionManager;
use crate::domains::tools::ToolError;
use crate::domains::tools::definitions::common::{
    authenticated_client, clamp_search_limit, into_call_result, parse_params,
};
use crate::domains::tools::definitions::schemas::{Track, TrackList};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the track search tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchTracksParams {
    /// Search query - works best with artist name, song title, or "Artist Song".
    pub query: String,

    /// Maximum number of results (default: 10, max: 50).
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    10
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Search tool - finds tracks in the TIDAL catalog.
pub struct SearchTracksTool;

impl SearchTracksTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "search_tracks";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Search for tracks on TIDAL. Returns tracks with id, title, artist, album, and duration. Use the track ids with 'add_tracks_to_playlist'.";

    /// Run the search with the limit clamped into 1..=50.
    #[instrument(skip_all, fields(query = %params.query, limit = params.limit))]
    pub async fn execute(
        params: &SearchTracksParams,
        session: &SessionManager,
    ) -> Result<TrackList, ToolError> {
        let client = authenticated_client(session).await?;

        let limit = clamp_search_limit(params.limit);
        info!("Searching TIDAL for '{}' (limit {})", params.query, limit);

        let tracks = client
            .search_tracks(&params.query, limit)
            .await
            .map_err(ToolError::upstream("Search failed"))?;

        Ok(TrackList::success(
            Some(params.query.clone()),
            tracks.into_iter().map(Track::from).collect(),
        ))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<SearchTracksParams>().into(),
            annotations: Some(ToolAnnotations {
                title: Some("Search TIDAL tracks".to_string()),
                read_only_hint: Some(true),
                destructive_hint: Some(false),
                idempotent_hint: Some(true),
                open_world_hint: Some(true),
            }),
            output_schema: Some(schema_for_type::<TrackList>().into()),
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Create a ToolRoute for STDIO/TCP transport.
    pub fn create_route<S>(session: Arc<SessionManager>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let arguments = ctx.arguments.clone();
            let session = session.clone();
            async move {
                let params: SearchTracksParams = parse_params(arguments)?;
                Ok(into_call_result(
                    Self::NAME,
                    Self::execute(&params, &session).await,
                ))
            }
            .boxed()
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
