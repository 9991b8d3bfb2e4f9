//! Playlist tracks tool definition.

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
    authenticated_client, into_call_result, parse_params,
};
use crate::domains::tools::definitions::schemas::{PlaylistTracks, Track};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the playlist tracks tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetPlaylistTracksParams {
    /// ID of the playlist.
    pub playlist_id: String,

    /// Maximum number of tracks to return (default: 100).
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    100
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Playlist tracks tool - lists the tracks of one playlist.
pub struct GetPlaylistTracksTool;

impl GetPlaylistTracksTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "get_playlist_tracks";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Get tracks from a specific TIDAL playlist, in playlist order.";

    #[instrument(skip_all, fields(playlist_id = %params.playlist_id, limit = params.limit))]
    pub async fn execute(
        params: &GetPlaylistTracksParams,
        session: &SessionManager,
    ) -> Result<PlaylistTracks, ToolError> {
        let client = authenticated_client(session).await?;

        let playlist = client
            .playlist(&params.playlist_id)
            .await
            .map_err(ToolError::upstream("Failed to get playlist tracks"))?
            .ok_or_else(|| ToolError::playlist_not_found(&params.playlist_id))?;

        info!("Fetching tracks of playlist '{}'", playlist.title);
        let tracks = client
            .playlist_tracks(&params.playlist_id, params.limit)
            .await
            .map_err(ToolError::upstream("Failed to get playlist tracks"))?;

        Ok(PlaylistTracks::success(
            params.playlist_id.clone(),
            playlist.title,
            tracks.into_iter().map(Track::from).collect(),
        ))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<GetPlaylistTracksParams>().into(),
            annotations: Some(ToolAnnotations {
                title: Some("Get playlist tracks".to_string()),
                read_only_hint: Some(true),
                destructive_hint: Some(false),
                idempotent_hint: Some(true),
                open_world_hint: Some(true),
            }),
            output_schema: Some(schema_for_type::<PlaylistTracks>().into()),
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
                let params: GetPlaylistTracksParams = parse_params(arguments)?;
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
