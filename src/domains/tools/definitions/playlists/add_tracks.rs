//! Add tracks to playlist tool definition.

use futures::FutureExt;
use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRoute, schema_for_type},
    model::{Tool, ToolAnnotations},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::domains::tidal::SessionManager;
use crate::domains::tools::ToolError;
use crate::domains::tools::definitions::common::{
    authenticated_client, into_call_result, parse_params, parse_track_ids,
};
use crate::domains::tools::definitions::schemas::{AddTracksResult, Status, playlist_url};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the add tracks tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddTracksToPlaylistParams {
    /// ID of the playlist to add tracks to.
    pub playlist_id: String,

    /// Track IDs to add (from search results).
    pub track_ids: Vec<String>,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Add tracks tool - appends catalog tracks to one of the user's playlists.
pub struct AddTracksToPlaylistTool;

impl AddTracksToPlaylistTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "add_tracks_to_playlist";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Add tracks to an existing playlist. Track IDs come from 'search_tracks' or other track listings. Tracks already in the playlist are skipped.";

    /// Resolve the playlist, validate every id, then add them in one call.
    #[instrument(skip_all, fields(playlist_id = %params.playlist_id, tracks = params.track_ids.len()))]
    pub async fn execute(
        params: &AddTracksToPlaylistParams,
        session: &SessionManager,
    ) -> Result<AddTracksResult, ToolError> {
        let client = authenticated_client(session).await?;

        let playlist = client
            .playlist(&params.playlist_id)
            .await
            .map_err(ToolError::upstream("Failed to add tracks"))?
            .ok_or_else(|| ToolError::playlist_not_found(&params.playlist_id))?;

        let track_ids = parse_track_ids(&params.track_ids)?;
        if track_ids.is_empty() {
            return Ok(AddTracksResult {
                status: Status::Success,
                playlist_id: params.playlist_id.clone(),
                playlist_name: playlist.title,
                tracks_added: 0,
                playlist_url: playlist_url(&params.playlist_id),
                message: "No tracks to add".to_string(),
            });
        }

        info!(
            "Adding {} tracks to playlist '{}'",
            track_ids.len(),
            playlist.title
        );
        let added = client
            .add_tracks(&params.playlist_id, &track_ids)
            .await
            .map_err(ToolError::upstream("Failed to add tracks"))?;

        if !added.success {
            warn!("TIDAL rejected the tracks for playlist '{}'", playlist.title);
            return Err(ToolError::execution_failed(
                "Failed to add tracks to playlist",
            ));
        }

        Ok(AddTracksResult {
            status: Status::Success,
            message: format!(
                "Added {} tracks to playlist '{}'",
                added.added, playlist.title
            ),
            playlist_id: params.playlist_id.clone(),
            playlist_name: playlist.title,
            tracks_added: added.added,
            playlist_url: playlist_url(&params.playlist_id),
        })
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<AddTracksToPlaylistParams>().into(),
            annotations: Some(ToolAnnotations {
                title: Some("Add tracks to playlist".to_string()),
                read_only_hint: Some(false),
                destructive_hint: Some(false),
                idempotent_hint: Some(false),
                open_world_hint: Some(true),
            }),
            output_schema: Some(schema_for_type::<AddTracksResult>().into()),
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
                let params: AddTracksToPlaylistParams = parse_params(arguments)?;
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
