//! User playlists tool definition.

use futures::FutureExt;
use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRoute, schema_for_type},
    model::{Tool, ToolAnnotations},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::domains::tidal::SessionManager;
use crate::domains::tools::ToolError;
use crate::domains::tools::definitions::common::{
    authenticated_client, into_call_result, parse_params,
};
use crate::domains::tools::definitions::schemas::{Playlist, PlaylistList};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the user playlists tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetUserPlaylistsParams {
    /// Maximum number of playlists to return (default: 20, 0 returns all).
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    20
}

// ============================================================================
// Tool Definition
// ============================================================================

/// User playlists tool - lists the playlists the user owns.
pub struct GetUserPlaylistsTool;

impl GetUserPlaylistsTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "get_user_playlists";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Get the user's playlists from TIDAL with ID, name, description, and track count.";

    /// The service has no server-side limit here, so every page is fetched
    /// and the list is truncated locally.
    #[instrument(skip_all, fields(limit = params.limit))]
    pub async fn execute(
        params: &GetUserPlaylistsParams,
        session: &SessionManager,
    ) -> Result<PlaylistList, ToolError> {
        let client = authenticated_client(session).await?;

        let mut playlists = client
            .user_playlists()
            .await
            .map_err(ToolError::upstream("Failed to get playlists"))?;
        debug!("User has {} playlists", playlists.len());

        if params.limit > 0 {
            playlists.truncate(params.limit);
        }

        Ok(PlaylistList::success(
            playlists.into_iter().map(Playlist::from).collect(),
        ))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<GetUserPlaylistsParams>().into(),
            annotations: Some(ToolAnnotations {
                title: Some("List user playlists".to_string()),
                read_only_hint: Some(true),
                destructive_hint: Some(false),
                idempotent_hint: Some(true),
                open_world_hint: Some(true),
            }),
            output_schema: Some(schema_for_type::<PlaylistList>().into()),
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
                let params: GetUserPlaylistsParams = parse_params(arguments)?;
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
