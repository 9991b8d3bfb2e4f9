//! Create playlist tool definition.

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
use crate::domains::tools::definitions::schemas::{CreatePlaylistResult, Playlist, Status};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the create playlist tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreatePlaylistParams {
    /// Name of the playlist.
    pub name: String,

    /// Optional description for the playlist.
    #[serde(default)]
    pub description: String,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Create playlist tool - adds an empty playlist to the user's account.
pub struct CreatePlaylistTool;

impl CreatePlaylistTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "create_playlist";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Create a new playlist in your TIDAL account. Returns the created playlist including its ID and URL.";

    /// Create the playlist. A new playlist always reports zero tracks.
    #[instrument(skip_all, fields(name = %params.name))]
    pub async fn execute(
        params: &CreatePlaylistParams,
        session: &SessionManager,
    ) -> Result<CreatePlaylistResult, ToolError> {
        let client = authenticated_client(session).await?;
        info!("Creating playlist '{}'", params.name);

        let created = client
            .create_playlist(&params.name, &params.description)
            .await
            .map_err(ToolError::upstream("Failed to create playlist"))?;

        let playlist = Playlist {
            track_count: 0,
            ..Playlist::from(created)
        };

        Ok(CreatePlaylistResult {
            status: Status::Success,
            playlist: Some(playlist),
            message: format!("Created playlist '{}'", params.name),
        })
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<CreatePlaylistParams>().into(),
            annotations: Some(ToolAnnotations {
                title: Some("Create playlist".to_string()),
                read_only_hint: Some(false),
                destructive_hint: Some(false),
                idempotent_hint: Some(false),
                open_world_hint: Some(true),
            }),
            output_schema: Some(schema_for_type::<CreatePlaylistResult>().into()),
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
                let params: CreatePlaylistParams = parse_params(arguments)?;
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
