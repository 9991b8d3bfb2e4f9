//! Favorite tracks tool definition.

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
use crate::domains::tools::definitions::schemas::{Track, TrackList};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the favorites tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetFavoritesParams {
    /// Maximum number of tracks to retrieve (default: 20).
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    20
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Favorites tool - lists the user's favorite tracks.
pub struct GetFavoritesTool;

impl GetFavoritesTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "get_favorites";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Get the user's favorite tracks from TIDAL.";

    #[instrument(skip_all, fields(limit = params.limit))]
    pub async fn execute(
        params: &GetFavoritesParams,
        session: &SessionManager,
    ) -> Result<TrackList, ToolError> {
        let client = authenticated_client(session).await?;
        info!("Fetching up to {} favorite tracks", params.limit);

        let tracks = client
            .favorite_tracks(params.limit)
            .await
            .map_err(ToolError::upstream("Failed to get favorites"))?;

        Ok(TrackList::success(
            None,
            tracks.into_iter().map(Track::from).collect(),
        ))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<GetFavoritesParams>().into(),
            annotations: Some(ToolAnnotations {
                title: Some("Get favorite tracks".to_string()),
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
                let params: GetFavoritesParams = parse_params(arguments)?;
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
