//! Tool Router - builds the rmcp ToolRouter.
//!
//! Each tool knows how to create its own route; they all share one
//! `SessionManager`.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;

use crate::domains::tidal::SessionManager;

use super::definitions::{
    AddTracksToPlaylistTool, CreatePlaylistTool, GetFavoritesTool, GetPlaylistTracksTool,
    GetUserPlaylistsTool, LoginTool, SearchTracksTool,
};

/// Names of every registered tool.
pub const TOOL_NAMES: &[&str] = &[
    LoginTool::NAME,
    SearchTracksTool::NAME,
    GetFavoritesTool::NAME,
    CreatePlaylistTool::NAME,
    AddTracksToPlaylistTool::NAME,
    GetUserPlaylistsTool::NAME,
    GetPlaylistTracksTool::NAME,
];

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(session: Arc<SessionManager>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    ToolRouter::new()
        .with_route(LoginTool::create_route(session.clone()))
        .with_route(SearchTracksTool::create_route(session.clone()))
        .with_route(GetFavoritesTool::create_route(session.clone()))
        .with_route(CreatePlaylistTool::create_route(session.clone()))
        .with_route(AddTracksToPlaylistTool::create_route(session.clone()))
        .with_route(GetUserPlaylistsTool::create_route(session.clone()))
        .with_route(GetPlaylistTracksTool::create_route(session))
}
