//! Tool definitions module.
//!
//! Each tool is defined in its own file; `schemas` holds the output records
//! they share and `common` the result boundary.

pub mod auth;
pub mod catalog;
pub mod common;
pub mod playlists;
pub mod schemas;

pub use auth::LoginTool;
pub use catalog::{GetFavoritesTool, SearchTracksTool};
pub use playlists::{
    AddTracksToPlaylistTool, CreatePlaylistTool, GetPlaylistTracksTool, GetUserPlaylistsTool,
};
