//! Playlist management tools.
//!
//! - `create`: create an empty playlist
//! - `add_tracks`: append catalog tracks to a playlist
//! - `user_playlists`: list the user's playlists
//! - `playlist_tracks`: list the tracks of one playlist

pub mod add_tracks;
pub mod create;
pub mod playlist_tracks;
pub mod user_playlists;

pub use add_tracks::{AddTracksToPlaylistParams, AddTracksToPlaylistTool};
pub use create::{CreatePlaylistParams, CreatePlaylistTool};
pub use playlist_tracks::{GetPlaylistTracksParams, GetPlaylistTracksTool};
pub use user_playlists::{GetUserPlaylistsParams, GetUserPlaylistsTool};
