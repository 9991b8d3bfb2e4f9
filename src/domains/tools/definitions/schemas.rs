//! Output records shared by all tools.
//!
//! Every success record carries `status: "success"`; list records compute
//! `count` from the sequence they hold, so the two never disagree.

use schemars::JsonSchema;
use serde::Serialize;

use crate::domains::tidal::models::{TidalPlaylist, TidalTrack};

const TRACK_URL: &str = "https://tidal.com/browse/track";
const PLAYLIST_URL: &str = "https://tidal.com/browse/playlist";

/// Outcome marker on every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// A TIDAL track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Track {
    /// Catalog id; pass it to `add_tracks_to_playlist`.
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration_seconds: u64,
    /// TIDAL web URL for the track.
    pub url: String,
}

impl From<TidalTrack> for Track {
    fn from(track: TidalTrack) -> Self {
        let artist = track
            .main_artist()
            .map(|artist| artist.name.clone())
            .unwrap_or_else(|| "Unknown Artist".to_string());
        let album = track
            .album
            .map(|album| album.title)
            .unwrap_or_else(|| "Unknown Album".to_string());

        Self {
            id: track.id.to_string(),
            url: track_url(track.id),
            title: track.title,
            artist,
            album,
            duration_seconds: track.duration,
        }
    }
}

/// A TIDAL playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    /// Empty when the playlist has none.
    pub description: String,
    pub track_count: u32,
    /// TIDAL web URL for the playlist.
    pub url: String,
}

impl From<TidalPlaylist> for Playlist {
    fn from(playlist: TidalPlaylist) -> Self {
        Self {
            url: playlist_url(&playlist.uuid),
            id: playlist.uuid,
            name: playlist.title,
            description: playlist.description.unwrap_or_default(),
            track_count: playlist.number_of_tracks.unwrap_or(0),
        }
    }
}

/// Tracks from a search or the user's favorites.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct TrackList {
    pub status: Status,
    /// Search query used (search results only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub count: usize,
    pub tracks: Vec<Track>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TrackList {
    pub fn success(query: Option<String>, tracks: Vec<Track>) -> Self {
        Self {
            status: Status::Success,
            query,
            count: tracks.len(),
            tracks,
            message: None,
        }
    }
}

/// The user's playlists.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct PlaylistList {
    pub status: Status,
    pub count: usize,
    pub playlists: Vec<Playlist>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PlaylistList {
    pub fn success(playlists: Vec<Playlist>) -> Self {
        Self {
            status: Status::Success,
            count: playlists.len(),
            playlists,
            message: None,
        }
    }
}

/// Tracks of one playlist.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct PlaylistTracks {
    pub status: Status,
    pub playlist_name: String,
    pub playlist_id: String,
    pub count: usize,
    pub tracks: Vec<Track>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PlaylistTracks {
    pub fn success(playlist_id: String, playlist_name: String, tracks: Vec<Track>) -> Self {
        Self {
            status: Status::Success,
            playlist_name,
            playlist_id,
            count: tracks.len(),
            tracks,
            message: None,
        }
    }
}

/// Result of `create_playlist`.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CreatePlaylistResult {
    pub status: Status,
    pub playlist: Option<Playlist>,
    pub message: String,
}

/// Result of `add_tracks_to_playlist`.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct AddTracksResult {
    pub status: Status,
    pub playlist_id: String,
    pub playlist_name: String,
    pub tracks_added: usize,
    pub playlist_url: String,
    pub message: String,
}

/// Result of `login`.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct AuthResult {
    pub status: Status,
    pub message: String,
    pub authenticated: bool,
}

/// Structured body of every failed tool call.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ErrorResult {
    /// Always `"error"`.
    pub status: Status,
    pub message: String,
}

impl ErrorResult {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
        }
    }
}

pub fn track_url(id: u64) -> String {
    format!("{}/{}", TRACK_URL, id)
}

pub fn playlist_url(id: &str) -> String {
    format!("{}/{}", PLAYLIST_URL, id)
}
