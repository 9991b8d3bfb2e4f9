//! TIDAL wire models and the persisted session record.
//!
//! Field names follow the TIDAL v1 JSON (camelCase for the REST API,
//! snake_case for the OAuth endpoints).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Artist reference embedded in a track.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TidalArtist {
    pub id: u64,
    pub name: String,
}

/// Album reference embedded in a track.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TidalAlbum {
    pub id: u64,
    pub title: String,
}

/// A catalog track.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TidalTrack {
    pub id: u64,
    pub title: String,
    /// Length in seconds.
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub artist: Option<TidalArtist>,
    #[serde(default)]
    pub artists: Vec<TidalArtist>,
    #[serde(default)]
    pub album: Option<TidalAlbum>,
}

impl TidalTrack {
    /// Main artist, falling back to the first credited artist.
    pub fn main_artist(&self) -> Option<&TidalArtist> {
        self.artist.as_ref().or_else(|| self.artists.first())
    }
}

/// A user or editorial playlist.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TidalPlaylist {
    pub uuid: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub number_of_tracks: Option<u32>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total_number_of_items: Option<u32>,
}

/// Favorites wrap each item with the date it was added.
#[derive(Debug, Clone, Deserialize)]
pub struct FavoriteItem<T> {
    pub item: T,
}

/// `GET search` response; only tracks are requested.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub tracks: Option<Page<TidalTrack>>,
}

/// Body returned when tracks are appended to a playlist.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemsResponse {
    #[serde(default)]
    pub added_item_ids: Option<Vec<u64>>,
}

/// Outcome of appending tracks to a playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddedTracks {
    /// The service accepted the request.
    pub success: bool,
    /// Tracks actually appended (duplicates may be skipped).
    pub added: usize,
}

/// `GET sessions` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    #[serde(default)]
    pub session_id: Option<String>,
    pub user_id: u64,
    pub country_code: String,
}

/// Error body of the REST API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    #[serde(default)]
    pub user_message: Option<String>,
}

/// Device authorization started by `login`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceLogin {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    pub verification_uri_complete: String,
    /// Seconds until the device code expires.
    pub expires_in: u64,
    /// Minimum seconds between token polls.
    pub interval: u64,
}

/// User attached to a token response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUser {
    pub user_id: u64,
    #[serde(default)]
    pub country_code: Option<String>,
}

/// Successful token grant.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expires_in: i64,
    #[serde(default)]
    pub user: Option<TokenUser>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Failed token grant.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthErrorBody {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Credentials persisted to the session file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredentials {
    pub token_type: String,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub country_code: Option<String>,
}

impl SessionCredentials {
    /// Build credentials from a token grant received at `now`.
    ///
    /// A refresh grant usually omits the refresh token and user; those are
    /// carried over from `previous`.
    pub fn from_grant(
        grant: TokenResponse,
        previous: Option<&SessionCredentials>,
        now: DateTime<Utc>,
    ) -> Self {
        let user_id = grant
            .user
            .as_ref()
            .map(|u| u.user_id)
            .or_else(|| previous.and_then(|p| p.user_id));
        let country_code = grant
            .user
            .as_ref()
            .and_then(|u| u.country_code.clone())
            .or_else(|| previous.and_then(|p| p.country_code.clone()));

        Self {
            token_type: grant.token_type,
            access_token: grant.access_token,
            refresh_token: grant
                .refresh_token
                .or_else(|| previous.and_then(|p| p.refresh_token.clone())),
            expires_at: now + Duration::seconds(grant.expires_in),
            user_id,
            country_code,
        }
    }

    /// Whether the access token is expired, or will be within `margin`.
    pub fn is_expired(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        self.expires_at <= now + margin
    }
}
