//! In-memory [`StreamingClient`] for tests.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use super::client::StreamingClient;
use super::error::TidalError;
use super::models::{
    AddedTracks, DeviceLogin, SessionCredentials, TidalAlbum, TidalArtist, TidalPlaylist,
    TidalTrack,
};
use super::session::SessionManager;
use crate::core::config::TidalConfig;

const FAKE_ACCESS_TOKEN: &str = "fake-access-token";

/// Calls that change state on the service side.
pub const MUTATIONS: &[&str] = &["create_playlist", "add_tracks"];

#[derive(Default)]
struct State {
    credentials: Option<SessionCredentials>,
    calls: Vec<&'static str>,
    last_add: Option<(String, Vec<u64>)>,
    refreshes: usize,
}

/// Scriptable fake of the TIDAL service.
pub struct FakeClient {
    state: Mutex<State>,
    reject_sessions: bool,
    refresh_on_check: bool,
    pending_login: bool,
    failure: Option<String>,
    tracks: Vec<TidalTrack>,
    playlists: Vec<TidalPlaylist>,
    add_result: Option<AddedTracks>,
    add_rejection: Option<(u16, String)>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            reject_sessions: false,
            refresh_on_check: false,
            pending_login: false,
            failure: None,
            tracks: Vec::new(),
            playlists: Vec::new(),
            add_result: None,
            add_rejection: None,
        }
    }

    /// Start with a valid session already in memory.
    pub fn logged_in() -> Self {
        let client = Self::new();
        client.state.lock().unwrap().credentials = Some(fake_credentials());
        client
    }

    /// Start with a session whose access token has expired.
    pub fn with_expired_session(self) -> Self {
        let mut credentials = fake_credentials();
        credentials.expires_at = Utc::now() - Duration::hours(1);
        self.state.lock().unwrap().credentials = Some(credentials);
        self
    }

    /// Every successful session check refreshes the tokens.
    pub fn with_refresh_on_check(mut self) -> Self {
        self.refresh_on_check = true;
        self
    }

    /// The service rejects every session as expired or revoked.
    pub fn with_rejected_sessions(mut self) -> Self {
        self.reject_sessions = true;
        self
    }

    /// The user never approves the device login.
    pub fn with_pending_login(mut self) -> Self {
        self.pending_login = true;
        self
    }

    /// Every catalog call fails with `message`.
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn with_tracks(mut self, tracks: Vec<TidalTrack>) -> Self {
        self.tracks = tracks;
        self
    }

    pub fn with_playlists(mut self, playlists: Vec<TidalPlaylist>) -> Self {
        self.playlists = playlists;
        self
    }

    pub fn with_add_result(mut self, result: AddedTracks) -> Self {
        self.add_result = Some(result);
        self
    }

    /// The service refuses `add_tracks` with `status` and `message`.
    pub fn with_rejected_add(mut self, status: u16, message: &str) -> Self {
        self.add_rejection = Some((status, message.to_string()));
        self
    }

    /// How many times `name` was called.
    pub fn calls_to(&self, name: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|call| **call == name)
            .count()
    }

    /// Whether any state-changing call was made.
    pub fn mutated(&self) -> bool {
        MUTATIONS.iter().any(|name| self.calls_to(name) > 0)
    }

    /// How many token refreshes happened.
    pub fn refreshes(&self) -> usize {
        self.state.lock().unwrap().refreshes
    }

    /// Arguments of the most recent `add_tracks` call.
    pub fn last_add(&self) -> Option<(String, Vec<u64>)> {
        self.state.lock().unwrap().last_add.clone()
    }

    fn record(&self, call: &'static str) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn check_failure(&self) -> Result<(), TidalError> {
        match &self.failure {
            Some(message) => Err(TidalError::api(500, message.clone())),
            None => Ok(()),
        }
    }
}

fn fake_credentials() -> SessionCredentials {
    SessionCredentials {
        token_type: "Bearer".to_string(),
        access_token: FAKE_ACCESS_TOKEN.to_string(),
        refresh_token: Some("fake-refresh-token".to_string()),
        expires_at: Utc::now() + Duration::hours(1),
        user_id: Some(1234),
        country_code: Some("US".to_string()),
    }
}

/// A session manager over `client` that never opens a browser.
pub fn session_manager(client: Arc<FakeClient>, session_file: PathBuf) -> SessionManager {
    let config = TidalConfig {
        session_file,
        login_timeout_secs: 5,
        open_browser: false,
        ..TidalConfig::default()
    };
    SessionManager::new(client, &config)
}

/// A catalog track with the given id and title.
pub fn track(id: u64, title: &str) -> TidalTrack {
    TidalTrack {
        id,
        title: title.to_string(),
        duration: 200 + id % 60,
        artist: Some(TidalArtist {
            id: 10,
            name: "Radiohead".to_string(),
        }),
        artists: Vec::new(),
        album: Some(TidalAlbum {
            id: 20,
            title: "OK Computer".to_string(),
        }),
    }
}

/// A user playlist with the given id and title.
pub fn playlist(uuid: &str, title: &str, tracks: Option<u32>) -> TidalPlaylist {
    TidalPlaylist {
        uuid: uuid.to_string(),
        title: title.to_string(),
        description: None,
        number_of_tracks: tracks,
    }
}

#[async_trait]
impl StreamingClient for FakeClient {
    async fn has_session(&self) -> bool {
        self.state.lock().unwrap().credentials.is_some()
    }

    async fn restore_session(&self, credentials: SessionCredentials) {
        self.state.lock().unwrap().credentials = Some(credentials);
    }

    async fn export_session(&self) -> Option<SessionCredentials> {
        self.state.lock().unwrap().credentials.clone()
    }

    async fn check_login(&self) -> Result<bool, TidalError> {
        self.record("check_login");
        let mut state = self.state.lock().unwrap();
        let valid = !self.reject_sessions
            && state.credentials.as_ref().is_some_and(|creds| {
                creds.access_token == FAKE_ACCESS_TOKEN && creds.expires_at > Utc::now()
            });

        if valid && self.refresh_on_check {
            state.refreshes += 1;
            let refreshed = format!("fake-refresh-token-{}", state.refreshes);
            if let Some(creds) = state.credentials.as_mut() {
                creds.refresh_token = Some(refreshed);
                creds.expires_at = Utc::now() + Duration::hours(2);
            }
        }
        Ok(valid)
    }

    async fn start_device_login(&self) -> Result<DeviceLogin, TidalError> {
        self.record("start_device_login");
        Ok(DeviceLogin {
            device_code: "fake-device-code".to_string(),
            user_code: "FAKE1".to_string(),
            verification_uri: "link.tidal.com".to_string(),
            verification_uri_complete: "link.tidal.com/FAKE1".to_string(),
            expires_in: 300,
            interval: 1,
        })
    }

    async fn complete_device_login(&self, _login: &DeviceLogin) -> Result<(), TidalError> {
        self.record("complete_device_login");
        if self.pending_login {
            std::future::pending::<()>().await;
        }
        self.state.lock().unwrap().credentials = Some(fake_credentials());
        Ok(())
    }

    async fn search_tracks(&self, _query: &str, limit: u32) -> Result<Vec<TidalTrack>, TidalError> {
        self.record("search_tracks");
        self.check_failure()?;
        Ok(self.tracks.iter().take(limit as usize).cloned().collect())
    }

    async fn favorite_tracks(&self, limit: u32) -> Result<Vec<TidalTrack>, TidalError> {
        self.record("favorite_tracks");
        self.check_failure()?;
        Ok(self.tracks.iter().take(limit as usize).cloned().collect())
    }

    async fn create_playlist(
        &self,
        title: &str,
        description: &str,
    ) -> Result<TidalPlaylist, TidalError> {
        self.record("create_playlist");
        self.check_failure()?;
        Ok(TidalPlaylist {
            uuid: "created-playlist-uuid".to_string(),
            title: title.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            number_of_tracks: Some(0),
        })
    }

    async fn playlist(&self, playlist_id: &str) -> Result<Option<TidalPlaylist>, TidalError> {
        self.record("playlist");
        self.check_failure()?;
        Ok(self
            .playlists
            .iter()
            .find(|playlist| playlist.uuid == playlist_id)
            .cloned())
    }

    async fn add_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[u64],
    ) -> Result<AddedTracks, TidalError> {
        self.record("add_tracks");
        self.state.lock().unwrap().last_add = Some((playlist_id.to_string(), track_ids.to_vec()));
        self.check_failure()?;
        if let Some((status, message)) = &self.add_rejection {
            return Err(TidalError::api(*status, message.clone()));
        }
        Ok(self.add_result.unwrap_or(AddedTracks {
            success: true,
            added: track_ids.len(),
        }))
    }

    async fn user_playlists(&self) -> Result<Vec<TidalPlaylist>, TidalError> {
        self.record("user_playlists");
        self.check_failure()?;
        Ok(self.playlists.clone())
    }

    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        limit: u32,
    ) -> Result<Vec<TidalTrack>, TidalError> {
        self.record("playlist_tracks");
        self.check_failure()?;
        if !self.playlists.iter().any(|playlist| playlist.uuid == playlist_id) {
            return Err(TidalError::api(404, "Playlist not found"));
        }
        Ok(self.tracks.iter().take(limit as usize).cloned().collect())
    }
}
