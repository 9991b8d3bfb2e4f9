//! Streaming-service client.
//!
//! [`StreamingClient`] is the seam between the tools and the music service:
//! handlers and the session manager only talk to this trait, so tests can
//! substitute an in-memory implementation. [`TidalClient`] implements it
//! against the TIDAL v1 REST API and OAuth device flow.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{AUTHORIZATION, ETAG, IF_NONE_MATCH};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::error::TidalError;
use super::models::{
    AddItemsResponse, AddedTracks, ApiErrorBody, DeviceLogin, FavoriteItem, OAuthErrorBody, Page,
    SearchResponse, SessionCredentials, SessionInfo, TidalPlaylist, TidalTrack, TokenResponse,
};
use crate::core::config::TidalConfig;

/// OAuth scope requested for the device login.
const SCOPE: &str = "r_usr w_usr w_sub";

const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Refresh the access token this long before it actually expires.
const REFRESH_MARGIN_SECS: i64 = 60;

const PLAYLIST_PAGE_SIZE: usize = 50;
const TRACK_PAGE_SIZE: usize = 100;

/// Floor for the device-code poll interval.
const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Added to the poll interval when the token endpoint answers `slow_down`.
const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);

/// Operations the tools need from the streaming service.
#[async_trait]
pub trait StreamingClient: Send + Sync {
    /// Whether credentials are currently loaded in memory.
    async fn has_session(&self) -> bool;

    /// Replace the in-memory credentials.
    async fn restore_session(&self, credentials: SessionCredentials);

    /// Snapshot of the in-memory credentials, for persisting.
    async fn export_session(&self) -> Option<SessionCredentials>;

    /// Whether the loaded credentials are a valid, non-expired login.
    async fn check_login(&self) -> Result<bool, TidalError>;

    /// Start an OAuth device authorization.
    async fn start_device_login(&self) -> Result<DeviceLogin, TidalError>;

    /// Wait until the user approves `login`, then install the new tokens.
    async fn complete_device_login(&self, login: &DeviceLogin) -> Result<(), TidalError>;

    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<TidalTrack>, TidalError>;

    async fn favorite_tracks(&self, limit: u32) -> Result<Vec<TidalTrack>, TidalError>;

    async fn create_playlist(
        &self,
        title: &str,
        description: &str,
    ) -> Result<TidalPlaylist, TidalError>;

    /// Look up a playlist; `None` when the id does not resolve.
    async fn playlist(&self, playlist_id: &str) -> Result<Option<TidalPlaylist>, TidalError>;

    async fn add_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[u64],
    ) -> Result<AddedTracks, TidalError>;

    /// Every playlist owned by the logged-in user.
    async fn user_playlists(&self) -> Result<Vec<TidalPlaylist>, TidalError>;

    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        limit: u32,
    ) -> Result<Vec<TidalTrack>, TidalError>;
}

/// TIDAL v1 REST client.
pub struct TidalClient {
    http: reqwest::Client,
    api_url: String,
    auth_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    credentials: RwLock<Option<SessionCredentials>>,
    min_poll_interval: Duration,
    slow_down_step: Duration,
}

impl TidalClient {
    /// Build a client from configuration. No request is made.
    pub fn new(config: &TidalConfig) -> Result<Self, TidalError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("tidal-mcp-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            auth_url: config.auth_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            credentials: RwLock::new(None),
            min_poll_interval: MIN_POLL_INTERVAL,
            slow_down_step: SLOW_DOWN_STEP,
        })
    }

    fn client_credentials(&self) -> Result<(&str, &str), TidalError> {
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => Ok((id.as_str(), secret.as_str())),
            _ => Err(TidalError::MissingClientCredentials),
        }
    }

    /// REST endpoint built from path segments; each segment is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TidalError> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| TidalError::InvalidUrl(format!("{}: {}", self.api_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| TidalError::InvalidUrl(self.api_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn token_url(&self) -> String {
        format!("{}/token", self.auth_url)
    }

    /// Current credentials, refreshed first if the access token is (nearly) expired.
    async fn credentials(&self) -> Result<SessionCredentials, TidalError> {
        let current = self
            .credentials
            .read()
            .await
            .clone()
            .ok_or(TidalError::NotAuthenticated)?;

        if !current.is_expired(Utc::now(), chrono::Duration::seconds(REFRESH_MARGIN_SECS)) {
            return Ok(current);
        }

        let Some(refresh_token) = current.refresh_token.clone() else {
            debug!("Access token expired and no refresh token is available");
            return Err(TidalError::NotAuthenticated);
        };

        debug!("Access token expired, refreshing");
        let refreshed = self.refresh(&refresh_token, &current).await?;
        *self.credentials.write().await = Some(refreshed.clone());
        Ok(refreshed)
    }

    async fn refresh(
        &self,
        refresh_token: &str,
        current: &SessionCredentials,
    ) -> Result<SessionCredentials, TidalError> {
        let (client_id, client_secret) = self.client_credentials()?;

        let response = self
            .http
            .post(self.token_url())
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("scope", SCOPE),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let err = oauth_error(response).await;
            warn!("Token refresh rejected: {}", err);
            return Err(TidalError::NotAuthenticated);
        }

        let grant: TokenResponse = response.json().await?;
        info!("TIDAL access token refreshed");
        Ok(SessionCredentials::from_grant(grant, Some(current), Utc::now()))
    }

    /// Authorized request with the session's country code attached.
    fn request(&self, creds: &SessionCredentials, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url).header(
            AUTHORIZATION,
            format!("{} {}", creds.token_type, creds.access_token),
        );
        match &creds.country_code {
            Some(country) => builder.query(&[("countryCode", country)]),
            None => builder,
        }
    }

    async fn execute(builder: RequestBuilder) -> Result<Response, TidalError> {
        let response = builder.send().await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(api_error(response).await)
        }
    }

    async fn json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, TidalError> {
        Ok(Self::execute(builder).await?.json().await?)
    }

    /// Fetch `limit`/`offset` pages from `url` until `max` items are collected
    /// or the listing is exhausted.
    async fn collect_pages<T: DeserializeOwned>(
        &self,
        creds: &SessionCredentials,
        url: Url,
        extra_query: &[(&str, &str)],
        page_size: usize,
        max: Option<usize>,
    ) -> Result<Vec<T>, TidalError> {
        let mut items: Vec<T> = Vec::new();

        loop {
            let want = match max {
                Some(max) => page_size.min(max.saturating_sub(items.len())),
                None => page_size,
            };
            if want == 0 {
                break;
            }

            let page: Page<T> = Self::json(
                self.request(creds, Method::GET, url.clone())
                    .query(extra_query)
                    .query(&[("limit", want), ("offset", items.len())]),
            )
            .await?;

            let fetched = page.items.len();
            items.extend(page.items);

            let exhausted = page
                .total_number_of_items
                .is_some_and(|total| items.len() >= total as usize);
            if fetched < want || exhausted {
                break;
            }
        }

        Ok(items)
    }
}

fn user_id(creds: &SessionCredentials) -> Result<String, TidalError> {
    creds
        .user_id
        .map(|id| id.to_string())
        .ok_or(TidalError::NotAuthenticated)
}

async fn api_error(response: Response) -> TidalError {
    let status = response.status();
    let message = match response.json::<ApiErrorBody>().await {
        Ok(ApiErrorBody {
            user_message: Some(message),
        }) => message,
        _ => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };
    TidalError::api(status.as_u16(), message)
}

async fn oauth_error(response: Response) -> TidalError {
    let status = response.status();
    match response.json::<OAuthErrorBody>().await {
        Ok(body) => TidalError::OAuth {
            description: body
                .error_description
                .unwrap_or_else(|| body.error.clone()),
            code: body.error,
        },
        Err(_) => TidalError::api(
            status.as_u16(),
            status.canonical_reason().unwrap_or("unknown error"),
        ),
    }
}

#[async_trait]
impl StreamingClient for TidalClient {
    async fn has_session(&self) -> bool {
        self.credentials.read().await.is_some()
    }

    async fn restore_session(&self, credentials: SessionCredentials) {
        *self.credentials.write().await = Some(credentials);
    }

    async fn export_session(&self) -> Option<SessionCredentials> {
        self.credentials.read().await.clone()
    }

    async fn check_login(&self) -> Result<bool, TidalError> {
        let creds = match self.credentials().await {
            Ok(creds) => creds,
            Err(TidalError::NotAuthenticated) => return Ok(false),
            Err(e) => return Err(e),
        };

        let response = self
            .request(&creds, Method::GET, self.endpoint(&["sessions"])?)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(false);
        }
        if !status.is_success() {
            return Err(api_error(response).await);
        }

        let info: SessionInfo = response.json().await?;
        debug!(session_id = ?info.session_id, "TIDAL session is valid");
        if let Some(stored) = self.credentials.write().await.as_mut() {
            stored.user_id = Some(info.user_id);
            stored.country_code = Some(info.country_code);
        }
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn start_device_login(&self) -> Result<DeviceLogin, TidalError> {
        let (client_id, _) = self.client_credentials()?;

        let response = self
            .http
            .post(format!("{}/device_authorization", self.auth_url))
            .form(&[("client_id", client_id), ("scope", SCOPE)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(oauth_error(response).await);
        }
        Ok(response.json().await?)
    }

    #[instrument(skip_all, fields(user_code = %login.user_code))]
    async fn complete_device_login(&self, login: &DeviceLogin) -> Result<(), TidalError> {
        let (client_id, client_secret) = self.client_credentials()?;
        let deadline = Instant::now() + Duration::from_secs(login.expires_in);
        let mut interval = Duration::from_secs(login.interval).max(self.min_poll_interval);

        loop {
            tokio::time::sleep(interval).await;
            if Instant::now() >= deadline {
                return Err(TidalError::DeviceCodeExpired);
            }

            let response = self
                .http
                .post(self.token_url())
                .form(&[
                    ("client_id", client_id),
                    ("client_secret", client_secret),
                    ("device_code", login.device_code.as_str()),
                    ("grant_type", DEVICE_CODE_GRANT),
                    ("scope", SCOPE),
                ])
                .send()
                .await?;

            if response.status().is_success() {
                let grant: TokenResponse = response.json().await?;
                let creds = SessionCredentials::from_grant(grant, None, Utc::now());
                *self.credentials.write().await = Some(creds);
                info!("TIDAL device login approved");
                return Ok(());
            }

            match oauth_error(response).await {
                TidalError::OAuth { code, .. } if code == "authorization_pending" => {
                    debug!("Waiting for the user to approve the login");
                }
                TidalError::OAuth { code, .. } if code == "slow_down" => {
                    interval += self.slow_down_step;
                }
                TidalError::OAuth { code, .. } if code == "expired_token" => {
                    return Err(TidalError::DeviceCodeExpired);
                }
                other => return Err(other),
            }
        }
    }

    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<TidalTrack>, TidalError> {
        let creds = self.credentials().await?;
        let limit = limit.to_string();

        let response: SearchResponse = Self::json(
            self.request(&creds, Method::GET, self.endpoint(&["search"])?)
                .query(&[
                    ("query", query),
                    ("limit", limit.as_str()),
                    ("offset", "0"),
                    ("types", "TRACKS"),
                ]),
        )
        .await?;

        Ok(response.tracks.map(|page| page.items).unwrap_or_default())
    }

    async fn favorite_tracks(&self, limit: u32) -> Result<Vec<TidalTrack>, TidalError> {
        let creds = self.credentials().await?;
        let user = user_id(&creds)?;
        let url = self.endpoint(&["users", &user, "favorites", "tracks"])?;

        let favorites: Vec<FavoriteItem<TidalTrack>> = self
            .collect_pages(&creds, url, &[], TRACK_PAGE_SIZE, Some(limit as usize))
            .await?;

        Ok(favorites.into_iter().map(|favorite| favorite.item).collect())
    }

    async fn create_playlist(
        &self,
        title: &str,
        description: &str,
    ) -> Result<TidalPlaylist, TidalError> {
        let creds = self.credentials().await?;
        let user = user_id(&creds)?;

        Self::json(
            self.request(
                &creds,
                Method::POST,
                self.endpoint(&["users", &user, "playlists"])?,
            )
            .form(&[("title", title), ("description", description)]),
        )
        .await
    }

    async fn playlist(&self, playlist_id: &str) -> Result<Option<TidalPlaylist>, TidalError> {
        let creds = self.credentials().await?;

        match Self::json(self.request(
            &creds,
            Method::GET,
            self.endpoint(&["playlists", playlist_id])?,
        ))
        .await
        {
            Ok(playlist) => Ok(Some(playlist)),
            Err(TidalError::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, track_ids), fields(count = track_ids.len()))]
    async fn add_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[u64],
    ) -> Result<AddedTracks, TidalError> {
        let creds = self.credentials().await?;

        // Writes must carry the playlist's current ETag.
        let response = Self::execute(self.request(
            &creds,
            Method::GET,
            self.endpoint(&["playlists", playlist_id])?,
        ))
        .await?;
        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let playlist: TidalPlaylist = response.json().await?;

        let ids = track_ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let to_index = playlist.number_of_tracks.unwrap_or(0).to_string();

        let mut builder = self
            .request(
                &creds,
                Method::POST,
                self.endpoint(&["playlists", playlist_id, "items"])?,
            )
            .form(&[
                ("trackIds", ids.as_str()),
                ("onArtifactNotFound", "FAIL"),
                ("onDupes", "SKIP"),
                ("toIndex", to_index.as_str()),
            ]);
        if let Some(etag) = etag {
            builder = builder.header(IF_NONE_MATCH, etag);
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            let err = api_error(response).await;
            warn!("Adding tracks to playlist {} was rejected: {}", playlist_id, err);
            return Err(err);
        }

        let added = response
            .json::<AddItemsResponse>()
            .await
            .ok()
            .and_then(|body| body.added_item_ids)
            .map(|ids| ids.len())
            .unwrap_or(track_ids.len());

        Ok(AddedTracks {
            success: true,
            added,
        })
    }

    async fn user_playlists(&self) -> Result<Vec<TidalPlaylist>, TidalError> {
        let creds = self.credentials().await?;
        let user = user_id(&creds)?;
        let url = self.endpoint(&["users", &user, "playlists"])?;

        self.collect_pages(&creds, url, &[], PLAYLIST_PAGE_SIZE, None)
            .await
    }

    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        limit: u32,
    ) -> Result<Vec<TidalTrack>, TidalError> {
        let creds = self.credentials().await?;
        let url = self.endpoint(&["playlists", playlist_id, "tracks"])?;

        self.collect_pages(&creds, url, &[], TRACK_PAGE_SIZE, Some(limit as usize))
            .await
    }
}
