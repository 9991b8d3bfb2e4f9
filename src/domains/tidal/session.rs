//! Session manager: the shared TIDAL login used by every tool.
//!
//! One `SessionManager` is built at startup and handed to each tool route.
//! It owns the streaming client, the session file that survives restarts,
//! and the OAuth device login flow.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::browser;
use super::client::StreamingClient;
use super::error::TidalError;
use super::models::SessionCredentials;
use crate::core::config::TidalConfig;

/// Result of a successful `login`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// A valid session already existed; no handshake was started.
    AlreadyAuthenticated,
    /// A new browser login completed and was persisted.
    Authenticated,
}

/// Shared session state for all tool handlers.
pub struct SessionManager {
    client: Arc<dyn StreamingClient>,
    session_file: PathBuf,
    login_timeout: Duration,
    open_browser: bool,
    /// Held for the whole login so two handshakes never overlap.
    login_lock: Mutex<()>,
    /// Credentials last read from or written to the session file.
    persisted: Mutex<Option<SessionCredentials>>,
}

impl SessionManager {
    /// Create a manager around `client` using the TIDAL configuration.
    pub fn new(client: Arc<dyn StreamingClient>, config: &TidalConfig) -> Self {
        Self {
            client,
            session_file: config.session_file.clone(),
            login_timeout: config.login_timeout(),
            open_browser: config.open_browser,
            login_lock: Mutex::new(()),
            persisted: Mutex::new(None),
        }
    }

    /// The streaming client tools call once authenticated.
    pub fn client(&self) -> &dyn StreamingClient {
        self.client.as_ref()
    }

    /// Path of the persisted session.
    pub fn session_file(&self) -> &Path {
        &self.session_file
    }

    /// Whether the shared session is a valid login.
    ///
    /// A session held in memory is checked first. When it is missing or no
    /// longer valid, the session file is (re)loaded, so a login completed by
    /// another process is picked up. Credentials refreshed during the check
    /// are written back to the file. Any failure along the way (no file, bad
    /// JSON, network) yields `false`.
    pub async fn ensure_authenticated(&self) -> bool {
        if self.client.has_session().await && self.check_login().await {
            self.persist_if_changed().await;
            return true;
        }

        match fs::try_exists(&self.session_file).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("No session file at {:?}", self.session_file);
                return false;
            }
            Err(e) => {
                warn!("Cannot access session file {:?}: {}", self.session_file, e);
                return false;
            }
        }

        match self.load_session_file().await {
            Ok(true) => {}
            Ok(false) => return false,
            Err(e) => {
                warn!(
                    "Ignoring unreadable session file {:?}: {}",
                    self.session_file, e
                );
                return false;
            }
        }

        let valid = self.check_login().await;
        if valid {
            self.persist_if_changed().await;
        }
        valid
    }

    /// Log in through the OAuth device flow unless already authenticated.
    ///
    /// Opens the verification URL in the browser (best effort), waits at
    /// most the configured timeout for the user, then persists the session.
    #[instrument(skip(self))]
    pub async fn login(&self) -> Result<LoginOutcome, TidalError> {
        let _guard = self.login_lock.lock().await;

        if self.ensure_authenticated().await {
            info!("Already authenticated with TIDAL");
            return Ok(LoginOutcome::AlreadyAuthenticated);
        }

        let device = self.client.start_device_login().await?;
        let url = normalize_verification_url(&device.verification_uri_complete);
        info!(
            user_code = %device.user_code,
            "Complete the TIDAL login by visiting {}", url
        );

        if self.open_browser {
            if let Err(e) = browser::open(&url).await {
                warn!("Could not open a browser ({}); visit {} manually", e, url);
            }
        }

        match tokio::time::timeout(self.login_timeout, self.client.complete_device_login(&device))
            .await
        {
            Ok(result) => result?,
            Err(_) => {
                warn!("Login not completed within {:?}", self.login_timeout);
                return Err(TidalError::LoginTimeout(self.login_timeout.as_secs()));
            }
        }

        if !self.client.check_login().await? {
            return Err(TidalError::LoginIncomplete);
        }

        self.save_session_file().await?;
        info!("Authenticated with TIDAL; session saved to {:?}", self.session_file);
        Ok(LoginOutcome::Authenticated)
    }

    async fn check_login(&self) -> bool {
        match self.client.check_login().await {
            Ok(valid) => valid,
            Err(e) => {
                warn!("Session check failed: {}", e);
                false
            }
        }
    }

    /// Restore the session file into the client.
    ///
    /// Returns `false` when the file holds the credentials the client
    /// already has.
    async fn load_session_file(&self) -> Result<bool, TidalError> {
        let raw = fs::read(&self.session_file).await?;
        let credentials: SessionCredentials = serde_json::from_slice(&raw)?;
        *self.persisted.lock().await = Some(credentials.clone());

        if self.client.export_session().await.as_ref() == Some(&credentials) {
            debug!("Session file {:?} holds the current session", self.session_file);
            return Ok(false);
        }

        self.client.restore_session(credentials).await;
        debug!("Loaded session from {:?}", self.session_file);
        Ok(true)
    }

    async fn save_session_file(&self) -> Result<(), TidalError> {
        let credentials = self
            .client
            .export_session()
            .await
            .ok_or(TidalError::NotAuthenticated)?;

        let mut persisted = self.persisted.lock().await;
        self.write_session_file(&credentials).await?;
        *persisted = Some(credentials);
        Ok(())
    }

    /// Write the client's credentials when they differ from the file.
    async fn persist_if_changed(&self) {
        let Some(credentials) = self.client.export_session().await else {
            return;
        };

        let mut persisted = self.persisted.lock().await;
        if persisted.as_ref() == Some(&credentials) {
            return;
        }

        match self.write_session_file(&credentials).await {
            Ok(()) => {
                debug!("Saved updated session to {:?}", self.session_file);
                *persisted = Some(credentials);
            }
            Err(e) => warn!("Could not save session to {:?}: {}", self.session_file, e),
        }
    }

    async fn write_session_file(&self, credentials: &SessionCredentials) -> Result<(), TidalError> {
        if let Some(parent) = self.session_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_vec_pretty(credentials)?;
        fs::write(&self.session_file, json).await?;
        Ok(())
    }
}

/// Prefix `https://` when the service hands back a bare host and path.
pub fn normalize_verification_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tidal::fake::FakeClient;
    use tempfile::TempDir;

    fn manager(client: Arc<FakeClient>, dir: &TempDir) -> SessionManager {
        let config = TidalConfig {
            session_file: dir.path().join("sessions").join("session.json"),
            login_timeout_secs: 5,
            open_browser: false,
            ..TidalConfig::default()
        };
        SessionManager::new(client, &config)
    }

    #[test]
    fn test_normalize_verification_url() {
        assert_eq!(
            normalize_verification_url("link.tidal.com/ABCDE"),
            "https://link.tidal.com/ABCDE"
        );
        assert_eq!(
            normalize_verification_url("https://link.tidal.com/ABCDE"),
            "https://link.tidal.com/ABCDE"
        );
        assert_eq!(
            normalize_verification_url("http://localhost/ABCDE"),
            "http://localhost/ABCDE"
        );
    }

    #[tokio::test]
    async fn test_not_authenticated_without_session_file() {
        let dir = TempDir::new().unwrap();
        let client = Arc::new(FakeClient::new());
        let session = manager(client.clone(), &dir);

        assert!(!session.ensure_authenticated().await);
        assert!(!client.has_session().await);
    }

    #[tokio::test]
    async fn test_corrupt_session_file_is_not_authenticated() {
        let dir = TempDir::new().unwrap();
        let client = Arc::new(FakeClient::new());
        let session = manager(client.clone(), &dir);
        std::fs::create_dir_all(session.session_file().parent().unwrap()).unwrap();
        std::fs::write(session.session_file(), b"{not json").unwrap();

        assert!(!session.ensure_authenticated().await);
    }

    #[tokio::test]
    async fn test_login_persists_session() {
        let dir = TempDir::new().unwrap();
        let client = Arc::new(FakeClient::new());
        let session = manager(client.clone(), &dir);

        let outcome = session.login().await.unwrap();
        assert_eq!(outcome, LoginOutcome::Authenticated);
        assert!(session.session_file().exists());
        assert_eq!(client.calls_to("start_device_login"), 1);
        assert_eq!(client.calls_to("complete_device_login"), 1);
    }

    #[tokio::test]
    async fn test_second_login_skips_handshake() {
        let dir = TempDir::new().unwrap();
        let client = Arc::new(FakeClient::new());
        let session = manager(client.clone(), &dir);

        assert_eq!(session.login().await.unwrap(), LoginOutcome::Authenticated);
        assert_eq!(
            session.login().await.unwrap(),
            LoginOutcome::AlreadyAuthenticated
        );
        assert_eq!(client.calls_to("start_device_login"), 1);
    }

    #[tokio::test]
    async fn test_persisted_session_restores_in_fresh_manager() {
        let dir = TempDir::new().unwrap();
        let first = Arc::new(FakeClient::new());
        manager(first.clone(), &dir).login().await.unwrap();

        // A new process: fresh client, same session file.
        let second = Arc::new(FakeClient::new());
        let session = manager(second.clone(), &dir);
        assert!(session.ensure_authenticated().await);
        assert_eq!(second.export_session().await, first.export_session().await);
        assert_eq!(second.calls_to("start_device_login"), 0);
    }

    #[tokio::test]
    async fn test_expired_persisted_session_is_not_authenticated() {
        let dir = TempDir::new().unwrap();
        let first = Arc::new(FakeClient::new());
        manager(first.clone(), &dir).login().await.unwrap();

        let second = Arc::new(FakeClient::new().with_rejected_sessions());
        assert!(!manager(second, &dir).ensure_authenticated().await);
    }

    #[tokio::test]
    async fn test_login_times_out() {
        let dir = TempDir::new().unwrap();
        let client = Arc::new(FakeClient::new().with_pending_login());
        let config = TidalConfig {
            session_file: dir.path().join("session.json"),
            login_timeout_secs: 0,
            open_browser: false,
            ..TidalConfig::default()
        };
        let session = SessionManager::new(client, &config);

        let result = session.login().await;
        assert!(matches!(result, Err(TidalError::LoginTimeout(0))));
        assert!(!session.session_file().exists());
    }

    #[tokio::test]
    async fn test_login_incomplete_when_session_invalid() {
        let dir = TempDir::new().unwrap();
        let client = Arc::new(FakeClient::new().with_rejected_sessions());
        let session = manager(client, &dir);

        let result = session.login().await;
        assert!(matches!(result, Err(TidalError::LoginIncomplete)));
        assert!(!session.session_file().exists());
    }

    #[tokio::test]
    async fn test_stale_memory_session_reloads_file() {
        let dir = TempDir::new().unwrap();
        let first = Arc::new(FakeClient::new());
        manager(first.clone(), &dir).login().await.unwrap();

        // Another process logged in while this one held an expired session.
        let second = Arc::new(FakeClient::new().with_expired_session());
        let session = manager(second.clone(), &dir);
        assert!(session.ensure_authenticated().await);
        assert_eq!(second.export_session().await, first.export_session().await);

        assert_eq!(
            session.login().await.unwrap(),
            LoginOutcome::AlreadyAuthenticated
        );
        assert_eq!(second.calls_to("start_device_login"), 0);
    }

    #[tokio::test]
    async fn test_stale_session_matching_file_is_not_rechecked() {
        let dir = TempDir::new().unwrap();
        let client = Arc::new(FakeClient::new().with_expired_session());
        let session = manager(client.clone(), &dir);
        let stale = client.export_session().await.unwrap();
        std::fs::create_dir_all(session.session_file().parent().unwrap()).unwrap();
        std::fs::write(session.session_file(), serde_json::to_vec(&stale).unwrap()).unwrap();

        assert!(!session.ensure_authenticated().await);
        assert_eq!(client.calls_to("check_login"), 1);
    }

    #[tokio::test]
    async fn test_refreshed_session_is_written_back() {
        let dir = TempDir::new().unwrap();
        let client = Arc::new(FakeClient::new().with_refresh_on_check());
        let session = manager(client.clone(), &dir);
        session.login().await.unwrap();

        assert!(session.ensure_authenticated().await);

        let raw = std::fs::read(session.session_file()).unwrap();
        let saved: SessionCredentials = serde_json::from_slice(&raw).unwrap();
        assert_eq!(Some(saved), client.export_session().await);
        assert_eq!(client.refreshes(), 2);
    }

    #[tokio::test]
    async fn test_unchanged_session_is_not_rewritten() {
        let dir = TempDir::new().unwrap();
        let client = Arc::new(FakeClient::new());
        let session = manager(client, &dir);
        session.login().await.unwrap();

        std::fs::remove_file(session.session_file()).unwrap();
        assert!(session.ensure_authenticated().await);
        assert!(!session.session_file().exists());
    }
}
