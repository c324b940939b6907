//! Main backend client.

use crate::config::FirebaseConfig;
use crate::error::{FirebaseError, Result};
use crate::types::{error_message, RefreshResponse};
use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};
use url::Url;
use verse_core::{AuthState, DocPath, User};

/// Refresh the ID token this long before it expires
const REFRESH_MARGIN_SECS: i64 = 60;

/// Signed-in user and their tokens
#[derive(Debug, Clone)]
pub(crate) struct Session {
    pub user: User,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn expires_at(expires_in: Option<&str>) -> DateTime<Utc> {
        let secs = expires_in.and_then(|s| s.parse::<i64>().ok()).unwrap_or(3600);
        Utc::now() + chrono::Duration::seconds(secs)
    }

    fn needs_refresh(&self) -> bool {
        self.expires_at - chrono::Duration::seconds(REFRESH_MARGIN_SECS) <= Utc::now()
    }
}

/// Client for the hosted auth, database, and storage services.
///
/// Implements [`AuthBackend`](verse_core::AuthBackend),
/// [`DocumentStore`](verse_core::DocumentStore) and
/// [`BlobStore`](verse_core::BlobStore). The ID token of the signed-in user
/// is attached to database and storage requests and refreshed shortly
/// before it expires.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use verse_firebase::{FirebaseClient, FirebaseConfig};
/// use verse_library::{Catalog, LibraryContext};
///
/// let client = Arc::new(FirebaseClient::new(FirebaseConfig::load()?)?);
/// client.restore_session(None).await;
///
/// let catalog = Catalog::new(LibraryContext::from_backend(client));
/// let tracks = catalog.refresh().await?;
/// ```
pub struct FirebaseClient {
    pub(crate) http: Client,
    pub(crate) config: FirebaseConfig,
    database_root: Url,
    storage_root: Url,
    pub(crate) session: RwLock<Option<Session>>,
    pub(crate) auth_tx: watch::Sender<AuthState>,
}

impl FirebaseClient {
    /// Create a new client with the given configuration.
    ///
    /// Auth state starts as `Loading` until [`restore_session`] or a
    /// sign-in resolves it.
    ///
    /// [`restore_session`]: FirebaseClient::restore_session
    pub fn new(config: FirebaseConfig) -> Result<Self> {
        config.validate()?;

        let database_root = Url::parse(config.database_url.trim_end_matches('/'))?;
        let storage_root = Url::parse(config.storage_url.trim_end_matches('/'))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("MusicVerse/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        let (auth_tx, _) = watch::channel(AuthState::Loading);

        Ok(Self {
            http,
            config,
            database_root,
            storage_root,
            session: RwLock::new(None),
            auth_tx,
        })
    }

    pub fn config(&self) -> &FirebaseConfig {
        &self.config
    }

    /// Check if a user is signed in.
    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Current refresh token, for persisting the session.
    pub async fn refresh_token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.refresh_token.clone())
    }

    /// Resolve the initial `Loading` state.
    ///
    /// With a persisted refresh token the session is restored; without
    /// one, or if the token is rejected, the state becomes `SignedOut`.
    pub async fn restore_session(&self, refresh_token: Option<&str>) -> Option<User> {
        let Some(refresh_token) = refresh_token else {
            self.publish(AuthState::SignedOut);
            return None;
        };

        match self.restore(refresh_token).await {
            Ok(user) => {
                info!(uid = %user.id, "Session restored");
                Some(user)
            }
            Err(e) => {
                warn!(error = %e, "Session restore failed");
                self.clear_session().await;
                None
            }
        }
    }

    async fn restore(&self, refresh_token: &str) -> Result<User> {
        let refreshed = self.exchange_refresh_token(refresh_token).await?;
        let user = self.lookup(&refreshed.id_token).await?;
        self.set_session(Session {
            user: user.clone(),
            id_token: refreshed.id_token,
            refresh_token: refreshed.refresh_token,
            expires_at: Session::expires_at(Some(refreshed.expires_in.as_str())),
        })
        .await;
        Ok(user)
    }

    // ===== Session state =====

    pub(crate) async fn set_session(&self, session: Session) {
        let user = session.user.clone();
        *self.session.write().await = Some(session);
        self.publish(AuthState::SignedIn(user));
    }

    pub(crate) async fn clear_session(&self) {
        *self.session.write().await = None;
        self.publish(AuthState::SignedOut);
    }

    pub(crate) fn publish(&self, state: AuthState) {
        self.auth_tx.send_replace(state);
    }

    /// Valid ID token of the signed-in user, refreshing it if needed.
    ///
    /// `None` when nobody is signed in; requests then go out anonymously.
    pub(crate) async fn id_token(&self) -> Result<Option<String>> {
        let session = self.session.read().await.clone();
        let Some(session) = session else {
            return Ok(None);
        };
        if !session.needs_refresh() {
            return Ok(Some(session.id_token));
        }

        debug!(uid = %session.user.id, "Refreshing ID token");
        let refreshed = match self.exchange_refresh_token(&session.refresh_token).await {
            Ok(refreshed) => refreshed,
            Err(e) => {
                warn!(error = %e, "Token refresh failed; signing out");
                self.clear_session().await;
                return Err(e);
            }
        };

        let token = refreshed.id_token.clone();
        let mut guard = self.session.write().await;
        if let Some(current) = guard.as_mut() {
            current.id_token = refreshed.id_token;
            current.refresh_token = refreshed.refresh_token;
            current.expires_at = Session::expires_at(Some(refreshed.expires_in.as_str()));
        }
        Ok(Some(token))
    }

    /// ID token or `AuthRequired`.
    pub(crate) async fn require_id_token(&self) -> Result<String> {
        self.id_token().await?.ok_or(FirebaseError::AuthRequired)
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<RefreshResponse> {
        let mut url = Url::parse(&self.config.secure_token_url)?.join("v1/token")?;
        url.query_pairs_mut().append_pair("key", &self.config.api_key);

        let response = self
            .http
            .post(url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| FirebaseError::ParseError(format!("Failed to parse refresh response: {e}")))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(FirebaseError::TokenRefreshFailed(error_message(&body)))
        }
    }

    // ===== URLs =====

    /// `{identity}/v1/accounts:{method}?key=API_KEY`
    pub(crate) fn identity_url(&self, method: &str) -> Result<Url> {
        let mut url = Url::parse(&self.config.identity_url)?.join(&format!("v1/accounts:{method}"))?;
        url.query_pairs_mut().append_pair("key", &self.config.api_key);
        Ok(url)
    }

    /// `{database}/{path}.json?auth=ID_TOKEN`
    pub(crate) fn database_url(&self, path: &DocPath, id_token: Option<&str>) -> Result<Url> {
        let mut url = self.database_root.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| FirebaseError::InvalidUrl(self.config.database_url.clone()))?;
            segments.pop_if_empty();

            let parts: Vec<&str> = path.segments().collect();
            match parts.split_last() {
                Some((last, rest)) => {
                    segments.extend(rest);
                    segments.push(&format!("{last}.json"));
                }
                None => {
                    segments.push(".json");
                }
            }
        }
        if let Some(token) = id_token {
            url.query_pairs_mut().append_pair("auth", token);
        }
        Ok(url)
    }

    /// `{storage}/v0/b/{bucket}/o[/{object}]`, the object name encoded as
    /// a single segment
    pub(crate) fn storage_url(&self, object: Option<&DocPath>) -> Result<Url> {
        let mut url = self.storage_root.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| FirebaseError::InvalidUrl(self.config.storage_url.clone()))?;
            segments
                .pop_if_empty()
                .extend(["v0", "b", self.config.storage_bucket.as_str(), "o"]);
            if let Some(object) = object {
                segments.push(object.as_str());
            }
        }
        Ok(url)
    }

    // ===== Responses =====

    /// Pass successful responses through; turn the rest into `Api` errors.
    pub(crate) async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        warn!(status = %status, error = %message, "Request failed");
        Err(FirebaseError::Api {
            status: status.as_u16(),
            message,
        })
    }

    pub(crate) async fn parse<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| FirebaseError::ParseError(e.to_string()))
    }
}
