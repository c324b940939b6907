/// Backend traits for MusicVerse
///
/// The managed backend is split along its three services. Implementations
/// live in `verse-library` (in-memory) and `verse-firebase` (REST).
use crate::error::Result;
use crate::paths::DocPath;
use crate::types::{AuthState, FederatedCredential, User};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::watch;

/// Authentication service
///
/// Implementers own the signed-in identity and publish every change on a
/// watch channel, starting from `AuthState::Loading`.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Sign in with email and password
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<User>;

    /// Sign in with a federated identity provider token
    async fn sign_in_with_provider(&self, credential: &FederatedCredential) -> Result<User>;

    /// Create an email/password account and sign it in
    async fn create_account(&self, email: &str, password: &str) -> Result<User>;

    /// Update display name and/or photo of the signed-in user
    async fn update_profile(
        &self,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<User>;

    /// Sign out
    async fn sign_out(&self) -> Result<()>;

    /// Subscribe to auth state changes
    ///
    /// The receiver immediately holds the current state.
    fn auth_state(&self) -> watch::Receiver<AuthState>;
}

/// Path-addressed JSON document tree
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the value at a path (`None` if absent)
    async fn get(&self, path: &DocPath) -> Result<Option<Value>>;

    /// Replace the value at a path
    async fn set(&self, path: &DocPath, value: Value) -> Result<()>;

    /// Merge fields into the object at a path
    async fn update(&self, path: &DocPath, fields: Map<String, Value>) -> Result<()>;

    /// Append under a backend-generated, chronologically sortable key
    ///
    /// Returns the generated key.
    async fn push(&self, path: &DocPath, value: Value) -> Result<String>;
}

/// Blob storage with public retrieval URLs
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload bytes under a path, replacing any existing blob
    async fn upload(&self, path: &DocPath, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    /// Public retrieval URL for an uploaded blob
    async fn download_url(&self, path: &DocPath) -> Result<String>;
}
