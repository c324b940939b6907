use std::sync::Arc;
use verse_core::{AuthBackend, AuthState, BlobStore, DocumentStore, Result, User, VerseError};

/// Handles to the three backend services
///
/// Cheap to clone; every service in this crate holds one.
#[derive(Clone)]
pub struct LibraryContext {
    auth: Arc<dyn AuthBackend>,
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
}

impl LibraryContext {
    pub fn new(
        auth: Arc<dyn AuthBackend>,
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self { auth, store, blobs }
    }

    /// Context over a single backend implementing all three services
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: AuthBackend + DocumentStore + BlobStore + 'static,
    {
        Self {
            auth: backend.clone(),
            store: backend.clone(),
            blobs: backend,
        }
    }

    pub fn auth(&self) -> &dyn AuthBackend {
        self.auth.as_ref()
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    pub fn blobs(&self) -> &dyn BlobStore {
        self.blobs.as_ref()
    }

    pub(crate) fn auth_arc(&self) -> Arc<dyn AuthBackend> {
        Arc::clone(&self.auth)
    }

    /// Signed-in user, if any
    pub fn current_user(&self) -> Option<User> {
        match &*self.auth.auth_state().borrow() {
            AuthState::SignedIn(user) => Some(user.clone()),
            AuthState::Loading | AuthState::SignedOut => None,
        }
    }

    /// Signed-in user or `SignInRequired`
    pub(crate) fn require_user(&self) -> Result<User> {
        self.current_user().ok_or(VerseError::SignInRequired)
    }
}
