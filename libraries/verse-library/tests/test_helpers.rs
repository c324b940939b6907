//! Test helpers and fixtures for library integration tests
//!
//! Services run against the in-memory backend; a mockall store is
//! available for asserting that validation happens before any backend call.

#![allow(dead_code)]

use async_trait::async_trait;
use mockall::mock;
use serde_json::{Map, Value};
use std::sync::Arc;
use verse_core::{DocPath, DocumentStore, Result, Track, TrackId, User};
use verse_library::{AuthSession, LibraryContext, MemoryBackend};

mock! {
    pub Store {}

    #[async_trait]
    impl DocumentStore for Store {
        async fn get(&self, path: &DocPath) -> Result<Option<Value>>;
        async fn set(&self, path: &DocPath, value: Value) -> Result<()>;
        async fn update(&self, path: &DocPath, fields: Map<String, Value>) -> Result<()>;
        async fn push(&self, path: &DocPath, value: Value) -> Result<String>;
    }
}

/// Fresh in-memory backend and a context over it
pub fn memory_context() -> (Arc<MemoryBackend>, LibraryContext) {
    let backend = Arc::new(MemoryBackend::new());
    let ctx = LibraryContext::from_backend(Arc::clone(&backend));
    (backend, ctx)
}

/// Context whose document store is `store`; auth and blobs stay in memory
pub fn context_with_store(
    backend: &Arc<MemoryBackend>,
    store: impl DocumentStore + 'static,
) -> LibraryContext {
    LibraryContext::new(backend.clone(), Arc::new(store), backend.clone())
}

/// Create an account and leave it signed in
pub async fn signed_in(ctx: &LibraryContext, email: &str) -> User {
    ctx.auth()
        .create_account(email, "secret1")
        .await
        .expect("Failed to create account")
}

pub async fn sign_out(ctx: &LibraryContext) {
    AuthSession::new(ctx.clone())
        .sign_out()
        .await
        .expect("Failed to sign out");
}

pub fn track(id: &str, name: &str, artist: &str) -> Track {
    Track::new(TrackId::new(id), name, artist)
        .with_media_url(format!("https://cdn.example.com/{id}.mp3"))
}

/// Install a test subscriber once; honours `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
