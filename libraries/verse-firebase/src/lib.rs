//! MusicVerse Backend Client
//!
//! REST client for the managed backend behind MusicVerse.
//!
//! # Features
//!
//! - **Authentication**: email/password, federated provider tokens, profile
//!   updates, token refresh, auth-state broadcast
//! - **Document tree**: get / set / update / push on the realtime database
//! - **Storage**: media uploads and public download URLs
//!
//! [`FirebaseClient`] implements the `verse-core` backend traits, so it can be
//! handed to the `verse-library` services in place of the in-memory backend.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use verse_core::AuthBackend;
//! use verse_firebase::{FirebaseClient, FirebaseConfig};
//! use verse_library::{AuthSession, LibraryContext, PlaylistService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(FirebaseClient::new(FirebaseConfig::load()?)?);
//!     client.restore_session(None).await;
//!
//!     let ctx = LibraryContext::from_backend(client);
//!     AuthSession::new(ctx.clone())
//!         .sign_in("ada@example.com", "secret1")
//!         .await?;
//!
//!     let playlists = PlaylistService::new(ctx);
//!     for entry in playlists.refresh().await? {
//!         println!("{}", entry.playlist.name);
//!     }
//!     Ok(())
//! }
//! ```

mod auth;
mod client;
mod config;
mod database;
mod error;
mod storage;
pub mod types;

pub use client::FirebaseClient;
pub use config::FirebaseConfig;
pub use error::{FirebaseError, Result};
