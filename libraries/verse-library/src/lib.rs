//! MusicVerse Library
//!
//! Client-side services over the managed backend.
//!
//! This crate provides the state behind each screen:
//! - [`AuthSession`]: sign-in, registration, sign-out, auth state subscription
//! - [`Catalog`]: the `music/` catalog with search filtering
//! - [`PlaylistService`]: create/rename playlists and add tracks (no duplicates)
//! - [`UploadService`]: upload artwork + audio and publish a catalog record
//!
//! Every service talks to the backend through the traits in `verse-core`, so
//! the same code runs against [`MemoryBackend`] in tests and the REST client
//! in production.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use verse_library::{AuthSession, LibraryContext, MemoryBackend, PlaylistService};
//! use verse_core::{Track, TrackId};
//!
//! # async fn example() -> verse_core::Result<()> {
//! let ctx = LibraryContext::from_backend(Arc::new(MemoryBackend::new()));
//!
//! let session = AuthSession::new(ctx.clone());
//! session.sign_in("ada@example.com", "secret1").await?;
//!
//! let playlists = PlaylistService::new(ctx);
//! let id = playlists.create_playlist("Late night").await?;
//! playlists.select(Some(id)).await;
//! playlists
//!     .add_to_selected_playlist(&Track::new(TrackId::new("1"), "Intro", "The xx"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod context;
mod submit;

pub mod catalog;
pub mod memory;
pub mod playlists;
pub mod session;
pub mod upload;

pub use catalog::Catalog;
pub use context::LibraryContext;
pub use memory::MemoryBackend;
pub use playlists::{PlaylistEntry, PlaylistService, SyncState};
pub use session::{AuthSession, RegistrationForm, SessionSubscription};
pub use upload::{BlobFile, UploadForm, UploadService};
