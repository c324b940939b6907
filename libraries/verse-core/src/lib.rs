//! MusicVerse Core
//!
//! Platform-agnostic domain types, error handling, and backend traits for
//! MusicVerse.
//!
//! All durable state lives in a managed backend (authentication, a
//! path-addressed document tree, and blob storage). This crate describes that
//! backend as three traits so every other crate can be written and tested
//! against an in-memory implementation or a real REST client.
//!
//! # Architecture
//!
//! - **Domain Types**: `Track`, `Playlist`, `User`, and their ids
//! - **Document Paths**: `DocPath` builders for the tree layout
//! - **Backend Traits**: `AuthBackend`, `DocumentStore`, `BlobStore`
//! - **Error Handling**: Unified `VerseError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use verse_core::types::{Playlist, PlaylistId, Track, TrackId};
//! use verse_core::paths;
//! use verse_core::types::UserId;
//!
//! let track = Track::new(
//!     TrackId::new("1718000000000"),
//!     "Midnight City",
//!     "M83",
//! );
//!
//! let mut playlist = Playlist::new(PlaylistId::new("-Nabc"), "Night Drive");
//! assert!(playlist.push_unique(track.clone()));
//! assert!(!playlist.push_unique(track));
//!
//! let path = paths::playlist(&UserId::new("uid-1"), &playlist.id);
//! assert_eq!(path.as_str(), "playlists/uid-1/-Nabc");
//!
//! // Stored records decode back into playlists
//! let record = verse_core::PlaylistRecord {
//!     name: "Night Drive".to_string(),
//!     ..Default::default()
//! };
//! assert!(record.into_playlist(playlist.id.clone()).is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod error;
pub mod paths;
pub mod types;

// Re-export commonly used types
pub use backend::{AuthBackend, BlobStore, DocumentStore};
pub use error::{Result, VerseError};
pub use paths::DocPath;
pub use types::{
    AuthState, FederatedCredential, Playlist, PlaylistId, PlaylistRecord, Track, TrackId,
    TrackRecord, User, UserId, UserProfile,
};
