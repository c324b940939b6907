//! Document tree paths
//!
//! The backend tree is addressed by slash-separated paths:
//!
//! ```text
//! music/<trackId>
//! playlists/<uid>/<playlistId>
//! playlists/<uid>/<playlistId>/songs/<pushId>
//! users/<uid>
//! ```
//!
//! Blob storage uses the same convention (`albumImages/<file>`,
//! `musicFiles/<file>`, `users/<uid>/profilePhoto`).

use crate::types::{PlaylistId, UserId};
use std::fmt;

/// Slash-separated path into the document tree or blob storage
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocPath(String);

impl DocPath {
    /// Path with a single root segment
    pub fn root(segment: impl AsRef<str>) -> Self {
        Self(clean(segment.as_ref()).to_string())
    }

    /// Append a segment
    #[must_use]
    pub fn child(&self, segment: impl AsRef<str>) -> Self {
        let segment = clean(segment.as_ref());
        if self.0.is_empty() {
            return Self(segment.to_string());
        }
        Self(format!("{}/{}", self.0, segment))
    }

    /// Path as a string, without leading or trailing slashes
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Last segment, if any
    pub fn key(&self) -> Option<&str> {
        self.segments().last()
    }

    /// Path without its last segment; `None` for the empty path
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            return None;
        }
        let parent = self.0.rsplit_once('/').map_or("", |(parent, _)| parent);
        Some(Self(parent.to_string()))
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn clean(segment: &str) -> &str {
    segment.trim_matches('/')
}

/// Catalog root, `music`
pub fn catalog() -> DocPath {
    DocPath::root("music")
}

/// Single catalog entry, `music/<trackId>`
pub fn catalog_entry(track_key: &str) -> DocPath {
    catalog().child(track_key)
}

/// All playlists of a user, `playlists/<uid>`
pub fn playlists(user: &UserId) -> DocPath {
    DocPath::root("playlists").child(user.as_str())
}

/// One playlist, `playlists/<uid>/<pid>`
pub fn playlist(user: &UserId, playlist: &PlaylistId) -> DocPath {
    playlists(user).child(playlist.as_str())
}

/// Member list of a playlist, `playlists/<uid>/<pid>/songs`
pub fn playlist_songs(user: &UserId, id: &PlaylistId) -> DocPath {
    playlist(user, id).child("songs")
}

/// Profile record, `users/<uid>`
pub fn user_profile(user: &UserId) -> DocPath {
    DocPath::root("users").child(user.as_str())
}

/// Blob path for album artwork
pub fn album_image_blob(file_name: &str) -> DocPath {
    DocPath::root("albumImages").child(file_name)
}

/// Blob path for audio files
pub fn music_file_blob(file_name: &str) -> DocPath {
    DocPath::root("musicFiles").child(file_name)
}

/// Blob path for a user's profile photo
pub fn profile_photo_blob(user: &UserId) -> DocPath {
    user_profile(user).child("profilePhoto")
}
