/// Playlist domain types
use crate::types::{PlaylistId, Track, TrackId};
use serde::{Deserialize, Serialize};

/// User-owned, insertion-ordered collection of track snapshots
///
/// Snapshots are copies taken at add time, so later catalog edits never
/// reach an existing playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Unique playlist identifier (per owner)
    pub id: PlaylistId,

    /// Playlist name
    pub name: String,

    /// Member snapshots in insertion order
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl Playlist {
    /// Create an empty playlist
    pub fn new(id: PlaylistId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tracks: Vec::new(),
        }
    }

    /// Whether a snapshot with this track id is already a member
    pub fn contains(&self, track_id: &TrackId) -> bool {
        self.tracks.iter().any(|t| &t.id == track_id)
    }

    /// Append a snapshot unless the id is already present
    ///
    /// Returns `false` (and leaves membership unchanged) on a duplicate.
    pub fn push_unique(&mut self, track: Track) -> bool {
        if self.contains(&track.id) {
            return false;
        }
        self.tracks.push(track);
        true
    }

    /// Number of member tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the playlist has no tracks
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Stored shape of `playlists/<uid>/<pid>`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaylistRecord {
    /// Playlist name
    #[serde(default)]
    pub name: String,

    /// Member snapshots keyed by push id
    #[serde(default)]
    pub songs: serde_json::Map<String, serde_json::Value>,
}

impl PlaylistRecord {
    /// Decode into a playlist, keeping push-key (insertion) order
    ///
    /// Push keys sort chronologically, and the map is ordered by key.
    /// Entries that fail to decode are skipped.
    pub fn into_playlist(self, id: PlaylistId) -> Playlist {
        let tracks = self
            .songs
            .into_iter()
            .filter_map(|(_, value)| serde_json::from_value::<Track>(value).ok())
            .collect();

        Playlist {
            id,
            name: self.name,
            tracks,
        }
    }
}
