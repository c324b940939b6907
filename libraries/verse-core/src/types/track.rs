/// Track domain type
use crate::types::TrackId;
use serde::{Deserialize, Serialize};

/// Catalog record as stored under `music/<trackId>`
///
/// Field names follow the document tree's camelCase keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecord {
    /// Display name
    pub music_name: String,

    /// Artist name
    pub artist_name: String,

    /// Free-text duration label entered at upload time (e.g. "03:45")
    #[serde(default)]
    pub duration: String,

    /// Album artwork URL
    #[serde(default)]
    pub album_image_url: String,

    /// Audio file URL
    #[serde(default)]
    pub music_file_url: String,
}

/// Playable catalog track
///
/// Serialized form is the record plus an `id` field, which is exactly the
/// snapshot stored inside playlists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Catalog metadata
    #[serde(flatten)]
    pub record: TrackRecord,
}

impl Track {
    /// Create a track with a name and artist only
    pub fn new(id: TrackId, name: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id,
            record: TrackRecord {
                music_name: name.into(),
                artist_name: artist.into(),
                ..TrackRecord::default()
            },
        }
    }

    /// Attach a record to the key it was stored under
    pub fn from_record(id: TrackId, record: TrackRecord) -> Self {
        Self { id, record }
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.record.music_name
    }

    /// Artist name
    pub fn artist(&self) -> &str {
        &self.record.artist_name
    }

    /// Uploaded duration label; not authoritative, the media element is
    pub fn duration_label(&self) -> &str {
        &self.record.duration
    }

    /// Artwork URL
    pub fn image_url(&self) -> &str {
        &self.record.album_image_url
    }

    /// Audio URL
    pub fn media_url(&self) -> &str {
        &self.record.music_file_url
    }

    /// Builder-style media URL
    #[must_use]
    pub fn with_media_url(mut self, url: impl Into<String>) -> Self {
        self.record.music_file_url = url.into();
        self
    }

    /// Case-insensitive substring match over name or artist
    ///
    /// `needle` must already be lowercase.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.record.music_name.to_lowercase().contains(needle)
            || self.record.artist_name.to_lowercase().contains(needle)
    }
}
