//! Catalog view model
//!
//! Holds the last fetched `music/` snapshot and filters it for search.

use crate::context::LibraryContext;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use verse_core::{paths, Result, Track, TrackId, TrackRecord};

/// Case-insensitive substring match over name or artist
///
/// An empty (or whitespace) query matches everything.
pub fn filter_tracks(tracks: &[Track], query: &str) -> Vec<Track> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return tracks.to_vec();
    }
    tracks
        .iter()
        .filter(|track| track.matches_lowercase(&needle))
        .cloned()
        .collect()
}

/// Decode a `music/` snapshot, ordered by key
///
/// Entries that do not decode as a track record are skipped.
pub fn tracks_from_snapshot(snapshot: Option<Value>) -> Vec<Track> {
    let Some(Value::Object(entries)) = snapshot else {
        return Vec::new();
    };

    entries
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value::<TrackRecord>(value) {
            Ok(record) => Some(Track::from_record(TrackId::new(key), record)),
            Err(e) => {
                warn!(key = %key, error = %e, "Skipping malformed catalog entry");
                None
            }
        })
        .collect()
}

/// Catalog of playable tracks
pub struct Catalog {
    ctx: LibraryContext,
    tracks: RwLock<Vec<Track>>,
}

impl Catalog {
    pub fn new(ctx: LibraryContext) -> Self {
        Self {
            ctx,
            tracks: RwLock::new(Vec::new()),
        }
    }

    /// Re-read the whole catalog
    pub async fn refresh(&self) -> Result<Vec<Track>> {
        let snapshot = self
            .ctx
            .store()
            .get(&paths::catalog())
            .await
            .inspect_err(|e| warn!(error = %e, "Catalog fetch failed"))?;
        Ok(self.apply_snapshot(snapshot).await)
    }

    /// Replace the catalog with a pushed snapshot
    pub async fn apply_snapshot(&self, snapshot: Option<Value>) -> Vec<Track> {
        let tracks = tracks_from_snapshot(snapshot);
        debug!(count = tracks.len(), "Catalog updated");
        *self.tracks.write().await = tracks.clone();
        tracks
    }

    /// All tracks from the last snapshot
    pub async fn tracks(&self) -> Vec<Track> {
        self.tracks.read().await.clone()
    }

    /// Tracks matching a search query
    pub async fn filter(&self, query: &str) -> Vec<Track> {
        filter_tracks(&self.tracks.read().await, query)
    }

    pub async fn get(&self, id: &TrackId) -> Option<Track> {
        self.tracks
            .read()
            .await
            .iter()
            .find(|track| &track.id == id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> Vec<Track> {
        vec![
            Track::new(TrackId::new("1"), "Midnight City", "M83"),
            Track::new(TrackId::new("2"), "Intro", "The xx"),
            Track::new(TrackId::new("3"), "Nightcall", "Kavinsky"),
        ]
    }

    #[test]
    fn empty_query_returns_everything() {
        assert_eq!(filter_tracks(&catalog(), "").len(), 3);
        assert_eq!(filter_tracks(&catalog(), "   ").len(), 3);
    }

    #[test]
    fn matches_name_or_artist_ignoring_case() {
        let hits = filter_tracks(&catalog(), "NIGHT");
        let ids: Vec<_> = hits.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["1", "3"]);

        let hits = filter_tracks(&catalog(), "the XX");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name(), "Intro");
    }

    #[test]
    fn snapshot_keys_become_ids() {
        let snapshot = json!({
            "1700000000001": {"musicName": "B", "artistName": "Y"},
            "1700000000000": {"musicName": "A", "artistName": "X", "duration": "03:10"},
            "broken": 42
        });

        let tracks = tracks_from_snapshot(Some(snapshot));

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].id.as_str(), "1700000000000");
        assert_eq!(tracks[0].duration_label(), "03:10");
        assert_eq!(tracks[1].name(), "B");
    }

    #[test]
    fn missing_catalog_is_empty() {
        assert!(tracks_from_snapshot(None).is_empty());
        assert!(tracks_from_snapshot(Some(Value::Null)).is_empty());
    }
}
