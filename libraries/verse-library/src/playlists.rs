//! Playlist service
//!
//! Backs the playlist dashboard and the add-to-playlist dialog:
//! - Create and rename playlists owned by the signed-in user
//! - Add a track snapshot to the selected playlist (at most once per track)
//! - Optimistic local list: new writes are `Pending` until a re-fetch
//!   confirms them
//! - The local list and selection belong to one user; they are dropped as
//!   soon as a different user (or nobody) is signed in

use crate::{context::LibraryContext, submit::SubmitLock};
use serde_json::{json, Map, Value};
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::{debug, info, warn};
use verse_core::{
    paths, Playlist, PlaylistId, PlaylistRecord, Result, Track, User, UserId, VerseError,
};

/// Whether the local copy has been confirmed by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Written locally, not yet seen in a fetch
    Pending,

    /// Matches the last fetch
    Confirmed,
}

/// A playlist in the local list
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistEntry {
    pub playlist: Playlist,
    pub sync: SyncState,
}

#[derive(Debug, Default)]
struct PlaylistState {
    owner: Option<UserId>,
    entries: Vec<PlaylistEntry>,
    selected: Option<PlaylistId>,
}

impl PlaylistState {
    /// Forget everything that belonged to a previous user
    fn scope_to(&mut self, owner: Option<&UserId>) {
        if self.owner.as_ref() == owner {
            return;
        }
        if !self.entries.is_empty() || self.selected.is_some() {
            debug!(previous = ?self.owner, "Signed-in user changed; playlist state cleared");
        }
        self.entries.clear();
        self.selected = None;
        self.owner = owner.cloned();
    }

    fn entry_mut(&mut self, id: &PlaylistId) -> Option<&mut PlaylistEntry> {
        self.entries.iter_mut().find(|e| &e.playlist.id == id)
    }
}

/// Playlists of the signed-in user
pub struct PlaylistService {
    ctx: LibraryContext,
    state: RwLock<PlaylistState>,
    create_lock: SubmitLock,
    add_lock: SubmitLock,
}

impl PlaylistService {
    pub fn new(ctx: LibraryContext) -> Self {
        Self {
            ctx,
            state: RwLock::new(PlaylistState::default()),
            create_lock: SubmitLock::new("create playlist"),
            add_lock: SubmitLock::new("add to playlist"),
        }
    }

    // ===== Local list =====

    /// Local list, in creation order
    pub async fn playlists(&self) -> Vec<PlaylistEntry> {
        self.current_state().await.entries.clone()
    }

    /// Choose the target of `add_to_selected_playlist`
    pub async fn select(&self, id: Option<PlaylistId>) {
        self.current_state().await.selected = id;
    }

    pub async fn selected(&self) -> Option<PlaylistId> {
        self.current_state().await.selected.clone()
    }

    // ===== Queries =====

    /// Re-fetch every playlist of the signed-in user
    ///
    /// Replaces the local list; every entry becomes `Confirmed`. The
    /// selection is kept if the playlist still exists.
    pub async fn refresh(&self) -> Result<Vec<PlaylistEntry>> {
        let user = self.ctx.require_user()?;
        let snapshot = self
            .ctx
            .store()
            .get(&paths::playlists(&user.id))
            .await
            .inspect_err(|e| warn!(error = %e, uid = %user.id, "Playlist fetch failed"))?;

        let entries: Vec<PlaylistEntry> = decode_playlists(snapshot)?
            .into_iter()
            .map(|playlist| PlaylistEntry {
                playlist,
                sync: SyncState::Confirmed,
            })
            .collect();

        let mut state = self.state_of(&user.id).await;
        let still_exists = state
            .selected
            .as_ref()
            .map_or(true, |selected| entries.iter().any(|e| &e.playlist.id == selected));
        if !still_exists {
            state.selected = None;
        }
        state.entries = entries.clone();
        debug!(count = entries.len(), "Playlists refreshed");
        Ok(entries)
    }

    /// Fetch the member tracks of one playlist, in insertion order
    pub async fn playlist_tracks(&self, id: &PlaylistId) -> Result<Vec<Track>> {
        let user = self.ctx.require_user()?;
        Ok(self.fetch_playlist(&user, id).await?.tracks)
    }

    // ===== Mutations =====

    /// Create an empty playlist
    ///
    /// Returns the backend-generated id.
    pub async fn create_playlist(&self, name: &str) -> Result<PlaylistId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(VerseError::invalid_input("Please enter a playlist name."));
        }
        let user = self.ctx.require_user()?;
        let _guard = self.create_lock.acquire()?;

        let key = self
            .ctx
            .store()
            .push(&paths::playlists(&user.id), json!({ "name": name }))
            .await
            .inspect_err(|e| warn!(error = %e, "Playlist creation failed"))?;
        let id = PlaylistId::new(key);
        info!(playlist_id = %id, name, "Playlist created");

        self.state_of(&user.id).await.entries.push(PlaylistEntry {
            playlist: Playlist::new(id.clone(), name),
            sync: SyncState::Pending,
        });
        self.reconcile().await;

        Ok(id)
    }

    /// Add a snapshot of `track` to the selected playlist
    ///
    /// Fails with `Duplicate` (and writes nothing) when the playlist
    /// already holds a track with the same id.
    pub async fn add_to_selected_playlist(&self, track: &Track) -> Result<()> {
        let playlist_id = self.selected().await.ok_or(VerseError::NoPlaylistSelected)?;
        let user = self.ctx.require_user()?;
        let _guard = self.add_lock.acquire()?;

        let current = self.fetch_playlist(&user, &playlist_id).await?;
        if current.contains(&track.id) {
            info!(playlist_id = %playlist_id, track = %track.id, "Track already in playlist");
            return Err(VerseError::Duplicate(track.name().to_string()));
        }

        self.ctx
            .store()
            .push(
                &paths::playlist_songs(&user.id, &playlist_id),
                serde_json::to_value(track)?,
            )
            .await
            .inspect_err(|e| warn!(error = %e, playlist_id = %playlist_id, "Add to playlist failed"))?;
        info!(playlist_id = %playlist_id, track = %track.id, "Track added to playlist");

        {
            let mut state = self.state_of(&user.id).await;
            if let Some(entry) = state.entry_mut(&playlist_id) {
                entry.playlist.push_unique(track.clone());
                entry.sync = SyncState::Pending;
            }
        }
        self.reconcile_one(&user, &playlist_id).await;

        Ok(())
    }

    /// Rename a playlist owned by the signed-in user
    pub async fn rename_playlist(&self, id: &PlaylistId, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(VerseError::invalid_input("Please enter a playlist name."));
        }
        let user = self.ctx.require_user()?;

        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String(name.to_string()));
        self.ctx
            .store()
            .update(&paths::playlist(&user.id, id), fields)
            .await
            .inspect_err(|e| warn!(error = %e, playlist_id = %id, "Rename failed"))?;
        info!(playlist_id = %id, name, "Playlist renamed");

        {
            let mut state = self.state_of(&user.id).await;
            if let Some(entry) = state.entry_mut(id) {
                entry.playlist.name = name.to_string();
                entry.sync = SyncState::Pending;
            }
        }
        self.reconcile_one(&user, id).await;

        Ok(())
    }

    // ===== Internals =====

    /// Local state of whoever is signed in right now
    async fn current_state(&self) -> RwLockWriteGuard<'_, PlaylistState> {
        let user = self.ctx.current_user();
        let mut state = self.state.write().await;
        state.scope_to(user.as_ref().map(|u| &u.id));
        state
    }

    /// Local state of `owner`, cleared first if it held another user's
    async fn state_of(&self, owner: &UserId) -> RwLockWriteGuard<'_, PlaylistState> {
        let mut state = self.state.write().await;
        state.scope_to(Some(owner));
        state
    }

    async fn fetch_playlist(&self, user: &User, id: &PlaylistId) -> Result<Playlist> {
        let value = self
            .ctx
            .store()
            .get(&paths::playlist(&user.id, id))
            .await?
            .ok_or_else(|| VerseError::not_found("Playlist", id.as_str()))?;
        let record: PlaylistRecord = serde_json::from_value(value)?;
        Ok(record.into_playlist(id.clone()))
    }

    /// Confirm pending entries against a full re-fetch
    ///
    /// A failed re-fetch leaves entries `Pending`; the write itself
    /// already succeeded.
    async fn reconcile(&self) {
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "Playlist reconcile failed");
        }
    }

    async fn reconcile_one(&self, user: &User, id: &PlaylistId) {
        match self.fetch_playlist(user, id).await {
            Ok(playlist) => {
                let mut state = self.state_of(&user.id).await;
                if let Some(entry) = state.entry_mut(id) {
                    entry.playlist = playlist;
                    entry.sync = SyncState::Confirmed;
                }
            }
            Err(e) => warn!(error = %e, playlist_id = %id, "Playlist reconcile failed"),
        }
    }
}

/// Decode `playlists/<uid>` into playlists ordered by push key
fn decode_playlists(snapshot: Option<Value>) -> Result<Vec<Playlist>> {
    let Some(Value::Object(entries)) = snapshot else {
        return Ok(Vec::new());
    };

    entries
        .into_iter()
        .map(|(key, value)| {
            let record: PlaylistRecord = serde_json::from_value(value)?;
            Ok(record.into_playlist(PlaylistId::new(key)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_playlists_in_key_order() {
        let snapshot = json!({
            "-M000000000001aaaa": {"name": "Second"},
            "-M000000000000bbbb": {
                "name": "First",
                "songs": {
                    "-M000000000002cccc": {"id": "t1", "musicName": "Intro", "artistName": "The xx"}
                }
            }
        });

        let playlists = decode_playlists(Some(snapshot)).unwrap();

        assert_eq!(playlists[0].name, "First");
        assert_eq!(playlists[0].tracks[0].id.as_str(), "t1");
        assert!(playlists[1].is_empty());
    }

    #[test]
    fn no_playlists_yet() {
        assert!(decode_playlists(None).unwrap().is_empty());
    }
}
