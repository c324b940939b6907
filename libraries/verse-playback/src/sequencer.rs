//! Playlist sequencing
//!
//! Plays every track of a playlist back-to-back: index 0 first, then
//! index+1 on each natural end, stopping after the last track. No shuffle,
//! no repeat, no wraparound.

use crate::types::SessionId;
use verse_core::{PlaylistId, Track};

/// An active run through one playlist
#[derive(Debug, Clone)]
pub struct Sequence {
    playlist_id: PlaylistId,
    tracks: Vec<Track>,
    index: usize,
    session: SessionId,
}

impl Sequence {
    pub(crate) fn new(playlist_id: PlaylistId, tracks: Vec<Track>, session: SessionId) -> Self {
        Self {
            playlist_id,
            tracks,
            index: 0,
            session,
        }
    }

    /// Playlist being sequenced
    pub fn playlist_id(&self) -> &PlaylistId {
        &self.playlist_id
    }

    /// Index of the current track
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of tracks in the run
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the run has no tracks (never true for a started sequence)
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Session playing the current track
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Track at the current index
    pub fn current_track(&self) -> Option<&Track> {
        self.tracks.get(self.index)
    }

    /// Move to the next track, or `None` past the end
    pub(crate) fn advance(&mut self) -> Option<&Track> {
        let next = self.index + 1;
        if next >= self.tracks.len() {
            return None;
        }
        self.index = next;
        self.tracks.get(next)
    }

    pub(crate) fn set_session(&mut self, session: SessionId) {
        self.session = session;
    }
}

/// Result of a `play_playlist` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceStatus {
    /// The playlist started from its first track
    Started,

    /// The playlist was already playing and has been stopped
    Stopped,
}
