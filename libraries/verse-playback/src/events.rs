//! Playback Events
//!
//! Event-based communication for UI synchronization. The hub queues events
//! as they happen; the UI drains them after each interaction or media
//! callback:
//! - State changes (play/pause/ended)
//! - Position updates (time update, seek, skip)
//! - Preemption (another session took the audio resource)
//! - Sequencer progress across a playlist

use crate::types::{PlaybackState, SessionId};
use serde::{Deserialize, Serialize};

/// Events emitted by the playback hub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// A session changed state
    StateChanged {
        /// Session that changed
        session: SessionId,
        /// The new state
        state: PlaybackState,
    },

    /// Elapsed time or duration changed
    PositionUpdate {
        /// Session that moved
        session: SessionId,
        /// Elapsed time in milliseconds
        elapsed_ms: u64,
        /// Total duration in milliseconds, if known
        duration_ms: Option<u64>,
    },

    /// A session was silenced because another one started
    Preempted {
        /// Session that lost the audio resource
        session: SessionId,
        /// Session that took it
        by: SessionId,
    },

    /// Sequencer began a playlist at its first track
    SequenceStarted {
        /// Playlist being sequenced
        playlist_id: String,
        /// First track
        track_id: String,
    },

    /// Sequencer moved to the next track after a natural end
    SequenceAdvanced {
        /// Playlist being sequenced
        playlist_id: String,
        /// Index of the new track
        index: usize,
        /// The new track
        track_id: String,
    },

    /// Sequencer ran past the last track
    SequenceFinished {
        /// Playlist that finished
        playlist_id: String,
    },

    /// Sequencer was stopped by the user or by a manual play elsewhere
    SequenceStopped {
        /// Playlist that was stopped
        playlist_id: String,
    },
}

impl PlaybackEvent {
    /// Session the event refers to, for session-scoped events
    pub fn session(&self) -> Option<SessionId> {
        match self {
            Self::StateChanged { session, .. }
            | Self::PositionUpdate { session, .. }
            | Self::Preempted { session, .. } => Some(*session),
            Self::SequenceStarted { .. }
            | Self::SequenceAdvanced { .. }
            | Self::SequenceFinished { .. }
            | Self::SequenceStopped { .. } => None,
        }
    }
}
