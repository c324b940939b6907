//! Error types for playback management

use crate::types::SessionId;
use thiserror::Error;

/// Playback errors
///
/// Media-level failures (decode, network) are never raised here; the media
/// element swallows them and the session simply stays where it is.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The session was closed or never opened
    #[error("Unknown playback session: {0}")]
    UnknownSession(SessionId),

    /// Duration metadata has not loaded yet
    #[error("Track duration is not known yet")]
    DurationUnknown,

    /// Sequencing a playlist with no tracks
    #[error("Playlist has no tracks")]
    EmptyPlaylist,

    /// The platform could not create a media element
    #[error("Media error: {0}")]
    Media(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
