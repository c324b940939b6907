//! Core types for playback management

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to one playback session inside the hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Playback state of a single session
///
/// ```text
/// Idle --play--> Playing <--toggle--> Paused
///                   |
///                 ended
///                   v
///                 Ended --toggle--> Playing
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Never started
    Idle,

    /// Producing sound
    Playing,

    /// Paused mid-track (by the user or by another session starting)
    Paused,

    /// Reached the natural end of the track
    Ended,
}

impl PlaybackState {
    /// Whether the session is audible
    pub fn is_playing(self) -> bool {
        self == Self::Playing
    }
}

/// Where playback resumes when a finished session is toggled again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayPolicy {
    /// Rewind to 0:00
    #[default]
    FromStart,

    /// Leave the position where the media element left it
    FromCurrentPosition,
}

/// Minutes padding for `minutes:seconds` labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeStyle {
    /// `m:ss` (player cards)
    Compact,

    /// `mm:ss` (playlist dashboard)
    Padded,
}

/// Configuration for the playback hub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Step for the skip back/forward buttons, in seconds (default: 10)
    pub skip_step_secs: f64,

    /// Replay behavior after a track ended (default: `FromStart`)
    pub replay: ReplayPolicy,

    /// Label style for player cards (default: `Compact`)
    pub card_time_style: TimeStyle,

    /// Label style for sessions started by the sequencer (default: `Padded`)
    pub dashboard_time_style: TimeStyle,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            skip_step_secs: 10.0,
            replay: ReplayPolicy::FromStart,
            card_time_style: TimeStyle::Compact,
            dashboard_time_style: TimeStyle::Padded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.skip_step_secs, 10.0);
        assert_eq!(config.replay, ReplayPolicy::FromStart);
        assert_eq!(config.card_time_style, TimeStyle::Compact);
        assert_eq!(config.dashboard_time_style, TimeStyle::Padded);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: PlaybackConfig =
            serde_json::from_str(r#"{ "replay": "from_current_position" }"#).unwrap();

        assert_eq!(config.replay, ReplayPolicy::FromCurrentPosition);
        assert_eq!(config.skip_step_secs, 10.0);
    }

    #[test]
    fn only_playing_is_audible() {
        assert!(PlaybackState::Playing.is_playing());
        assert!(!PlaybackState::Paused.is_playing());
        assert!(!PlaybackState::Ended.is_playing());
        assert!(!PlaybackState::Idle.is_playing());
    }
}
