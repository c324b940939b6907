//! Single-track playback session
//!
//! A session binds one track to one media element and keeps the displayed
//! elapsed time, duration, and progress in step with it. Sessions know
//! nothing about each other; exclusivity is the hub's job.

use crate::{
    error::{PlaybackError, Result},
    media::MediaElement,
    time::{duration_from_secs, format_duration, progress_ratio},
    types::{PlaybackState, ReplayPolicy, SessionId, TimeStyle},
};
use std::time::Duration;
use tracing::debug;
use verse_core::Track;

/// Playback session for one track
pub struct PlaybackSession {
    id: SessionId,
    track: Track,
    media: Box<dyn MediaElement>,
    state: PlaybackState,

    // Displayed position; updated optimistically on seek/skip
    elapsed: Duration,
    total: Option<Duration>,

    replay: ReplayPolicy,
    time_style: TimeStyle,
}

impl PlaybackSession {
    /// Create an idle session
    pub fn new(
        id: SessionId,
        track: Track,
        media: Box<dyn MediaElement>,
        replay: ReplayPolicy,
        time_style: TimeStyle,
    ) -> Self {
        let total = media.duration();
        Self {
            id,
            track,
            media,
            state: PlaybackState::Idle,
            elapsed: Duration::ZERO,
            total,
            replay,
            time_style,
        }
    }

    // ===== Transport =====

    /// Start or resume the media element
    ///
    /// From `Ended`, the position is rewound first when the replay policy is
    /// `FromStart`.
    pub(crate) fn start(&mut self) {
        if self.state == PlaybackState::Playing {
            return;
        }

        if self.state == PlaybackState::Ended && self.replay == ReplayPolicy::FromStart {
            self.media.set_current_time(0.0);
            self.elapsed = Duration::ZERO;
        }

        self.media.play();
        self.state = PlaybackState::Playing;
        debug!(session = %self.id, track = %self.track.id, "Playback started");
    }

    /// Pause the media element if it is playing
    pub(crate) fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.media.pause();
            self.state = PlaybackState::Paused;
            debug!(session = %self.id, "Playback paused");
        }
    }

    /// Seek to a percentage of the track
    ///
    /// `percent` is clamped to `[0, 100]`. The displayed position is updated
    /// immediately without waiting for the media element.
    pub(crate) fn seek_percent(&mut self, percent: f64) -> Result<Duration> {
        let total = self.total.ok_or(PlaybackError::DurationUnknown)?;
        let percent = if percent.is_finite() {
            percent.clamp(0.0, 100.0)
        } else {
            0.0
        };

        let target = total.mul_f64(percent / 100.0);
        self.move_playhead(target);
        Ok(target)
    }

    /// Move the playhead by a signed number of seconds
    ///
    /// The result never exceeds the total duration and never drops below
    /// zero. When the duration is unknown only the lower bound applies.
    pub(crate) fn skip(&mut self, delta_secs: f64) -> Duration {
        let delta = if delta_secs.is_finite() { delta_secs } else { 0.0 };
        let mut target = duration_from_secs(self.elapsed.as_secs_f64() + delta);
        if let Some(total) = self.total {
            target = target.min(total);
        }

        self.move_playhead(target);
        target
    }

    /// An explicit seek out of `Ended` leaves the session `Paused` at the new
    /// position, so the next start resumes there instead of rewinding.
    fn move_playhead(&mut self, target: Duration) {
        self.media.set_current_time(target.as_secs_f64());
        self.elapsed = target;
        if self.state == PlaybackState::Ended {
            self.state = PlaybackState::Paused;
        }
    }

    // ===== Media callbacks =====

    /// Re-read position and duration from the media element
    pub(crate) fn on_time_update(&mut self) {
        self.elapsed = duration_from_secs(self.media.current_time());
        if let Some(total) = self.media.duration() {
            self.total = Some(total);
        }
    }

    /// Duration metadata arrived (or changed)
    ///
    /// A transient unknown duration keeps the last known total.
    pub(crate) fn on_duration_change(&mut self) {
        if let Some(total) = self.media.duration() {
            self.total = Some(total);
        }
    }

    /// The media element reached its natural end
    pub(crate) fn on_ended(&mut self) {
        self.on_time_update();
        self.state = PlaybackState::Ended;
        debug!(session = %self.id, track = %self.track.id, "Playback ended");
    }

    /// Silence and give up the media element
    pub(crate) fn release(&mut self) {
        self.media.release();
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    // ===== Queries =====

    /// Session handle
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Track bound to this session
    pub fn track(&self) -> &Track {
        &self.track
    }

    /// Current state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Whether the session is audible
    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    /// Displayed elapsed time
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Total duration, once metadata has loaded
    pub fn total(&self) -> Option<Duration> {
        self.total
    }

    /// Progress ratio in `[0, 1]`, `None` before duration is known
    pub fn progress(&self) -> Option<f64> {
        progress_ratio(self.elapsed, self.total)
    }

    /// Progress as a percentage for range inputs; 0 while unknown
    pub fn progress_percent(&self) -> f64 {
        self.progress().map_or(0.0, |ratio| ratio * 100.0)
    }

    /// Elapsed label in this session's time style
    pub fn elapsed_label(&self) -> String {
        format_duration(Some(self.elapsed), self.time_style)
    }

    /// Total label in this session's time style
    pub fn total_label(&self) -> String {
        format_duration(self.total, self.time_style)
    }
}

impl std::fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("id", &self.id)
            .field("track", &self.track.id)
            .field("state", &self.state)
            .field("elapsed", &self.elapsed)
            .field("total", &self.total)
            .finish_non_exhaustive()
    }
}
