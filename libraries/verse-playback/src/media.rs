//! Platform-agnostic media element trait
//!
//! Abstracts the browser's `<audio>` element (or any player with the same
//! surface) so sessions can be driven and tested without a platform.

use crate::error::Result;
use crate::types::SessionId;
use std::time::Duration;
use verse_core::Track;

/// Notification raised by a media element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    /// The playhead moved during playback
    TimeUpdate,
    /// Metadata loaded or the duration changed
    DurationChange,
    /// Playback reached the end of the media
    Ended,
}

/// One underlying audio-producing resource
///
/// Implementors mirror the HTML media element: positions are seconds, and
/// duration is unknown until metadata loads. Implementations are not required
/// to be `Send`; playback runs on the UI event loop.
pub trait MediaElement {
    /// Start or resume producing sound
    fn play(&mut self);

    /// Stop producing sound, keeping the position
    fn pause(&mut self);

    /// Current position in seconds
    fn current_time(&self) -> f64;

    /// Move the playhead
    fn set_current_time(&mut self, seconds: f64);

    /// Total duration, `None` until metadata has loaded
    fn duration(&self) -> Option<Duration>;

    /// Called once the hub has assigned the element its session
    ///
    /// Platforms that raise events on their own route them back to the hub
    /// as [`MediaEvent`]s tagged with `session`.
    fn bind(&mut self, _session: SessionId) {}

    /// Give up the resource
    ///
    /// Defaults to pausing; platforms that hold network streams should also
    /// drop the source.
    fn release(&mut self) {
        self.pause();
    }
}

/// Creates media elements bound to a track's audio URL
pub trait MediaFactory {
    /// Create an element for `track`
    fn create(&self, track: &Track) -> Result<Box<dyn MediaElement>>;
}

impl<F> MediaFactory for F
where
    F: Fn(&Track) -> Result<Box<dyn MediaElement>>,
{
    fn create(&self, track: &Track) -> Result<Box<dyn MediaElement>> {
        self(track)
    }
}
