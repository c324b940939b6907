//! Player card view model
//!
//! One card per catalog track. The card owns a session in the shared hub
//! and releases it when dropped, so unmounting a card always silences it.

use crate::{
    error::{PlaybackError, Result},
    hub::HubHandle,
    media::MediaElement,
    types::{PlaybackState, SessionId},
};
use std::time::Duration;
use verse_core::Track;

/// Snapshot of everything a card renders
#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub state: PlaybackState,
    pub track_name: String,
    pub artist_name: String,
    pub image_url: String,
    pub elapsed_label: String,
    pub total_label: String,
    pub progress_percent: f64,
    /// Skip buttons are only shown while playing
    pub can_skip: bool,
}

/// Single-track player bound to the shared hub
pub struct PlayerCard {
    hub: HubHandle,
    session: SessionId,
}

impl PlayerCard {
    /// Open a card for `track`, creating media through the hub's factory
    pub fn open(hub: &HubHandle, track: Track) -> Result<Self> {
        let session = hub.borrow_mut().open(track)?;
        Ok(Self {
            hub: hub.clone(),
            session,
        })
    }

    /// Open a card over an already created media element
    pub fn with_media(hub: &HubHandle, track: Track, media: Box<dyn MediaElement>) -> Self {
        let session = hub.borrow_mut().attach(track, media);
        Self {
            hub: hub.clone(),
            session,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session
    }

    /// Play/pause button
    pub fn toggle(&self) -> Result<PlaybackState> {
        self.hub.borrow_mut().toggle(self.session)
    }

    /// Progress slider input, `percent` in `[0, 100]`
    pub fn seek(&self, percent: f64) -> Result<Duration> {
        self.hub.borrow_mut().seek_percent(self.session, percent)
    }

    /// Forward button
    pub fn skip_forward(&self) -> Result<Duration> {
        let step = self.hub.borrow().config().skip_step_secs;
        self.skip(step)
    }

    /// Back button
    pub fn skip_back(&self) -> Result<Duration> {
        let step = self.hub.borrow().config().skip_step_secs;
        self.skip(-step)
    }

    /// Move the playhead by a signed number of seconds
    pub fn skip(&self, delta_secs: f64) -> Result<Duration> {
        self.hub.borrow_mut().skip(self.session, delta_secs)
    }

    // Media element callbacks, wired by the platform layer

    pub fn on_time_update(&self) -> Result<()> {
        self.hub.borrow_mut().on_time_update(self.session)
    }

    pub fn on_duration_change(&self) -> Result<()> {
        self.hub.borrow_mut().on_duration_change(self.session)
    }

    pub fn on_ended(&self) -> Result<()> {
        self.hub.borrow_mut().on_ended(self.session)
    }

    /// Current render state
    pub fn view(&self) -> Result<CardView> {
        let hub = self.hub.borrow();
        let session = hub
            .session(self.session)
            .ok_or(PlaybackError::UnknownSession(self.session))?;
        let track = session.track();

        Ok(CardView {
            state: session.state(),
            track_name: track.name().to_string(),
            artist_name: track.artist().to_string(),
            image_url: track.image_url().to_string(),
            elapsed_label: session.elapsed_label(),
            total_label: session.total_label(),
            progress_percent: session.progress_percent(),
            can_skip: session.is_playing(),
        })
    }
}

impl Drop for PlayerCard {
    fn drop(&mut self) {
        self.hub.close(self.session);
    }
}
