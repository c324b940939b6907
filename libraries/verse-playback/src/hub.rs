//! Playback hub - exclusive ownership of the audio resource
//!
//! The hub owns every open session and enforces that at most one of them is
//! audible. Starting playback anywhere (a player card or the sequencer)
//! first silences whatever was playing. A manual play outside the active
//! sequence cancels that sequence.
//!
//! The hub is created once by the application and handed to components
//! through a [`HubHandle`]; there is no global instance.

use crate::{
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    media::{MediaElement, MediaEvent, MediaFactory},
    sequencer::{Sequence, SequenceStatus},
    session::PlaybackSession,
    types::{PlaybackConfig, PlaybackState, SessionId, TimeStyle},
};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::time::Duration;
use tracing::{debug, info};
use verse_core::{PlaylistId, Track};

/// Owner of all playback sessions
pub struct PlaybackHub {
    config: PlaybackConfig,
    factory: Box<dyn MediaFactory>,

    sessions: BTreeMap<SessionId, PlaybackSession>,
    next_id: u64,

    // The one session allowed to produce sound
    audible: Option<SessionId>,
    sequence: Option<Sequence>,

    // Event queue for UI synchronization
    pending_events: Vec<PlaybackEvent>,
}

impl PlaybackHub {
    /// Create a hub that builds media elements with `factory`
    pub fn new(config: PlaybackConfig, factory: impl MediaFactory + 'static) -> Self {
        Self {
            config,
            factory: Box::new(factory),
            sessions: BTreeMap::new(),
            next_id: 1,
            audible: None,
            sequence: None,
            pending_events: Vec::new(),
        }
    }

    /// Hub configuration
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    // ===== Sessions =====

    /// Open an idle card session for `track` using the media factory
    pub fn open(&mut self, track: Track) -> Result<SessionId> {
        let media = self.factory.create(&track)?;
        Ok(self.insert(track, media, self.config.card_time_style))
    }

    /// Open an idle card session over an existing media element
    pub fn attach(&mut self, track: Track, media: Box<dyn MediaElement>) -> SessionId {
        self.insert(track, media, self.config.card_time_style)
    }

    /// Release and forget a session
    ///
    /// Closing the sequencer's current session stops the sequence.
    pub fn close(&mut self, id: SessionId) {
        if self.sequence.as_ref().is_some_and(|seq| seq.session() == id) {
            self.stop_sequence();
            return;
        }
        self.remove(id);
    }

    /// Session by id
    pub fn session(&self, id: SessionId) -> Option<&PlaybackSession> {
        self.sessions.get(&id)
    }

    /// Number of open sessions
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// The session currently allowed to produce sound
    pub fn audible(&self) -> Option<SessionId> {
        self.audible
    }

    // ===== Transport =====

    /// Play/pause toggle
    ///
    /// Returns the new state.
    pub fn toggle(&mut self, id: SessionId) -> Result<PlaybackState> {
        if self.session_ref(id)?.is_playing() {
            self.pause(id)?;
        } else {
            self.play(id)?;
        }
        Ok(self.session_ref(id)?.state())
    }

    /// Start or resume a session, silencing any other
    pub fn play(&mut self, id: SessionId) -> Result<()> {
        self.session_ref(id)?;
        self.claim(id);

        let session = self.session_mut(id)?;
        session.start();
        let state = session.state();

        self.audible = Some(id);
        self.emit_state_changed(id, state);
        Ok(())
    }

    /// Pause a session
    pub fn pause(&mut self, id: SessionId) -> Result<()> {
        let session = self.session_mut(id)?;
        session.pause();
        let state = session.state();

        if self.audible == Some(id) {
            self.audible = None;
        }
        self.emit_state_changed(id, state);
        Ok(())
    }

    /// Seek to a percentage `[0, 100]` of the track
    pub fn seek_percent(&mut self, id: SessionId, percent: f64) -> Result<Duration> {
        let session = self.session_mut(id)?;
        let before = session.state();
        let position = session.seek_percent(percent)?;
        self.emit_repositioned(id, before);
        Ok(position)
    }

    /// Move the playhead by a signed number of seconds
    pub fn skip(&mut self, id: SessionId, delta_secs: f64) -> Result<Duration> {
        let session = self.session_mut(id)?;
        let before = session.state();
        let position = session.skip(delta_secs);
        self.emit_repositioned(id, before);
        Ok(position)
    }

    // ===== Media callbacks =====

    /// Media element reported a new position
    pub fn on_time_update(&mut self, id: SessionId) -> Result<()> {
        self.session_mut(id)?.on_time_update();
        self.emit_position_update(id);
        Ok(())
    }

    /// Media element reported its duration
    pub fn on_duration_change(&mut self, id: SessionId) -> Result<()> {
        self.session_mut(id)?.on_duration_change();
        self.emit_position_update(id);
        Ok(())
    }

    /// Media element reached its natural end
    ///
    /// Card sessions go idle; the sequencer advances to the next track.
    pub fn on_ended(&mut self, id: SessionId) -> Result<()> {
        self.session_mut(id)?.on_ended();
        if self.audible == Some(id) {
            self.audible = None;
        }
        self.emit_state_changed(id, PlaybackState::Ended);

        if self.sequence.as_ref().is_some_and(|seq| seq.session() == id) {
            self.advance_sequence(id)?;
        }
        Ok(())
    }

    /// Route a notification raised by a session's media element
    pub fn on_media_event(&mut self, id: SessionId, event: MediaEvent) -> Result<()> {
        match event {
            MediaEvent::TimeUpdate => self.on_time_update(id),
            MediaEvent::DurationChange => self.on_duration_change(id),
            MediaEvent::Ended => self.on_ended(id),
        }
    }

    // ===== Sequencer =====

    /// Play a playlist from its first track, or stop it if it is already
    /// the active sequence
    pub fn play_playlist(
        &mut self,
        playlist_id: &PlaylistId,
        tracks: Vec<Track>,
    ) -> Result<SequenceStatus> {
        if self
            .sequence
            .as_ref()
            .is_some_and(|seq| seq.playlist_id() == playlist_id)
        {
            self.stop_sequence();
            return Ok(SequenceStatus::Stopped);
        }

        let Some(first) = tracks.first().cloned() else {
            return Err(PlaybackError::EmptyPlaylist);
        };

        self.stop_sequence();
        let media = self.factory.create(&first)?;
        let id = self.insert(first.clone(), media, self.config.dashboard_time_style);
        self.play(id)?;

        info!(
            playlist_id = %playlist_id,
            tracks = tracks.len(),
            "Sequence started"
        );
        self.sequence = Some(Sequence::new(playlist_id.clone(), tracks, id));
        self.pending_events.push(PlaybackEvent::SequenceStarted {
            playlist_id: playlist_id.to_string(),
            track_id: first.id.to_string(),
        });

        Ok(SequenceStatus::Started)
    }

    /// Stop the active sequence, if any
    pub fn stop_sequence(&mut self) {
        if let Some(seq) = self.sequence.take() {
            info!(playlist_id = %seq.playlist_id(), "Sequence stopped");
            self.remove(seq.session());
            self.pending_events.push(PlaybackEvent::SequenceStopped {
                playlist_id: seq.playlist_id().to_string(),
            });
        }
    }

    /// The active sequence, if any
    pub fn active_sequence(&self) -> Option<&Sequence> {
        self.sequence.as_ref()
    }

    // ===== Events =====

    /// Drain all pending events
    ///
    /// Returns all events that have been emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internals =====

    fn insert(&mut self, track: Track, mut media: Box<dyn MediaElement>, style: TimeStyle) -> SessionId {
        let id = SessionId::new(self.next_id);
        self.next_id += 1;
        media.bind(id);

        debug!(session = %id, track = %track.id, "Session opened");
        let session = PlaybackSession::new(id, track, media, self.config.replay, style);
        self.sessions.insert(id, session);
        id
    }

    fn remove(&mut self, id: SessionId) {
        if let Some(mut session) = self.sessions.remove(&id) {
            session.release();
            debug!(session = %id, "Session closed");
        }
        if self.audible == Some(id) {
            self.audible = None;
        }
    }

    /// Silence everything except `id`
    fn claim(&mut self, id: SessionId) {
        if self.sequence.as_ref().is_some_and(|seq| seq.session() != id) {
            self.stop_sequence();
        }

        if let Some(previous) = self.audible.filter(|current| *current != id) {
            if let Some(session) = self.sessions.get_mut(&previous) {
                session.pause();
            }
            self.audible = None;
            debug!(session = %previous, by = %id, "Session preempted");
            self.pending_events.push(PlaybackEvent::Preempted {
                session: previous,
                by: id,
            });
            self.emit_state_changed(previous, PlaybackState::Paused);
        }
    }

    fn advance_sequence(&mut self, finished: SessionId) -> Result<()> {
        self.remove(finished);

        let Some(seq) = self.sequence.as_mut() else {
            return Ok(());
        };
        let playlist_id = seq.playlist_id().clone();

        let Some(next) = seq.advance().cloned() else {
            self.sequence = None;
            info!(playlist_id = %playlist_id, "Sequence finished");
            self.pending_events
                .push(PlaybackEvent::SequenceFinished { playlist_id: playlist_id.to_string() });
            return Ok(());
        };
        let index = seq.index();

        let media = match self.factory.create(&next) {
            Ok(media) => media,
            Err(e) => {
                self.sequence = None;
                return Err(e);
            }
        };
        let id = self.insert(next.clone(), media, self.config.dashboard_time_style);
        if let Some(seq) = self.sequence.as_mut() {
            seq.set_session(id);
        }
        self.play(id)?;

        debug!(playlist_id = %playlist_id, index, track = %next.id, "Sequence advanced");
        self.pending_events.push(PlaybackEvent::SequenceAdvanced {
            playlist_id: playlist_id.to_string(),
            index,
            track_id: next.id.to_string(),
        });
        Ok(())
    }

    fn session_ref(&self, id: SessionId) -> Result<&PlaybackSession> {
        self.sessions.get(&id).ok_or(PlaybackError::UnknownSession(id))
    }

    fn session_mut(&mut self, id: SessionId) -> Result<&mut PlaybackSession> {
        self.sessions
            .get_mut(&id)
            .ok_or(PlaybackError::UnknownSession(id))
    }

    fn emit_state_changed(&mut self, session: SessionId, state: PlaybackState) {
        self.pending_events
            .push(PlaybackEvent::StateChanged { session, state });
    }

    /// Position update, plus a state change when a seek left `Ended`
    fn emit_repositioned(&mut self, id: SessionId, before: PlaybackState) {
        if let Some(after) = self.sessions.get(&id).map(PlaybackSession::state) {
            if after != before {
                self.emit_state_changed(id, after);
            }
        }
        self.emit_position_update(id);
    }

    fn emit_position_update(&mut self, id: SessionId) {
        if let Some(session) = self.sessions.get(&id) {
            self.pending_events.push(PlaybackEvent::PositionUpdate {
                session: id,
                elapsed_ms: session.elapsed().as_millis() as u64,
                duration_ms: session.total().map(|d| d.as_millis() as u64),
            });
        }
    }
}

/// Shared handle to the hub for components on the UI event loop
///
/// Sessions whose owner was dropped while the hub was borrowed are queued
/// and closed on the next mutable borrow.
#[derive(Clone)]
pub struct HubHandle {
    hub: Rc<RefCell<PlaybackHub>>,
    deferred_close: Rc<RefCell<Vec<SessionId>>>,
}

impl HubHandle {
    /// Wrap a hub for sharing
    pub fn new(hub: PlaybackHub) -> Self {
        Self {
            hub: Rc::new(RefCell::new(hub)),
            deferred_close: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Borrow the hub
    pub fn borrow(&self) -> Ref<'_, PlaybackHub> {
        self.hub.borrow()
    }

    /// Borrow the hub mutably
    pub fn borrow_mut(&self) -> RefMut<'_, PlaybackHub> {
        let mut hub = self.hub.borrow_mut();
        self.close_deferred(&mut hub);
        hub
    }

    /// Borrow mutably unless the hub is already borrowed
    pub fn try_borrow_mut(&self) -> Option<RefMut<'_, PlaybackHub>> {
        let mut hub = self.hub.try_borrow_mut().ok()?;
        self.close_deferred(&mut hub);
        Some(hub)
    }

    /// Close `id` now, or on the next mutable borrow if the hub is busy
    pub fn close(&self, id: SessionId) {
        match self.try_borrow_mut() {
            Some(mut hub) => hub.close(id),
            None => {
                debug!(session = %id, "Hub busy; session close deferred");
                self.deferred_close.borrow_mut().push(id);
            }
        }
    }

    /// Sessions waiting for the hub to be released
    pub fn deferred_closes(&self) -> usize {
        self.deferred_close.borrow().len()
    }

    /// Non-owning handle for callbacks that must not keep the hub alive
    pub fn downgrade(&self) -> WeakHubHandle {
        WeakHubHandle {
            hub: Rc::downgrade(&self.hub),
            deferred_close: Rc::downgrade(&self.deferred_close),
        }
    }

    fn close_deferred(&self, hub: &mut PlaybackHub) {
        let pending = std::mem::take(&mut *self.deferred_close.borrow_mut());
        for id in pending {
            hub.close(id);
        }
    }
}

/// Weak counterpart of [`HubHandle`]
#[derive(Clone)]
pub struct WeakHubHandle {
    hub: Weak<RefCell<PlaybackHub>>,
    deferred_close: Weak<RefCell<Vec<SessionId>>>,
}

impl WeakHubHandle {
    /// The hub, if it is still alive
    pub fn upgrade(&self) -> Option<HubHandle> {
        Some(HubHandle {
            hub: self.hub.upgrade()?,
            deferred_close: self.deferred_close.upgrade()?,
        })
    }
}
