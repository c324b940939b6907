//! Browser bindings
//!
//! `WebMedia` drives an `HtmlAudioElement` and forwards its `timeupdate`,
//! `durationchange`/`loadedmetadata` and `ended` events to the hub;
//! `WasmPlaybackHub` exposes the hub to JavaScript so cards and the
//! dashboard can share one instance.

use crate::{
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    hub::{HubHandle, PlaybackHub, WeakHubHandle},
    media::{MediaElement, MediaEvent, MediaFactory},
    time::duration_from_secs,
    types::{PlaybackConfig, SessionId},
};
use js_sys::Function;
use std::cell::{OnceCell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use verse_core::{PlaylistId, Track, TrackId};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlAudioElement;

/// Element events and the notification each one raises
const LISTENED: [(&str, MediaEvent); 4] = [
    ("timeupdate", MediaEvent::TimeUpdate),
    ("durationchange", MediaEvent::DurationChange),
    ("loadedmetadata", MediaEvent::DurationChange),
    ("ended", MediaEvent::Ended),
];

/// State shared by the JavaScript facing hub and its media elements
#[derive(Default)]
struct WebContext {
    hub: OnceCell<WeakHubHandle>,
    on_event: RefCell<Option<Function>>,
}

impl WebContext {
    /// Feed an element event to the hub and publish what it emitted
    fn dispatch(&self, session: SessionId, event: MediaEvent) {
        let Some(handle) = self.hub.get().and_then(WeakHubHandle::upgrade) else {
            return;
        };
        let events = {
            // Element events can fire synchronously inside a hub call
            let Some(mut hub) = handle.try_borrow_mut() else {
                tracing::warn!(session = %session, ?event, "Hub busy; media event dropped");
                return;
            };
            if let Err(e) = hub.on_media_event(session, event) {
                tracing::warn!(session = %session, ?event, error = %e, "Media event rejected");
            }
            hub.drain_events()
        };
        self.deliver(events);
    }

    fn deliver(&self, events: Vec<PlaybackEvent>) {
        let callback = self.on_event.borrow().clone();
        let Some(callback) = callback else {
            return;
        };
        for event in events {
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                        tracing::warn!(error = ?e, "Event callback failed");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Event serialization failed"),
            }
        }
    }
}

/// `<audio>` element backed media
pub struct WebMedia {
    audio: HtmlAudioElement,
    context: Option<Rc<WebContext>>,
    listeners: Vec<(&'static str, Closure<dyn FnMut()>)>,
}

impl WebMedia {
    /// Standalone element; its events are not forwarded anywhere
    pub fn new(src: &str) -> Result<Self> {
        let audio = HtmlAudioElement::new_with_src(src).map_err(js_error)?;
        Ok(Self {
            audio,
            context: None,
            listeners: Vec::new(),
        })
    }

    fn with_context(src: &str, context: Rc<WebContext>) -> Result<Self> {
        let mut media = Self::new(src)?;
        media.context = Some(context);
        Ok(media)
    }

    pub fn element(&self) -> &HtmlAudioElement {
        &self.audio
    }

    fn remove_listeners(&mut self) {
        for (name, closure) in self.listeners.drain(..) {
            if let Err(e) = self
                .audio
                .remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
            {
                tracing::warn!(event = name, error = ?e, "Removing media listener failed");
            }
        }
    }
}

impl MediaElement for WebMedia {
    fn play(&mut self) {
        match self.audio.play() {
            Ok(promise) => {
                // Autoplay policies reject the promise; the card just stays silent
                wasm_bindgen_futures::spawn_local(async move {
                    if let Err(e) = JsFuture::from(promise).await {
                        tracing::warn!(error = ?e, "Media play rejected");
                    }
                });
            }
            Err(e) => tracing::warn!(error = ?e, "Media play failed"),
        }
    }

    fn pause(&mut self) {
        if let Err(e) = self.audio.pause() {
            tracing::warn!(error = ?e, "Media pause failed");
        }
    }

    fn current_time(&self) -> f64 {
        self.audio.current_time()
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.audio.set_current_time(seconds);
    }

    fn duration(&self) -> Option<Duration> {
        let secs = self.audio.duration();
        // NaN before metadata, +Inf for live streams
        if secs.is_finite() && secs >= 0.0 {
            Some(duration_from_secs(secs))
        } else {
            None
        }
    }

    fn bind(&mut self, session: SessionId) {
        let Some(context) = self.context.clone() else {
            return;
        };
        self.remove_listeners();

        for (name, event) in LISTENED {
            let context = Rc::clone(&context);
            let closure = Closure::wrap(
                Box::new(move || context.dispatch(session, event)) as Box<dyn FnMut()>,
            );
            match self
                .audio
                .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
            {
                Ok(()) => self.listeners.push((name, closure)),
                Err(e) => tracing::warn!(event = name, error = ?e, "Adding media listener failed"),
            }
        }
    }

    fn release(&mut self) {
        self.remove_listeners();
        self.pause();
        self.audio.set_src("");
        self.audio.load();
    }
}

impl Drop for WebMedia {
    fn drop(&mut self) {
        self.remove_listeners();
    }
}

/// Factory creating one `<audio>` element per track
///
/// Elements forward their events to the hub owned by the same
/// [`WasmPlaybackHub`].
pub struct WebMediaFactory {
    context: Rc<WebContext>,
}

impl MediaFactory for WebMediaFactory {
    fn create(&self, track: &Track) -> Result<Box<dyn MediaElement>> {
        let media = WebMedia::with_context(track.media_url(), Rc::clone(&self.context))?;
        Ok(Box::new(media))
    }
}

fn js_error(value: JsValue) -> PlaybackError {
    PlaybackError::Media(format!("{value:?}"))
}

fn to_js(error: PlaybackError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// JavaScript facing hub
///
/// Sessions are addressed by their numeric id. Events are delivered as JSON
/// strings to the callback registered with `set_on_event`.
#[wasm_bindgen]
pub struct WasmPlaybackHub {
    handle: HubHandle,
    context: Rc<WebContext>,
}

#[wasm_bindgen]
impl WasmPlaybackHub {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        let context = Rc::new(WebContext::default());
        let factory = WebMediaFactory {
            context: Rc::clone(&context),
        };
        let handle = HubHandle::new(PlaybackHub::new(PlaybackConfig::default(), factory));
        // Freshly created, so the cell is empty
        let _ = context.hub.set(handle.downgrade());
        Self { handle, context }
    }

    pub fn set_on_event(&mut self, callback: Function) {
        *self.context.on_event.borrow_mut() = Some(callback);
    }

    /// Open a card session, returning its id
    pub fn open(
        &mut self,
        id: String,
        name: String,
        artist: String,
        media_url: String,
    ) -> std::result::Result<u64, JsValue> {
        let track = Track::new(TrackId::new(id), name, artist).with_media_url(media_url);
        let session = self.handle.borrow_mut().open(track).map_err(to_js)?;
        Ok(session.get())
    }

    pub fn close(&mut self, session: u64) {
        self.handle.borrow_mut().close(SessionId::new(session));
        self.flush();
    }

    pub fn toggle(&mut self, session: u64) -> std::result::Result<bool, JsValue> {
        let state = self
            .handle
            .borrow_mut()
            .toggle(SessionId::new(session))
            .map_err(to_js)?;
        self.flush();
        Ok(state.is_playing())
    }

    pub fn seek(&mut self, session: u64, percent: f64) -> std::result::Result<f64, JsValue> {
        let position = self
            .handle
            .borrow_mut()
            .seek_percent(SessionId::new(session), percent)
            .map_err(to_js)?;
        self.flush();
        Ok(position.as_secs_f64())
    }

    pub fn skip(&mut self, session: u64, delta_secs: f64) -> std::result::Result<f64, JsValue> {
        let position = self
            .handle
            .borrow_mut()
            .skip(SessionId::new(session), delta_secs)
            .map_err(to_js)?;
        self.flush();
        Ok(position.as_secs_f64())
    }

    pub fn time_update(&mut self, session: u64) -> std::result::Result<(), JsValue> {
        self.handle
            .borrow_mut()
            .on_time_update(SessionId::new(session))
            .map_err(to_js)?;
        self.flush();
        Ok(())
    }

    pub fn duration_change(&mut self, session: u64) -> std::result::Result<(), JsValue> {
        self.handle
            .borrow_mut()
            .on_duration_change(SessionId::new(session))
            .map_err(to_js)?;
        self.flush();
        Ok(())
    }

    pub fn ended(&mut self, session: u64) -> std::result::Result<(), JsValue> {
        self.handle
            .borrow_mut()
            .on_ended(SessionId::new(session))
            .map_err(to_js)?;
        self.flush();
        Ok(())
    }

    /// Toggle a playlist; `tracks` is the JSON array of stored snapshots
    pub fn play_playlist(
        &mut self,
        playlist_id: String,
        tracks: String,
    ) -> std::result::Result<bool, JsValue> {
        let tracks: Vec<Track> =
            serde_json::from_str(&tracks).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let status = self
            .handle
            .borrow_mut()
            .play_playlist(&PlaylistId::new(playlist_id), tracks)
            .map_err(to_js)?;
        self.flush();
        Ok(status == crate::sequencer::SequenceStatus::Started)
    }

    fn flush(&mut self) {
        let events = self.handle.borrow_mut().drain_events();
        self.context.deliver(events);
    }
}

impl Default for WasmPlaybackHub {
    fn default() -> Self {
        Self::new()
    }
}
