//! MusicVerse - Playback
//!
//! Platform-agnostic playback for the MusicVerse client.
//!
//! This crate provides:
//! - Playback sessions (one track bound to one media element)
//! - Exclusive playback: at most one audible session at a time
//! - Player card view model with seek and skip
//! - Playlist sequencing (in order, stop after the last track)
//! - Time formatting (`m:ss` for cards, `mm:ss` for the dashboard)
//!
//! # Architecture
//!
//! `verse-playback` never touches a platform audio API directly. Media is
//! provided through the [`MediaElement`] trait and created by a
//! [`MediaFactory`]; the optional `wasm` feature ships the browser
//! implementation.
//!
//! The [`PlaybackHub`] is created once and shared with every card and the
//! playlist dashboard through a [`HubHandle`].
//!
//! # Example
//!
//! ```rust
//! use verse_playback::{
//!     HubHandle, MediaElement, PlaybackConfig, PlaybackHub, PlaybackState, PlayerCard, Result,
//! };
//! use std::time::Duration;
//! use verse_core::{Track, TrackId};
//!
//! struct Silent(f64);
//!
//! impl MediaElement for Silent {
//!     fn play(&mut self) {}
//!     fn pause(&mut self) {}
//!     fn current_time(&self) -> f64 { self.0 }
//!     fn set_current_time(&mut self, seconds: f64) { self.0 = seconds; }
//!     fn duration(&self) -> Option<Duration> { Some(Duration::from_secs(180)) }
//! }
//!
//! let factory = |_: &Track| -> Result<Box<dyn MediaElement>> { Ok(Box::new(Silent(0.0))) };
//! let hub = HubHandle::new(PlaybackHub::new(PlaybackConfig::default(), factory));
//!
//! let card = PlayerCard::open(&hub, Track::new(TrackId::new("t1"), "Intro", "The xx"))?;
//! assert_eq!(card.toggle()?, PlaybackState::Playing);
//!
//! card.seek(50.0)?;
//! assert_eq!(card.view()?.elapsed_label, "1:30");
//! # Ok::<(), verse_playback::PlaybackError>(())
//! ```

mod card;
mod error;
pub mod events;
mod hub;
mod media;
mod sequencer;
mod session;
pub mod time;
pub mod types;

#[cfg(feature = "wasm")]
pub mod web;

// Public exports
pub use card::{CardView, PlayerCard};
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use hub::{HubHandle, PlaybackHub, WeakHubHandle};
pub use media::{MediaElement, MediaEvent, MediaFactory};
pub use sequencer::{Sequence, SequenceStatus};
pub use session::PlaybackSession;
pub use types::{PlaybackConfig, PlaybackState, ReplayPolicy, SessionId, TimeStyle};
