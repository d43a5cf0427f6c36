//! Waveline Player - Playback Control
//!
//! Platform-agnostic player state machine for Waveline Player.
//!
//! This crate provides:
//! - Single-session track loading with strict handle/tap teardown
//! - Play/pause toggling driven by engine-reported state
//! - Wrapping next/previous navigation and playlist selection
//! - Volume (linear 0.0-1.0) with muted/low/high icon tiers
//! - Fractional seeking and periodic progress sync
//! - Visualizer start/stop tied to engine play/pause/end events
//! - A serializable `PlayerView` and `PlayerEvent` stream for the UI
//!
//! # Architecture
//!
//! `waveline-playback` knows nothing about audio devices or decoding:
//! - Audio output is provided through the `AudioEngine` trait
//! - Frame timing is provided through `FrameScheduler`
//! - Drawing goes through `DrawSurface`
//!
//! Engine lifecycle (`Loaded`, `Play`, `Pause`, `End`, `LoadError`) arrives as
//! `EngineEvent`s tagged with the handle they belong to. Events for a handle
//! that is no longer live are dropped, so a late event from a replaced track
//! can never touch the current one.
//!
//! # Example
//!
//! ```rust,ignore
//! use waveline_playback::{PlaybackController, PlayerConfig};
//! use waveline_visualizer::{PixelSurface, QueuedFrameScheduler};
//!
//! let mut player = PlaybackController::new(engine, QueuedFrameScheduler::new(), PlayerConfig::default());
//! player.set_catalog(catalog)?;
//! player.toggle_play_pause()?;
//!
//! // Event loop
//! player.pump_events();
//! player.tick();
//! let mut surface = PixelSurface::new(800, 200);
//! for token in player.frame_scheduler_mut().take_due() {
//!     player.render_frame(token, &mut surface);
//! }
//! for event in player.drain_events() {
//!     println!("{event:?}");
//! }
//! ```

mod controller;
mod engine;
mod error;
mod events;
mod progress;
mod session;
mod types;
mod view;
mod volume;

pub use controller::PlaybackController;
pub use engine::{AudioEngine, EngineEvent, EngineEventKind, EngineHandle};
pub use error::{PlaybackError, Result};
pub use events::PlayerEvent;
pub use progress::{format_time, progress_fraction};
pub use session::{PlaybackSession, SessionPhase};
pub use types::{PlayIcon, PlayerConfig, DEFAULT_PLACEHOLDER_IMAGE};
pub use view::{render, DisplayMirror, NowPlaying, PlayerView, PlaylistItem};
pub use volume::{Volume, VolumeTier, DEFAULT_VOLUME};
