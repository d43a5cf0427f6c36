//! Audio engine seam
//!
//! The engine decodes and outputs audio; the controller only issues commands
//! against an opaque handle and consumes lifecycle events. Tests inject a fake
//! engine that emits the same event sequences a real one would.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use waveline_visualizer::AnalysisTap;

/// Opaque handle for one loaded audio source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngineHandle(u64);

impl EngineHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// Engine lifecycle transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEventKind {
    /// Source decoded and ready; duration is known from here on
    Loaded,

    /// Playback started or resumed
    Play,

    /// Playback paused
    Pause,

    /// Playback reached the end of the source
    End,

    /// Source could not be loaded or decoded
    LoadError(String),
}

/// Lifecycle event for a specific handle
///
/// Events are delivered in the order the transitions happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineEvent {
    pub handle: EngineHandle,
    pub kind: EngineEventKind,
}

impl EngineEvent {
    pub fn new(handle: EngineHandle, kind: EngineEventKind) -> Self {
        Self { handle, kind }
    }
}

/// Platform audio engine
///
/// Commands against a handle that was unloaded (or never existed) must be
/// harmless no-ops or errors, never panics.
pub trait AudioEngine {
    /// Analysis tap type produced by `attach_tap`
    type Tap: AnalysisTap + 'static;

    /// Create a handle bound to `source_url` at `volume` (0.0-1.0)
    ///
    /// Loading may finish asynchronously; completion is reported with
    /// `Loaded` or `LoadError` events.
    fn load(&mut self, source_url: &str, volume: f32) -> Result<EngineHandle>;

    /// Release a handle and stop its output
    fn unload(&mut self, handle: EngineHandle);

    fn play(&mut self, handle: EngineHandle) -> Result<()>;

    fn pause(&mut self, handle: EngineHandle) -> Result<()>;

    fn seek(&mut self, handle: EngineHandle, position: Duration) -> Result<()>;

    /// Total duration, if known yet
    fn duration(&self, handle: EngineHandle) -> Option<Duration>;

    /// Current playback position
    fn position(&self, handle: EngineHandle) -> Duration;

    /// Whether the engine is currently producing audio for `handle`
    fn is_playing(&self, handle: EngineHandle) -> bool;

    fn set_volume(&mut self, handle: EngineHandle, volume: f32) -> Result<()>;

    /// Insert an analysis tap between the mixed output and the device
    fn attach_tap(&mut self, fft_size: usize) -> Result<Self::Tap>;

    /// Remove a tap from the signal graph
    fn detach_tap(&mut self, tap: Self::Tap);

    /// Next pending lifecycle event, if any
    fn poll_event(&mut self) -> Option<EngineEvent>;
}
