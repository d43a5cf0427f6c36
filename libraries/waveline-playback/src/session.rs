//! The single live track session

use crate::engine::EngineHandle;
use serde::{Deserialize, Serialize};

/// Lifecycle phase of the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Nothing loaded yet
    #[default]
    Unloaded,

    /// Engine handle created, waiting for the engine to finish loading
    Loading,

    /// Loaded and ready to play
    Ready,

    Playing,

    Paused,

    /// Reached the end of the track
    Ended,

    /// Engine could not load the source; no handle is live
    Failed,
}

impl SessionPhase {
    /// Whether the controller still holds an engine handle in this phase
    pub fn has_handle(self) -> bool {
        matches!(
            self,
            SessionPhase::Loading
                | SessionPhase::Ready
                | SessionPhase::Playing
                | SessionPhase::Paused
                | SessionPhase::Ended
        )
    }
}

/// Binding between the selected catalog index, the engine handle and its
/// analysis tap
///
/// At most one session exists at a time. Loading a new track releases the
/// handle and tap here before new ones are created.
#[derive(Debug)]
pub struct PlaybackSession<T> {
    current_index: usize,
    handle: Option<EngineHandle>,
    tap: Option<T>,
    phase: SessionPhase,
}

impl<T> PlaybackSession<T> {
    pub fn new() -> Self {
        Self {
            current_index: 0,
            handle: None,
            tap: None,
            phase: SessionPhase::Unloaded,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn handle(&self) -> Option<EngineHandle> {
        self.handle
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn has_tap(&self) -> bool {
        self.tap.is_some()
    }

    pub fn tap_mut(&mut self) -> Option<&mut T> {
        self.tap.as_mut()
    }

    /// Whether `handle` is the live one
    pub fn is_current(&self, handle: EngineHandle) -> bool {
        self.handle == Some(handle)
    }

    /// Start a new session at `index`; the previous one must already be released
    pub(crate) fn begin(&mut self, index: usize) {
        debug_assert!(self.handle.is_none() && self.tap.is_none());
        self.current_index = index;
        self.phase = SessionPhase::Loading;
    }

    pub(crate) fn bind(&mut self, handle: EngineHandle, tap: Option<T>) {
        self.handle = Some(handle);
        self.tap = tap;
    }

    pub(crate) fn set_phase(&mut self, phase: SessionPhase) {
        self.phase = phase;
    }

    /// Take the handle and tap out of the session for release
    pub(crate) fn release(&mut self) -> (Option<EngineHandle>, Option<T>) {
        (self.handle.take(), self.tap.take())
    }

    /// Forget everything, including the selected index
    pub(crate) fn reset(&mut self) {
        self.current_index = 0;
        self.handle = None;
        self.tap = None;
        self.phase = SessionPhase::Unloaded;
    }
}

impl<T> Default for PlaybackSession<T> {
    fn default() -> Self {
        Self::new()
    }
}
