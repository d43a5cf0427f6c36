//! Playback controller
//!
//! Owns the catalog, the single live session, volume, the display mirror and
//! the visualizer. Commands go out to the `AudioEngine`; engine lifecycle
//! events come back through `handle_engine_event`, which is the only place
//! the play icon, the visualizer and the session phase react to playback.

use crate::engine::{AudioEngine, EngineEvent, EngineEventKind, EngineHandle};
use crate::error::{PlaybackError, Result};
use crate::events::PlayerEvent;
use crate::progress::progress_fraction;
use crate::session::{PlaybackSession, SessionPhase};
use crate::types::{PlayIcon, PlayerConfig};
use crate::view::{self, DisplayMirror, PlayerView};
use crate::volume::Volume;
use tracing::{debug, error, info, warn};
use waveline_core::{Catalog, Track};
use waveline_visualizer::{
    AnalysisTap, DrawSurface, FrameOutcome, FrameScheduler, FrameToken, Visualizer,
    VisualizerState,
};

/// Main playback controller
pub struct PlaybackController<E: AudioEngine, S: FrameScheduler> {
    engine: E,
    catalog: Catalog,
    session: PlaybackSession<E::Tap>,
    volume: Volume,
    mirror: DisplayMirror,
    visualizer: Visualizer<S>,
    config: PlayerConfig,

    // Event queue for UI synchronization
    pending_events: Vec<PlayerEvent>,
}

impl<E: AudioEngine, S: FrameScheduler> PlaybackController<E, S> {
    /// Create a controller with an empty catalog
    pub fn new(engine: E, scheduler: S, config: PlayerConfig) -> Self {
        Self {
            engine,
            catalog: Catalog::empty(),
            session: PlaybackSession::new(),
            volume: Volume::new(config.initial_volume),
            mirror: DisplayMirror::default(),
            visualizer: Visualizer::new(config.visualizer.clone(), scheduler),
            config,
            pending_events: Vec::new(),
        }
    }

    // ===== Catalog =====

    /// Install a catalog and load its first track
    ///
    /// An empty catalog leaves the player inert.
    pub fn set_catalog(&mut self, catalog: Catalog) -> Result<()> {
        self.release_session();
        self.session.reset();
        self.mirror.reset();
        self.catalog = catalog;

        info!(tracks = self.catalog.len(), "Catalog installed");
        self.pending_events.push(PlayerEvent::PlaylistChanged {
            length: self.catalog.len(),
        });

        if self.catalog.is_empty() {
            return Ok(());
        }
        self.load_track(0)
    }

    // ===== Transport =====

    /// Replace the current session with one for `index`
    ///
    /// Does not start playback.
    pub fn load_track(&mut self, index: usize) -> Result<()> {
        let track = self
            .catalog
            .get(index)
            .cloned()
            .ok_or(PlaybackError::IndexOutOfBounds(index))?;

        // Previous handle and tap are gone before the new ones exist
        self.release_session();

        self.session.begin(index);
        self.mirror.reset();
        self.emit_track_changed(index, &track);

        let handle = match self.engine.load(&track.source_url, self.volume.level()) {
            Ok(handle) => handle,
            Err(e) => {
                error!(index, source_url = %track.source_url, "Failed to load track: {}", e);
                self.session.set_phase(SessionPhase::Failed);
                self.emit_state_changed(SessionPhase::Failed);
                self.emit_error(e.to_string());
                return Err(e);
            }
        };

        let tap = match self.engine.attach_tap(self.config.visualizer.fft_size) {
            Ok(tap) => Some(tap),
            Err(e) => {
                warn!("Visualizer disabled for this track: {}", e);
                None
            }
        };

        self.session.bind(handle, tap);
        debug!(index, handle = handle.id(), "Track loading");
        self.emit_state_changed(SessionPhase::Loading);
        Ok(())
    }

    /// Play if the engine reports paused, pause if it reports playing
    ///
    /// No-op without a live handle.
    pub fn toggle_play_pause(&mut self) -> Result<()> {
        let Some(handle) = self.session.handle() else {
            debug!("Toggle ignored: no track loaded");
            return Ok(());
        };

        if self.engine.is_playing(handle) {
            self.engine.pause(handle)
        } else {
            self.engine.play(handle)
        }
    }

    /// Load the next track (wrapping) and play it
    pub fn next(&mut self) -> Result<()> {
        let index = self
            .catalog
            .next_index(self.session.current_index())
            .ok_or(PlaybackError::EmptyCatalog)?;
        self.load_and_play(index)
    }

    /// Load the previous track (wrapping) and play it
    pub fn prev(&mut self) -> Result<()> {
        let index = self
            .catalog
            .prev_index(self.session.current_index())
            .ok_or(PlaybackError::EmptyCatalog)?;
        self.load_and_play(index)
    }

    /// Playlist click: load `index` and play it
    pub fn select_from_playlist(&mut self, index: usize) -> Result<()> {
        self.load_and_play(index)
    }

    /// Set volume (0.0-1.0, clamped)
    ///
    /// Applies to the live handle and to every later load. Never pauses.
    pub fn set_volume(&mut self, level: f32) -> Result<()> {
        if !level.is_finite() {
            return Err(PlaybackError::InvalidVolume(level));
        }

        self.volume.set_level(level);
        if let Some(handle) = self.session.handle() {
            self.engine.set_volume(handle, self.volume.level())?;
        }

        self.pending_events.push(PlayerEvent::VolumeChanged {
            level: self.volume.level(),
            tier: self.volume.tier(),
        });
        Ok(())
    }

    /// Seek to a fraction (0.0-1.0, clamped) of the track
    ///
    /// No-op without a handle or while the duration is unknown or zero.
    pub fn seek(&mut self, fraction: f32) -> Result<()> {
        if !fraction.is_finite() {
            return Err(PlaybackError::InvalidSeekFraction(fraction));
        }

        let Some(handle) = self.session.handle() else {
            return Ok(());
        };
        let Some(duration) = self.engine.duration(handle).filter(|d| !d.is_zero()) else {
            debug!("Seek ignored: duration unknown");
            return Ok(());
        };

        let fraction = fraction.clamp(0.0, 1.0);
        let target = duration.mul_f32(fraction);
        self.engine.seek(handle, target)?;

        self.mirror.elapsed = target;
        self.mirror.progress = fraction;
        Ok(())
    }

    // ===== Timers =====

    /// Periodic progress sync
    ///
    /// Only acts while the engine reports playing.
    pub fn tick(&mut self) {
        let Some(handle) = self.session.handle() else {
            return;
        };
        if !self.engine.is_playing(handle) {
            return;
        }

        let position = self.engine.position(handle);
        let duration = self.engine.duration(handle);
        let progress = progress_fraction(position, duration);

        if let Some(fraction) = progress {
            self.mirror.progress = fraction;
        }
        self.mirror.elapsed = position;
        if duration.is_some() {
            self.mirror.total = duration;
        }

        self.pending_events.push(PlayerEvent::ProgressUpdated {
            position_ms: duration_ms(position),
            duration_ms: duration.map(duration_ms),
            progress,
        });
    }

    /// Draw one visualizer frame for a token the host found due
    pub fn render_frame(&mut self, token: FrameToken, surface: &mut dyn DrawSurface) -> FrameOutcome {
        let tap = self
            .session
            .tap_mut()
            .map(|tap| tap as &mut dyn AnalysisTap);
        self.visualizer.on_frame(token, tap, surface)
    }

    // ===== Engine events =====

    /// Drain and apply every pending engine event; returns how many were read
    pub fn pump_events(&mut self) -> usize {
        let mut count = 0;
        while let Some(event) = self.engine.poll_event() {
            self.handle_engine_event(event);
            count += 1;
        }
        count
    }

    /// Apply one engine lifecycle event
    ///
    /// Events for any handle other than the live one are stale and ignored.
    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        let EngineEvent { handle, kind } = event;
        if !self.session.is_current(handle) {
            debug!(handle = handle.id(), ?kind, "Ignoring stale engine event");
            return;
        }

        match kind {
            EngineEventKind::Loaded => {
                if self.session.phase() == SessionPhase::Loading {
                    self.transition(SessionPhase::Ready);
                }
                self.refresh_total(handle);
            }
            EngineEventKind::Play => {
                self.mirror.play_icon = PlayIcon::Pause;
                self.visualizer.start();
                self.refresh_total(handle);
                self.transition(SessionPhase::Playing);
            }
            EngineEventKind::Pause => {
                self.mirror.play_icon = PlayIcon::Play;
                self.visualizer.stop();
                self.transition(SessionPhase::Paused);
            }
            EngineEventKind::End => {
                self.mirror.play_icon = PlayIcon::Play;
                self.visualizer.stop();
                self.transition(SessionPhase::Ended);
                self.pending_events.push(PlayerEvent::TrackFinished {
                    index: self.session.current_index(),
                });
            }
            EngineEventKind::LoadError(message) => {
                error!(
                    index = self.session.current_index(),
                    handle = handle.id(),
                    "Track failed to load: {}",
                    message
                );
                self.release_session();
                self.mirror.reset();
                self.transition(SessionPhase::Failed);
                self.emit_error(message);
            }
        }
    }

    // ===== Lifecycle =====

    /// Release the handle, the tap and any pending frame
    pub fn shutdown(&mut self) {
        self.release_session();
        self.session.reset();
        self.mirror.reset();
        info!("Player shut down");
    }

    // ===== Queries =====

    /// Describe what the UI should show
    pub fn view(&self) -> PlayerView {
        view::render(
            &self.catalog,
            &self.session,
            &self.volume,
            &self.mirror,
            self.visualizer.state(),
            &self.config.placeholder_image,
        )
    }

    /// Get and clear all pending events
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The selected track, if a session exists
    pub fn current_track(&self) -> Option<&Track> {
        if self.session.phase() == SessionPhase::Unloaded {
            return None;
        }
        self.catalog.get(self.session.current_index())
    }

    pub fn session(&self) -> &PlaybackSession<E::Tap> {
        &self.session
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    pub fn visualizer_state(&self) -> VisualizerState {
        self.visualizer.state()
    }

    pub fn visualizer(&self) -> &Visualizer<S> {
        &self.visualizer
    }

    /// Frame scheduler, for the host to collect due tokens
    pub fn frame_scheduler_mut(&mut self) -> &mut S {
        self.visualizer.scheduler_mut()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    // ===== Internal helpers =====

    fn load_and_play(&mut self, index: usize) -> Result<()> {
        self.load_track(index)?;
        match self.session.handle() {
            Some(handle) => self.engine.play(handle),
            None => Err(PlaybackError::NoTrackLoaded),
        }
    }

    /// Stop the frame loop, then detach the tap and unload the handle
    fn release_session(&mut self) {
        self.visualizer.stop();

        let (handle, tap) = self.session.release();
        if let Some(tap) = tap {
            self.engine.detach_tap(tap);
        }
        if let Some(handle) = handle {
            debug!(handle = handle.id(), "Releasing engine handle");
            self.engine.unload(handle);
        }
    }

    fn refresh_total(&mut self, handle: EngineHandle) {
        if let Some(duration) = self.engine.duration(handle) {
            self.mirror.total = Some(duration);
        }
    }

    fn transition(&mut self, phase: SessionPhase) {
        if self.session.phase() != phase {
            self.session.set_phase(phase);
            self.emit_state_changed(phase);
        }
    }

    fn emit_state_changed(&mut self, phase: SessionPhase) {
        self.pending_events.push(PlayerEvent::StateChanged { phase });
    }

    fn emit_track_changed(&mut self, index: usize, track: &Track) {
        self.pending_events.push(PlayerEvent::TrackChanged {
            index,
            title: track.title.clone(),
            artist: track.artist.clone(),
        });
    }

    fn emit_error(&mut self, message: String) {
        self.pending_events.push(PlayerEvent::Error { message });
    }
}

fn duration_ms(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
