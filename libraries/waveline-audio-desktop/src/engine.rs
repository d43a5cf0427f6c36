//! `AudioEngine` implementation for desktop platforms
//!
//! Ties the track loader and the CPAL output together. The engine keeps the
//! authoritative per-handle state (loading, ready, failed; play intent) on
//! the caller's thread and turns loader results and end-of-buffer reports
//! into `EngineEvent`s, in the order they are observed.

use crate::error::Result;
use crate::output::{AudioCommand, AudioOutput};
use crate::source::TrackSource;
use crate::track_loader::{LoadRequest, TrackLoader};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use waveline_playback::{
    AudioEngine, EngineEvent, EngineEventKind, EngineHandle, PlaybackError,
};
use waveline_visualizer::FrequencyAnalyser;

#[derive(Debug, Clone, Copy, PartialEq)]
enum VoiceStatus {
    Loading,
    Ready { frames: usize },
    Failed,
}

#[derive(Debug)]
struct Voice {
    status: VoiceStatus,
    /// Play requested while loading; starts the voice once samples arrive
    play_pending: bool,
    /// Output is running for this voice. Only ever set once ready
    playing: bool,
    volume: f32,
}

impl Voice {
    fn loading(volume: f32) -> Self {
        Self {
            status: VoiceStatus::Loading,
            play_pending: false,
            playing: false,
            volume,
        }
    }

    /// Record a play request; true if the output should start now
    fn request_play(&mut self) -> bool {
        match self.status {
            VoiceStatus::Loading => {
                self.play_pending = true;
                false
            }
            VoiceStatus::Ready { .. } if !self.playing => {
                self.playing = true;
                true
            }
            _ => false,
        }
    }

    /// Withdraw any play request; true if audible playback stopped
    fn request_pause(&mut self) -> bool {
        self.play_pending = false;
        std::mem::take(&mut self.playing)
    }

    /// Samples arrived; true if a pending play should start
    fn mark_ready(&mut self, frames: usize) -> bool {
        self.status = VoiceStatus::Ready { frames };
        self.playing = std::mem::take(&mut self.play_pending);
        self.playing
    }

    fn mark_failed(&mut self) {
        self.status = VoiceStatus::Failed;
        self.play_pending = false;
        self.playing = false;
    }

    /// Output reached the end; true if the voice was playing
    fn mark_ended(&mut self) -> bool {
        std::mem::take(&mut self.playing)
    }
}

/// Desktop audio engine
///
/// Plays one source at a time; the newest loaded handle owns the output.
pub struct DesktopEngine {
    output: AudioOutput,
    loader: TrackLoader,
    voices: HashMap<EngineHandle, Voice>,
    /// Handle whose samples are in the output buffer
    active: Option<EngineHandle>,
    next_id: u64,
    events: VecDeque<EngineEvent>,
}

impl DesktopEngine {
    /// Open the default output device and start the loader thread
    pub fn new() -> Result<Self> {
        let output = AudioOutput::open()?;
        let loader = TrackLoader::new()?;

        Ok(Self {
            output,
            loader,
            voices: HashMap::new(),
            active: None,
            next_id: 0,
            events: VecDeque::new(),
        })
    }

    /// Device sample rate
    pub fn sample_rate(&self) -> u32 {
        self.output.sample_rate()
    }

    fn voice_mut(&mut self, handle: EngineHandle) -> std::result::Result<&mut Voice, PlaybackError> {
        self.voices
            .get_mut(&handle)
            .ok_or_else(|| PlaybackError::Engine(format!("Unknown handle {}", handle.id())))
    }

    fn is_active(&self, handle: EngineHandle) -> bool {
        self.active == Some(handle)
    }

    fn push_event(&mut self, handle: EngineHandle, kind: EngineEventKind) {
        self.events.push_back(EngineEvent::new(handle, kind));
    }

    /// Fold loader results and end reports into the event queue
    fn collect(&mut self) {
        while let Some(result) = self.loader.poll_ready() {
            let handle = EngineHandle::new(result.handle);
            let Some(voice) = self.voices.get_mut(&handle) else {
                debug!(handle = result.handle, "Dropping load result for released handle");
                continue;
            };

            match result.outcome {
                Ok(track) => {
                    let play = voice.mark_ready(track.frames());
                    let volume = voice.volume;

                    let installed = self
                        .output
                        .send(AudioCommand::Load {
                            generation: handle.id(),
                            samples: Arc::new(track.samples),
                        })
                        .and_then(|()| self.output.send(AudioCommand::SetVolume(volume)));
                    if let Err(e) = installed {
                        self.fail(handle, e.to_string());
                        continue;
                    }

                    self.active = Some(handle);
                    self.push_event(handle, EngineEventKind::Loaded);

                    if play {
                        match self.output.send(AudioCommand::Play) {
                            Ok(()) => self.push_event(handle, EngineEventKind::Play),
                            Err(e) => self.fail(handle, e.to_string()),
                        }
                    }
                }
                Err(message) => self.fail(handle, message),
            }
        }

        if let Some(generation) = self.output.take_finished() {
            let handle = EngineHandle::new(generation);
            if self.is_active(handle) {
                if self.voices.get_mut(&handle).is_some_and(Voice::mark_ended) {
                    self.push_event(handle, EngineEventKind::End);
                }
            }
        }
    }

    fn fail(&mut self, handle: EngineHandle, message: String) {
        if let Some(voice) = self.voices.get_mut(&handle) {
            voice.mark_failed();
        }
        self.push_event(handle, EngineEventKind::LoadError(message));
    }
}

impl AudioEngine for DesktopEngine {
    type Tap = FrequencyAnalyser;

    fn load(&mut self, source_url: &str, volume: f32) -> waveline_playback::Result<EngineHandle> {
        let source = TrackSource::parse(source_url).map_err(|e| PlaybackError::EngineLoad {
            source_url: source_url.to_string(),
            message: e.to_string(),
        })?;

        self.next_id += 1;
        let handle = EngineHandle::new(self.next_id);

        let queued = self.loader.request_load(LoadRequest {
            handle: handle.id(),
            source,
            target_sample_rate: self.output.sample_rate(),
        });
        if !queued {
            return Err(PlaybackError::EngineLoad {
                source_url: source_url.to_string(),
                message: "Track loader is unavailable".to_string(),
            });
        }

        self.voices.insert(handle, Voice::loading(volume));
        debug!(handle = handle.id(), source_url, "Load requested");
        Ok(handle)
    }

    fn unload(&mut self, handle: EngineHandle) {
        if self.voices.remove(&handle).is_none() {
            return;
        }
        if self.is_active(handle) {
            self.active = None;
            if let Err(e) = self.output.send(AudioCommand::Stop) {
                warn!("Failed to stop output: {}", e);
            }
        }
        self.events.retain(|event| event.handle != handle);
    }

    fn play(&mut self, handle: EngineHandle) -> waveline_playback::Result<()> {
        let active = self.is_active(handle);
        let voice = self.voice_mut(handle)?;
        if !voice.request_play() {
            return Ok(());
        }
        let VoiceStatus::Ready { frames } = voice.status else {
            return Ok(());
        };
        if active {
            // Playing an ended track starts it over
            if self.output.position_frames() >= frames {
                self.output.send(AudioCommand::Seek(0))?;
            }
            self.output.send(AudioCommand::Play)?;
            self.push_event(handle, EngineEventKind::Play);
        }
        Ok(())
    }

    fn pause(&mut self, handle: EngineHandle) -> waveline_playback::Result<()> {
        let active = self.is_active(handle);
        if !self.voice_mut(handle)?.request_pause() {
            return Ok(());
        }

        if active {
            self.output.send(AudioCommand::Pause)?;
        }
        self.push_event(handle, EngineEventKind::Pause);
        Ok(())
    }

    fn seek(&mut self, handle: EngineHandle, position: Duration) -> waveline_playback::Result<()> {
        let VoiceStatus::Ready { frames } = self.voice_mut(handle)?.status else {
            return Ok(());
        };
        if !self.is_active(handle) {
            return Ok(());
        }

        let frame = (position.as_secs_f64() * f64::from(self.output.sample_rate())) as usize;
        self.output.send(AudioCommand::Seek(frame.min(frames)))?;
        Ok(())
    }

    fn duration(&self, handle: EngineHandle) -> Option<Duration> {
        match self.voices.get(&handle)?.status {
            VoiceStatus::Ready { frames } => Some(Duration::from_secs_f64(
                frames as f64 / f64::from(self.output.sample_rate()),
            )),
            _ => None,
        }
    }

    fn position(&self, handle: EngineHandle) -> Duration {
        if !self.is_active(handle) {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(
            self.output.position_frames() as f64 / f64::from(self.output.sample_rate()),
        )
    }

    fn is_playing(&self, handle: EngineHandle) -> bool {
        self.voices.get(&handle).is_some_and(|voice| voice.playing)
    }

    fn set_volume(&mut self, handle: EngineHandle, volume: f32) -> waveline_playback::Result<()> {
        let active = self.is_active(handle);
        self.voice_mut(handle)?.volume = volume;
        if active {
            self.output.send(AudioCommand::SetVolume(volume))?;
        }
        Ok(())
    }

    fn attach_tap(&mut self, fft_size: usize) -> waveline_playback::Result<FrequencyAnalyser> {
        let analyser = FrequencyAnalyser::new(fft_size)?;
        self.output
            .send(AudioCommand::SetTap(Some(analyser.input())))?;
        Ok(analyser)
    }

    fn detach_tap(&mut self, tap: FrequencyAnalyser) {
        if let Err(e) = self.output.send(AudioCommand::SetTap(None)) {
            warn!("Failed to detach analysis tap: {}", e);
        }
        drop(tap);
    }

    fn poll_event(&mut self) -> Option<EngineEvent> {
        if self.events.is_empty() {
            self.collect();
        }
        self.events.pop_front()
    }
}

impl std::fmt::Debug for DesktopEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesktopEngine")
            .field("sample_rate", &self.output.sample_rate())
            .field("voices", &self.voices.len())
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}
