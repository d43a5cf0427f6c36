//! Shared test infrastructure: a scriptable in-memory audio engine

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;
use waveline_core::{Catalog, Track};
use waveline_playback::{
    AudioEngine, EngineEvent, EngineEventKind, EngineHandle, PlaybackController, PlaybackError,
    PlayerConfig, Result,
};
use waveline_visualizer::{AnalysisTap, QueuedFrameScheduler};

/// Every command the controller issued, in order
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOp {
    Load { handle: u64, source_url: String, volume: f32 },
    Unload(u64),
    Play(u64),
    Pause(u64),
    Seek(u64, Duration),
    SetVolume(u64, f32),
    AttachTap(u64),
    DetachTap(u64),
}

#[derive(Debug, Clone)]
pub struct FakeVoice {
    pub source_url: String,
    pub playing: bool,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub volume: f32,
}

/// Tap returning a constant snapshot
#[derive(Debug)]
pub struct FakeTap {
    pub id: u64,
    bins: usize,
    level: u8,
}

impl AnalysisTap for FakeTap {
    fn frequency_bin_count(&self) -> usize {
        self.bins
    }

    fn byte_frequency_data(&mut self, out: &mut [u8]) {
        out.fill(self.level);
    }
}

/// In-memory engine that queues lifecycle events like a real one
///
/// `load` queues `Loaded` immediately unless the URL is registered as failing.
#[derive(Debug, Default)]
pub struct FakeEngine {
    next_id: u64,
    pub voices: HashMap<u64, FakeVoice>,
    pub live_taps: HashSet<u64>,
    pub ops: Vec<EngineOp>,
    events: VecDeque<EngineEvent>,
    /// URLs rejected synchronously by `load`
    pub refuse: HashSet<String>,
    /// URLs that load but then report `LoadError`
    pub broken: HashSet<String>,
    /// Per-URL durations; anything else is 180 s
    pub durations: HashMap<String, Option<Duration>>,
    /// Fail `attach_tap`
    pub no_taps: bool,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_handles(&self) -> Vec<EngineHandle> {
        let mut ids: Vec<u64> = self.voices.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter().map(EngineHandle::new).collect()
    }

    /// Engine-reported play state, without going through the trait
    pub fn playing(&self, handle: EngineHandle) -> bool {
        self.voices.get(&handle.id()).is_some_and(|v| v.playing)
    }

    pub fn voice(&self, handle: EngineHandle) -> Option<&FakeVoice> {
        self.voices.get(&handle.id())
    }

    /// Move the playhead as if audio had been rendered
    pub fn advance(&mut self, handle: EngineHandle, by: Duration) {
        if let Some(voice) = self.voices.get_mut(&handle.id()) {
            voice.position += by;
        }
    }

    /// Play out to the end and queue `End`
    pub fn finish(&mut self, handle: EngineHandle) {
        if let Some(voice) = self.voices.get_mut(&handle.id()) {
            voice.playing = false;
            if let Some(duration) = voice.duration {
                voice.position = duration;
            }
            self.events
                .push_back(EngineEvent::new(handle, EngineEventKind::End));
        }
    }

    /// Queue an arbitrary event
    pub fn inject(&mut self, event: EngineEvent) {
        self.events.push_back(event);
    }

    pub fn pending_event_count(&self) -> usize {
        self.events.len()
    }

    fn command_error(handle: EngineHandle) -> PlaybackError {
        PlaybackError::Engine(format!("unknown handle {}", handle.id()))
    }
}

impl AudioEngine for FakeEngine {
    type Tap = FakeTap;

    fn load(&mut self, source_url: &str, volume: f32) -> Result<EngineHandle> {
        if self.refuse.contains(source_url) {
            return Err(PlaybackError::EngineLoad {
                source_url: source_url.to_string(),
                message: "unsupported source".to_string(),
            });
        }

        self.next_id += 1;
        let handle = EngineHandle::new(self.next_id);
        let duration = self
            .durations
            .get(source_url)
            .copied()
            .unwrap_or(Some(Duration::from_secs(180)));

        self.voices.insert(
            handle.id(),
            FakeVoice {
                source_url: source_url.to_string(),
                playing: false,
                position: Duration::ZERO,
                duration,
                volume,
            },
        );
        self.ops.push(EngineOp::Load {
            handle: handle.id(),
            source_url: source_url.to_string(),
            volume,
        });

        let kind = if self.broken.contains(source_url) {
            EngineEventKind::LoadError("decode failed".to_string())
        } else {
            EngineEventKind::Loaded
        };
        self.events.push_back(EngineEvent::new(handle, kind));
        Ok(handle)
    }

    fn unload(&mut self, handle: EngineHandle) {
        self.voices.remove(&handle.id());
        self.ops.push(EngineOp::Unload(handle.id()));
    }

    fn play(&mut self, handle: EngineHandle) -> Result<()> {
        let voice = self
            .voices
            .get_mut(&handle.id())
            .ok_or_else(|| Self::command_error(handle))?;
        self.ops.push(EngineOp::Play(handle.id()));
        if !voice.playing {
            voice.playing = true;
            self.events
                .push_back(EngineEvent::new(handle, EngineEventKind::Play));
        }
        Ok(())
    }

    fn pause(&mut self, handle: EngineHandle) -> Result<()> {
        let voice = self
            .voices
            .get_mut(&handle.id())
            .ok_or_else(|| Self::command_error(handle))?;
        self.ops.push(EngineOp::Pause(handle.id()));
        if voice.playing {
            voice.playing = false;
            self.events
                .push_back(EngineEvent::new(handle, EngineEventKind::Pause));
        }
        Ok(())
    }

    fn seek(&mut self, handle: EngineHandle, position: Duration) -> Result<()> {
        let voice = self
            .voices
            .get_mut(&handle.id())
            .ok_or_else(|| Self::command_error(handle))?;
        voice.position = position;
        self.ops.push(EngineOp::Seek(handle.id(), position));
        Ok(())
    }

    fn duration(&self, handle: EngineHandle) -> Option<Duration> {
        self.voices.get(&handle.id()).and_then(|v| v.duration)
    }

    fn position(&self, handle: EngineHandle) -> Duration {
        self.voices
            .get(&handle.id())
            .map(|v| v.position)
            .unwrap_or_default()
    }

    fn is_playing(&self, handle: EngineHandle) -> bool {
        self.voices.get(&handle.id()).is_some_and(|v| v.playing)
    }

    fn set_volume(&mut self, handle: EngineHandle, volume: f32) -> Result<()> {
        let voice = self
            .voices
            .get_mut(&handle.id())
            .ok_or_else(|| Self::command_error(handle))?;
        voice.volume = volume;
        self.ops.push(EngineOp::SetVolume(handle.id(), volume));
        Ok(())
    }

    fn attach_tap(&mut self, fft_size: usize) -> Result<FakeTap> {
        if self.no_taps {
            return Err(waveline_visualizer::VisualizerError::InvalidFftSize(fft_size).into());
        }
        self.next_id += 1;
        let tap = FakeTap {
            id: self.next_id,
            bins: fft_size / 2,
            level: 128,
        };
        self.live_taps.insert(tap.id);
        self.ops.push(EngineOp::AttachTap(tap.id));
        Ok(tap)
    }

    fn detach_tap(&mut self, tap: FakeTap) {
        self.live_taps.remove(&tap.id);
        self.ops.push(EngineOp::DetachTap(tap.id));
    }

    fn poll_event(&mut self) -> Option<EngineEvent> {
        self.events.pop_front()
    }
}

pub type TestController = PlaybackController<FakeEngine, QueuedFrameScheduler>;

pub fn track(name: &str) -> Track {
    Track::new(
        name,
        format!("{name} Artist"),
        format!("{name}.jpg"),
        format!("{name}.mp3"),
    )
}

pub fn catalog_of(names: &[&str]) -> Catalog {
    Catalog::new(names.iter().map(|name| track(name)).collect())
}

pub fn controller() -> TestController {
    controller_with(FakeEngine::new())
}

pub fn controller_with(engine: FakeEngine) -> TestController {
    PlaybackController::new(engine, QueuedFrameScheduler::new(), PlayerConfig::default())
}

/// Controller with `names` installed and track 0 loaded (events pumped)
pub fn loaded(names: &[&str]) -> TestController {
    let mut player = controller();
    player.set_catalog(catalog_of(names)).unwrap();
    player.pump_events();
    player
}
