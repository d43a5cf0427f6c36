/// CPAL output with a dedicated audio thread
use crate::error::{AudioError, Result};
use crate::source::OUTPUT_CHANNELS;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};
use waveline_playback::Volume;
use waveline_visualizer::TapInput;

/// Commands sent to the audio thread
pub(crate) enum AudioCommand {
    /// Replace the playing buffer; `generation` identifies it in end reports
    Load {
        generation: u64,
        samples: Arc<Vec<f32>>,
    },
    /// Start or resume playback
    Play,
    /// Pause playback (buffer retained)
    Pause,
    /// Move the playhead to a frame index
    Seek(usize),
    /// Drop the buffer
    Stop,
    /// Set volume (0.0 - 1.0)
    SetVolume(f32),
    /// Route the mixed output into an analysis tap
    SetTap(Option<TapInput>),
    /// Shutdown the audio thread
    Shutdown,
}

/// Buffer and playhead, always read and replaced together
#[derive(Debug, Default)]
struct Transport {
    /// Interleaved stereo samples at the device rate
    samples: Arc<Vec<f32>>,
    /// Identifies `samples` in end reports (0 = nothing loaded)
    generation: u64,
    /// Playhead (in samples, not frames)
    position: usize,
    playing: bool,
}

/// Shared audio state between the audio thread and the device callback
struct AudioState {
    transport: Mutex<Transport>,
    /// Generation whose buffer last played to the end (0 = none)
    finished: AtomicU64,
    volume: Mutex<Volume>,
    tap: Mutex<Option<TapInput>>,
}

impl AudioState {
    fn new() -> Self {
        Self {
            transport: Mutex::new(Transport::default()),
            finished: AtomicU64::new(0),
            volume: Mutex::new(Volume::default()),
            tap: Mutex::new(None),
        }
    }

    fn transport(&self) -> std::sync::MutexGuard<'_, Transport> {
        self.transport.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply one command; returns false on shutdown
    fn apply(&self, command: AudioCommand) -> bool {
        match command {
            AudioCommand::Load {
                generation,
                samples,
            } => {
                *self.transport() = Transport {
                    samples,
                    generation,
                    position: 0,
                    playing: false,
                };
            }
            AudioCommand::Play => self.transport().playing = true,
            AudioCommand::Pause => self.transport().playing = false,
            AudioCommand::Seek(frame) => {
                let mut transport = self.transport();
                transport.position = (frame * OUTPUT_CHANNELS).min(transport.samples.len());
            }
            AudioCommand::Stop => *self.transport() = Transport::default(),
            AudioCommand::SetVolume(level) => {
                self.volume
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .set_level(level);
            }
            AudioCommand::SetTap(tap) => {
                *self.tap.lock().unwrap_or_else(PoisonError::into_inner) = tap;
            }
            AudioCommand::Shutdown => return false,
        }
        true
    }
}

/// Handle to the output device
///
/// **Architecture**: the CPAL `Stream` is not `Send` on every platform, so a
/// dedicated audio thread builds and owns it. Everything else talks to that
/// thread over a channel; the device callback reads the shared `AudioState`.
pub struct AudioOutput {
    command_tx: Sender<AudioCommand>,
    sample_rate: u32,
    state: Arc<AudioState>,
    _audio_thread: Option<JoinHandle<()>>,
}

impl AudioOutput {
    /// Open the default output device
    ///
    /// Fails with `DeviceNotFound` on headless machines.
    pub fn open() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::DeviceNotFound)?;

        let config = device.default_output_config()?;
        let sample_rate = config.sample_rate();
        let config = config.config();

        Self::with_device_and_config(device, config, sample_rate)
    }

    fn with_device_and_config(
        device: Device,
        config: StreamConfig,
        sample_rate: u32,
    ) -> Result<Self> {
        let state = Arc::new(AudioState::new());
        let (command_tx, command_rx) = bounded::<AudioCommand>(32);
        let (ready_tx, ready_rx) = bounded::<std::result::Result<(), String>>(1);

        let state_clone = Arc::clone(&state);
        let audio_thread = thread::Builder::new()
            .name("audio-output".to_string())
            .spawn(move || {
                Self::audio_thread_run(&device, &config, &state_clone, &command_rx, &ready_tx);
            })
            .map_err(|source| AudioError::ThreadSpawn {
                name: "audio-output",
                source,
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(message)) => return Err(AudioError::StreamBuildError(message)),
            Err(_) => return Err(AudioError::Disconnected),
        }

        info!(sample_rate, "Audio output ready");
        Ok(Self {
            command_tx,
            sample_rate,
            state,
            _audio_thread: Some(audio_thread),
        })
    }

    /// Device sample rate; decoded tracks are resampled to this
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub(crate) fn send(&self, command: AudioCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| AudioError::Disconnected)
    }

    /// Playhead in frames
    pub fn position_frames(&self) -> usize {
        self.state.transport().position / OUTPUT_CHANNELS
    }

    /// Take the generation that last reached its end, if any
    pub fn take_finished(&self) -> Option<u64> {
        match self.state.finished.swap(0, Ordering::AcqRel) {
            0 => None,
            generation => Some(generation),
        }
    }

    /// Audio thread main loop
    ///
    /// Builds the stream once, then applies commands until shutdown.
    fn audio_thread_run(
        device: &Device,
        config: &StreamConfig,
        state: &Arc<AudioState>,
        command_rx: &Receiver<AudioCommand>,
        ready_tx: &Sender<std::result::Result<(), String>>,
    ) {
        let channels = usize::from(config.channels);
        let state_for_callback = Arc::clone(state);
        let mut scratch = Vec::with_capacity(4096);

        let stream: Stream = match device.build_output_stream(
            config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                Self::audio_callback(data, channels, &state_for_callback, &mut scratch);
            },
            |err| error!("Audio stream error: {}", err),
            None,
        ) {
            Ok(stream) => stream,
            Err(e) => {
                let _ = ready_tx.send(Err(e.to_string()));
                return;
            }
        };
        if let Err(e) = stream.play() {
            let _ = ready_tx.send(Err(e.to_string()));
            return;
        }
        let _ = ready_tx.send(Ok(()));

        while let Ok(command) = command_rx.recv() {
            if !state.apply(command) {
                break;
            }
        }

        debug!("Audio thread exiting");
        drop(stream);
    }

    /// Device callback (runs in the real-time audio thread)
    fn audio_callback(
        output: &mut [f32],
        channels: usize,
        state: &AudioState,
        scratch: &mut Vec<f32>,
    ) {
        if channels == 0 {
            output.fill(0.0);
            return;
        }
        let frames = output.len() / channels;

        // Copy the next stereo frames and advance the playhead in one step, so
        // a concurrent Load or Seek lands either before or after this period
        scratch.clear();
        {
            let mut transport = state.transport();
            if !transport.playing {
                drop(transport);
                output.fill(0.0);
                return;
            }

            let len = transport.samples.len();
            let start = transport.position.min(len);
            let end = (start + frames * OUTPUT_CHANNELS).min(len);
            scratch.extend_from_slice(&transport.samples[start..end]);
            transport.position = end;

            if end >= len {
                transport.playing = false;
                state.finished.store(transport.generation, Ordering::Release);
            }
        }
        scratch.resize(frames * OUTPUT_CHANNELS, 0.0);

        let volume = state
            .volume
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        volume.apply(scratch);

        for (out_frame, stereo) in output
            .chunks_mut(channels)
            .zip(scratch.chunks_exact(OUTPUT_CHANNELS))
        {
            write_frame(out_frame, stereo[0], stereo[1]);
        }

        // The tap sees exactly what goes to the device
        if let Ok(tap) = state.tap.try_lock() {
            if let Some(tap) = tap.as_ref() {
                tap.write_interleaved(scratch, OUTPUT_CHANNELS);
            }
        }
    }
}

/// Map one stereo frame onto a device frame of any width
fn write_frame(frame: &mut [f32], left: f32, right: f32) {
    match frame {
        [] => {}
        [mono] => *mono = (left + right) * 0.5,
        [l, r, rest @ ..] => {
            *l = left;
            *r = right;
            rest.fill(0.0);
        }
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        let _ = self.command_tx.send(AudioCommand::Shutdown);
    }
}
