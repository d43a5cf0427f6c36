//! FFT frequency analyser
//!
//! The audio thread pushes mixed output into a `TapInput`; the UI thread
//! snapshots the latest `fft_size` samples through `FrequencyAnalyser`.
//!
//! Snapshot pipeline:
//! 1. Blackman window over the most recent `fft_size` mono samples
//! 2. Forward FFT, magnitude `|X[k]| / N` for the lower half of the bins
//! 3. Temporal smoothing: `s = τ·s_prev + (1-τ)·m`
//! 4. Decibels, mapped linearly from `[min_db, max_db]` onto `0..=255`

use crate::{
    error::{Result, VisualizerError},
    tap::AnalysisTap,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::{Arc, Mutex, PoisonError};

/// Default transform size (1024 bins)
pub const DEFAULT_FFT_SIZE: usize = 2048;

/// Default smoothing constant between snapshots
pub const DEFAULT_SMOOTHING: f32 = 0.8;

/// Level mapped to byte 0
pub const DEFAULT_MIN_DECIBELS: f32 = -100.0;

/// Level mapped to byte 255
pub const DEFAULT_MAX_DECIBELS: f32 = -30.0;

const MIN_FFT_SIZE: usize = 32;
const MAX_FFT_SIZE: usize = 32768;

/// Circular buffer of the most recent mono samples
#[derive(Debug)]
struct SampleRing {
    samples: Vec<f32>,
    write: usize,
}

impl SampleRing {
    fn new(size: usize) -> Self {
        Self {
            samples: vec![0.0; size],
            write: 0,
        }
    }

    fn push(&mut self, sample: f32) {
        self.samples[self.write] = sample;
        self.write = (self.write + 1) % self.samples.len();
    }

    /// Oldest-to-newest iteration
    fn chronological(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples[self.write..]
            .iter()
            .chain(&self.samples[..self.write])
            .copied()
    }
}

/// Audio-thread side of an analysis tap
///
/// Cheap to clone. Writes never block: if the analyser is mid-snapshot the
/// block is dropped from analysis (playback is unaffected).
#[derive(Debug, Clone)]
pub struct TapInput {
    ring: Arc<Mutex<SampleRing>>,
}

impl TapInput {
    /// Feed interleaved frames, downmixed to mono
    pub fn write_interleaved(&self, samples: &[f32], channels: usize) {
        if channels == 0 {
            return;
        }

        let Ok(mut ring) = self.ring.try_lock() else {
            return;
        };

        for frame in samples.chunks_exact(channels) {
            let mono = frame.iter().sum::<f32>() / channels as f32;
            ring.push(if mono.is_finite() { mono } else { 0.0 });
        }
    }
}

/// FFT-backed analysis tap
pub struct FrequencyAnalyser {
    fft_size: usize,
    ring: Arc<Mutex<SampleRing>>,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    smoothing: f32,
    min_decibels: f32,
    max_decibels: f32,
}

impl FrequencyAnalyser {
    /// Create an analyser for a power-of-two transform size in `32..=32768`
    pub fn new(fft_size: usize) -> Result<Self> {
        if !fft_size.is_power_of_two() || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&fft_size) {
            return Err(VisualizerError::InvalidFftSize(fft_size));
        }

        let fft = FftPlanner::new().plan_fft_forward(fft_size);

        Ok(Self {
            fft_size,
            ring: Arc::new(Mutex::new(SampleRing::new(fft_size))),
            fft,
            window: blackman_window(fft_size),
            scratch: vec![Complex::new(0.0, 0.0); fft_size],
            smoothed: vec![0.0; fft_size / 2],
            smoothing: DEFAULT_SMOOTHING,
            min_decibels: DEFAULT_MIN_DECIBELS,
            max_decibels: DEFAULT_MAX_DECIBELS,
        })
    }

    /// Handle for the audio thread
    pub fn input(&self) -> TapInput {
        TapInput {
            ring: Arc::clone(&self.ring),
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    pub fn set_smoothing(&mut self, smoothing: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&smoothing) {
            return Err(VisualizerError::InvalidSmoothing(smoothing));
        }
        self.smoothing = smoothing;
        Ok(())
    }

    pub fn set_decibel_range(&mut self, min: f32, max: f32) -> Result<()> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(VisualizerError::InvalidDecibelRange { min, max });
        }
        self.min_decibels = min;
        self.max_decibels = max;
        Ok(())
    }

    /// Current magnitudes in decibels (`-inf` for silent bins)
    pub fn float_frequency_data(&mut self, out: &mut [f32]) {
        self.analyse();
        for (slot, &magnitude) in out.iter_mut().zip(&self.smoothed) {
            *slot = linear_to_db(magnitude);
        }
    }

    /// Run one snapshot and update the smoothed magnitudes
    fn analyse(&mut self) {
        {
            let ring = self.ring.lock().unwrap_or_else(PoisonError::into_inner);
            for ((slot, sample), w) in self
                .scratch
                .iter_mut()
                .zip(ring.chronological())
                .zip(&self.window)
            {
                *slot = Complex::new(sample * w, 0.0);
            }
        }

        self.fft.process(&mut self.scratch);

        let scale = 1.0 / self.fft_size as f32;
        let tau = self.smoothing;
        for (smoothed, bin) in self.smoothed.iter_mut().zip(&self.scratch) {
            let magnitude = bin.norm() * scale;
            let next = tau * *smoothed + (1.0 - tau) * magnitude;
            *smoothed = if next.is_finite() { next } else { 0.0 };
        }
    }
}

impl AnalysisTap for FrequencyAnalyser {
    fn frequency_bin_count(&self) -> usize {
        self.fft_size / 2
    }

    fn byte_frequency_data(&mut self, out: &mut [u8]) {
        self.analyse();

        let range = self.max_decibels - self.min_decibels;
        for (slot, &magnitude) in out.iter_mut().zip(&self.smoothed) {
            let db = linear_to_db(magnitude);
            let scaled = 255.0 / range * (db - self.min_decibels);
            *slot = if scaled.is_nan() {
                0
            } else {
                scaled.floor().clamp(0.0, 255.0) as u8
            };
        }
    }
}

impl std::fmt::Debug for FrequencyAnalyser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrequencyAnalyser")
            .field("fft_size", &self.fft_size)
            .field("smoothing", &self.smoothing)
            .field("min_decibels", &self.min_decibels)
            .field("max_decibels", &self.max_decibels)
            .finish_non_exhaustive()
    }
}

/// Blackman window coefficients
fn blackman_window(size: usize) -> Vec<f32> {
    const A0: f32 = 0.42;
    const A1: f32 = 0.5;
    const A2: f32 = 0.08;

    (0..size)
        .map(|i| {
            let phase = i as f32 / size as f32;
            A0 - A1 * (2.0 * PI * phase).cos() + A2 * (4.0 * PI * phase).cos()
        })
        .collect()
}

fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}
