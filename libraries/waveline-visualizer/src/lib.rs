//! Waveline Player - Frequency Visualizer
//!
//! Per-frame frequency-bar rendering driven by an analysis tap.
//!
//! This crate provides:
//! - `FrameToken` / `FrameScheduler`: cancellable per-frame callbacks
//! - `AnalysisTap`: frequency-magnitude snapshots of the playing signal
//! - `FrequencyAnalyser`: FFT-backed tap fed from the audio thread
//! - `DrawSurface`: the 2D target bars are painted on
//! - `Visualizer`: the start/stop frame loop itself
//!
//! # Frame loop
//!
//! The visualizer never owns a timer. It asks a `FrameScheduler` for a token,
//! and the host hands that token back when the display is ready for the next
//! frame. Every frame consumes its token and requests a new one, so stopping
//! is just cancelling the one pending token.
//!
//! ```rust
//! use waveline_visualizer::{
//!     FrequencyAnalyser, PixelSurface, QueuedFrameScheduler, Visualizer, VisualizerConfig,
//! };
//!
//! let config = VisualizerConfig::default();
//! let mut tap = FrequencyAnalyser::new(config.fft_size).unwrap();
//! let mut surface = PixelSurface::new(800, 200);
//! let mut visualizer = Visualizer::new(config, QueuedFrameScheduler::new());
//!
//! visualizer.start();
//! for token in visualizer.scheduler_mut().take_due() {
//!     visualizer.on_frame(token, Some(&mut tap), &mut surface);
//! }
//! visualizer.stop();
//! ```

mod analyser;
mod error;
mod frame;
mod surface;
mod tap;
mod visualizer;

pub use analyser::{
    FrequencyAnalyser, TapInput, DEFAULT_FFT_SIZE, DEFAULT_MAX_DECIBELS, DEFAULT_MIN_DECIBELS,
    DEFAULT_SMOOTHING,
};
pub use error::{Result, VisualizerError};
pub use frame::{FrameScheduler, FrameToken, QueuedFrameScheduler};
pub use surface::{Color, DrawSurface, PixelSurface};
pub use tap::AnalysisTap;
pub use visualizer::{bar_layout, Bar, FrameOutcome, Visualizer, VisualizerConfig, VisualizerState};
