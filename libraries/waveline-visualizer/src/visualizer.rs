//! Frequency-bar visualizer
//!
//! Cooperative frame loop: each frame clears the surface, pulls a magnitude
//! snapshot from the tap, paints one bar per bin, and schedules the next
//! frame. At most one frame is ever pending.

use crate::{
    analyser::DEFAULT_FFT_SIZE,
    frame::{FrameScheduler, FrameToken},
    surface::{Color, DrawSurface},
    tap::AnalysisTap,
};
use serde::{Deserialize, Serialize};

/// Visualizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizerConfig {
    /// Transform size of the analysis tap (default: 2048)
    pub fft_size: usize,

    /// Bar width multiplier over `surface_width / bin_count` (default: 10)
    pub bar_density: f32,

    /// Gap between bars in pixels (default: 4)
    pub bar_spacing: f32,

    /// Bar colour (default: #f9b5ff)
    pub color: Color,
}

impl VisualizerConfig {
    /// Bars per frame
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            fft_size: DEFAULT_FFT_SIZE,
            bar_density: 10.0,
            bar_spacing: 4.0,
            color: Color::rgb(0xf9, 0xb5, 0xff),
        }
    }
}

/// One bar, bottom-anchored on the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Lay out one bar per magnitude
///
/// Height is `magnitude / 2`, width is `surface_width / count * density`,
/// bars advance by `width + spacing`. Bars past the right edge are still
/// produced; the surface clips them.
pub fn bar_layout(
    magnitudes: &[u8],
    surface_width: f32,
    surface_height: f32,
    density: f32,
    spacing: f32,
) -> Vec<Bar> {
    if magnitudes.is_empty() {
        return Vec::new();
    }

    let width = surface_width / magnitudes.len() as f32 * density;
    let mut x = 0.0;

    magnitudes
        .iter()
        .map(|&magnitude| {
            let height = f32::from(magnitude) / 2.0;
            let bar = Bar {
                x,
                y: surface_height - height,
                width,
                height,
            };
            x += width + spacing;
            bar
        })
        .collect()
}

/// Loop state: running flag plus the single pending frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualizerState {
    pub running: bool,
    pub frame: Option<FrameToken>,
}

/// What a delivered frame token did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Surface repainted with this many bars; next frame scheduled
    Drawn { bars: usize },

    /// Token was stale or the loop is stopped; nothing drawn
    Stale,

    /// No analysis tap bound; nothing drawn and the loop ended
    NoTap,
}

/// Frequency-bar frame loop
pub struct Visualizer<S: FrameScheduler> {
    config: VisualizerConfig,
    scheduler: S,
    state: VisualizerState,
    magnitudes: Vec<u8>,
    frames_drawn: u64,
}

impl<S: FrameScheduler> Visualizer<S> {
    pub fn new(config: VisualizerConfig, scheduler: S) -> Self {
        let magnitudes = vec![0; config.bin_count()];
        Self {
            config,
            scheduler,
            state: VisualizerState::default(),
            magnitudes,
            frames_drawn: 0,
        }
    }

    /// Begin the frame loop
    ///
    /// Any previously pending frame is cancelled first, so calling `start`
    /// twice never yields two loops.
    pub fn start(&mut self) {
        if let Some(token) = self.state.frame.take() {
            self.scheduler.cancel_frame(token);
        }
        self.state.frame = Some(self.scheduler.request_frame());
        self.state.running = true;
        tracing::trace!("Visualizer started");
    }

    /// Cancel the pending frame (idempotent)
    pub fn stop(&mut self) {
        if let Some(token) = self.state.frame.take() {
            self.scheduler.cancel_frame(token);
        }
        if self.state.running {
            tracing::trace!("Visualizer stopped after {} frames", self.frames_drawn);
        }
        self.state.running = false;
    }

    /// Handle a frame token delivered by the host
    pub fn on_frame(
        &mut self,
        token: FrameToken,
        tap: Option<&mut dyn AnalysisTap>,
        surface: &mut dyn DrawSurface,
    ) -> FrameOutcome {
        if !self.state.running || self.state.frame != Some(token) {
            return FrameOutcome::Stale;
        }
        self.state.frame = None;

        let Some(tap) = tap else {
            tracing::debug!("Visualizer frame without an analysis tap; stopping loop");
            self.state.running = false;
            return FrameOutcome::NoTap;
        };

        let (width, height) = (surface.width(), surface.height());
        surface.clear_rect(0.0, 0.0, width, height);

        self.magnitudes.resize(tap.frequency_bin_count(), 0);
        tap.byte_frequency_data(&mut self.magnitudes);

        let bars = bar_layout(
            &self.magnitudes,
            width,
            height,
            self.config.bar_density,
            self.config.bar_spacing,
        );
        for bar in &bars {
            surface.fill_rect(bar.x, bar.y, bar.width, bar.height, self.config.color);
        }

        self.frames_drawn += 1;
        self.state.frame = Some(self.scheduler.request_frame());

        FrameOutcome::Drawn { bars: bars.len() }
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn state(&self) -> VisualizerState {
        self.state
    }

    pub fn pending_frame(&self) -> Option<FrameToken> {
        self.state.frame
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    /// Magnitudes from the most recent drawn frame
    pub fn magnitudes(&self) -> &[u8] {
        &self.magnitudes
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}
