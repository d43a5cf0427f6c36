//! Frame loop tests for the visualizer
//!
//! Drive the loop with a queued scheduler, a fixed-snapshot tap and a
//! surface that records every draw call.

use proptest::prelude::*;
use waveline_visualizer::{
    bar_layout, AnalysisTap, Color, DrawSurface, FrameOutcome, FrameScheduler,
    FrequencyAnalyser, PixelSurface, QueuedFrameScheduler, Visualizer, VisualizerConfig,
};

// ===== Test Helpers =====

#[derive(Debug, Clone, PartialEq)]
enum DrawCall {
    Clear,
    Fill { x: f32, y: f32, w: f32, h: f32 },
}

struct RecordingSurface {
    width: f32,
    height: f32,
    calls: Vec<DrawCall>,
}

impl RecordingSurface {
    fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
        }
    }

    fn fills(&self) -> Vec<&DrawCall> {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Fill { .. }))
            .collect()
    }
}

impl DrawSurface for RecordingSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn clear_rect(&mut self, _x: f32, _y: f32, _w: f32, _h: f32) {
        self.calls.push(DrawCall::Clear);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, _color: Color) {
        self.calls.push(DrawCall::Fill { x, y, w, h });
    }
}

/// Tap returning the same snapshot every frame
struct FixedTap {
    bins: Vec<u8>,
    reads: usize,
}

impl FixedTap {
    fn new(bins: Vec<u8>) -> Self {
        Self { bins, reads: 0 }
    }
}

impl AnalysisTap for FixedTap {
    fn frequency_bin_count(&self) -> usize {
        self.bins.len()
    }

    fn byte_frequency_data(&mut self, out: &mut [u8]) {
        self.reads += 1;
        for (slot, value) in out.iter_mut().zip(&self.bins) {
            *slot = *value;
        }
    }
}

fn visualizer() -> Visualizer<QueuedFrameScheduler> {
    Visualizer::new(VisualizerConfig::default(), QueuedFrameScheduler::new())
}

/// Deliver every due token once
fn run_frame(
    vis: &mut Visualizer<QueuedFrameScheduler>,
    tap: &mut FixedTap,
    surface: &mut RecordingSurface,
) -> Vec<FrameOutcome> {
    let due = vis.scheduler_mut().take_due();
    due.into_iter()
        .map(|token| vis.on_frame(token, Some(&mut *tap), &mut *surface))
        .collect()
}

// ===== Frame loop =====

#[test]
fn frame_draws_one_bar_per_bin_and_reschedules() {
    let mut vis = visualizer();
    let mut tap = FixedTap::new(vec![200; 1024]);
    let mut surface = RecordingSurface::new(800.0, 200.0);

    vis.start();
    let outcomes = run_frame(&mut vis, &mut tap, &mut surface);

    assert_eq!(outcomes, vec![FrameOutcome::Drawn { bars: 1024 }]);
    assert_eq!(surface.calls[0], DrawCall::Clear);
    assert_eq!(surface.fills().len(), 1024);
    assert!(vis.is_running());
    assert!(vis.pending_frame().is_some(), "next frame scheduled");
    assert_eq!(vis.scheduler().pending_count(), 1);
}

#[test]
fn stop_before_first_frame_draws_nothing() {
    let mut vis = visualizer();
    let mut tap = FixedTap::new(vec![255; 1024]);
    let mut surface = RecordingSurface::new(800.0, 200.0);

    vis.start();
    vis.stop();
    let outcomes = run_frame(&mut vis, &mut tap, &mut surface);

    assert!(outcomes.is_empty());
    assert!(surface.calls.is_empty());
    assert_eq!(tap.reads, 0);
    assert!(!vis.is_running());
}

#[test]
fn stop_is_idempotent() {
    let mut vis = visualizer();

    vis.stop();
    vis.stop();
    assert!(!vis.is_running());

    vis.start();
    vis.stop();
    vis.stop();
    assert_eq!(vis.scheduler().pending_count(), 0);
}

#[test]
fn double_start_keeps_single_loop() {
    let mut vis = visualizer();

    vis.start();
    let first = vis.pending_frame().unwrap();
    vis.start();

    assert_eq!(vis.scheduler().pending_count(), 1);
    assert!(!vis.scheduler().is_pending(first));
}

#[test]
fn stale_token_is_ignored() {
    let mut vis = visualizer();
    let mut tap = FixedTap::new(vec![10; 1024]);
    let mut surface = RecordingSurface::new(800.0, 200.0);

    vis.start();
    let stale = vis.pending_frame().unwrap();
    vis.start();

    let outcome = vis.on_frame(stale, Some(&mut tap), &mut surface);

    assert_eq!(outcome, FrameOutcome::Stale);
    assert!(surface.calls.is_empty());
}

#[test]
fn frame_without_tap_is_a_no_op() {
    let mut vis = visualizer();
    let mut surface = RecordingSurface::new(800.0, 200.0);

    vis.start();
    let token = vis.scheduler_mut().take_due()[0];
    let outcome = vis.on_frame(token, None, &mut surface);

    assert_eq!(outcome, FrameOutcome::NoTap);
    assert!(surface.calls.is_empty());
    assert!(!vis.is_running());
    assert_eq!(vis.scheduler().pending_count(), 0);
}

#[test]
fn frames_keep_flowing_until_stopped() {
    let mut vis = visualizer();
    let mut tap = FixedTap::new(vec![64; 1024]);
    let mut surface = RecordingSurface::new(800.0, 200.0);

    vis.start();
    for _ in 0..5 {
        run_frame(&mut vis, &mut tap, &mut surface);
    }
    assert_eq!(vis.frames_drawn(), 5);

    vis.stop();
    run_frame(&mut vis, &mut tap, &mut surface);
    assert_eq!(vis.frames_drawn(), 5);
}

#[test]
fn paints_bars_on_pixel_surface() {
    let mut vis = visualizer();
    let mut tap = FixedTap::new(vec![255; 1024]);
    let mut surface = PixelSurface::new(800, 200);

    vis.start();
    let token = vis.scheduler_mut().take_due()[0];
    vis.on_frame(token, Some(&mut tap), &mut surface);

    // Full-magnitude bars are 127.5 tall, starting at y = 72.5 (rounds to 73)
    assert_eq!(surface.column_fill(0), 127);
    assert_eq!(surface.pixel(0, 199), Some(Color::rgb(0xf9, 0xb5, 0xff)));
    assert_eq!(surface.pixel(0, 0), Some(Color::TRANSPARENT));
}

#[test]
fn real_analyser_feeds_frame() {
    let mut vis = visualizer();
    let mut analyser = FrequencyAnalyser::new(2048).unwrap();
    let mut surface = RecordingSurface::new(800.0, 200.0);

    vis.start();
    let token = vis.scheduler_mut().take_due()[0];
    let outcome = vis.on_frame(token, Some(&mut analyser), &mut surface);

    assert_eq!(outcome, FrameOutcome::Drawn { bars: 1024 });
    assert!(vis.magnitudes().iter().all(|&m| m == 0));
}

#[test]
fn scheduler_trait_object_cancel() {
    let mut scheduler = QueuedFrameScheduler::new();
    let dynamic: &mut dyn FrameScheduler = &mut scheduler;
    let token = dynamic.request_frame();
    dynamic.cancel_frame(token);
    assert_eq!(scheduler.pending_count(), 0);
}

// ===== Properties =====

proptest! {
    /// Bar count equals bin count; heights stay within [0, 127.5]
    #[test]
    fn bar_heights_are_bounded(
        magnitudes in prop::collection::vec(any::<u8>(), 1..2048),
        width in 1.0f32..4000.0,
        height in 1.0f32..1000.0,
    ) {
        let bars = bar_layout(&magnitudes, width, height, 10.0, 4.0);

        prop_assert_eq!(bars.len(), magnitudes.len());
        for bar in &bars {
            prop_assert!(bar.height >= 0.0);
            prop_assert!(bar.height <= 127.5);
            prop_assert!((bar.y + bar.height - height).abs() < 1e-3);
        }
    }
}
