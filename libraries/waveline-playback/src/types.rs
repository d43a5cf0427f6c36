//! Core types for playback control

use crate::volume::DEFAULT_VOLUME;
use serde::{Deserialize, Serialize};
use waveline_visualizer::VisualizerConfig;

/// Default placeholder artwork location
pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "placeholder.svg";

/// Icon shown on the play/pause button
///
/// `Play` is shown while paused or stopped, `Pause` while playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayIcon {
    #[default]
    Play,
    Pause,
}

/// Controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Volume for the first track (0.0-1.0)
    pub initial_volume: f32,

    /// Visualizer settings; `fft_size` also sizes each track's analysis tap
    pub visualizer: VisualizerConfig,

    /// Artwork shown when a track has none or its own fails to load
    pub placeholder_image: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            initial_volume: DEFAULT_VOLUME,
            visualizer: VisualizerConfig::default(),
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_string(),
        }
    }
}
