/// Player configuration
use crate::error::{PlayerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use waveline_core::DEFAULT_MANIFEST_PATH;
use waveline_playback::{PlayerConfig, DEFAULT_PLACEHOLDER_IMAGE};
use waveline_visualizer::{Color, VisualizerConfig};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "waveline.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerSettings {
    #[serde(default = "default_manifest")]
    pub manifest: ManifestSettings,

    #[serde(default = "default_playback")]
    pub playback: PlaybackSettings,

    #[serde(default = "default_visualizer")]
    pub visualizer: VisualizerSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ManifestSettings {
    /// File path, `file://` URL or `http(s)://` URL
    #[serde(default = "default_manifest_location")]
    pub location: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_initial_volume")]
    pub initial_volume: f32,

    /// Progress sync period
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Artwork used when a track has none or its own fails to load
    #[serde(default = "default_placeholder_image")]
    pub placeholder_image: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VisualizerSettings {
    #[serde(default = "default_fft_size")]
    pub fft_size: usize,

    #[serde(default = "default_bar_density")]
    pub bar_density: f32,

    #[serde(default = "default_bar_spacing")]
    pub bar_spacing: f32,

    #[serde(default = "default_color")]
    pub color: Color,

    /// Surface size in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    /// Frame cadence in frames per second
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
}

impl PlayerSettings {
    /// Load configuration from `waveline.toml` (if present) and environment
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from an explicit file, then the environment
    ///
    /// An explicit path must exist. Without one, `waveline.toml` in the
    /// working directory is used when present.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(PlayerError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        // Override with environment variables, e.g. WAVELINE_PLAYBACK__INITIAL_VOLUME
        settings = settings.add_source(
            config::Environment::with_prefix("WAVELINE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Self = settings.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let volume = self.playback.initial_volume;
        if !(0.0..=1.0).contains(&volume) {
            return Err(PlayerError::Config(format!(
                "playback.initial_volume must be within 0..=1, got {volume}"
            )));
        }

        if self.playback.tick_interval_ms == 0 {
            return Err(PlayerError::Config(
                "playback.tick_interval_ms must be positive".to_string(),
            ));
        }

        let fft_size = self.visualizer.fft_size;
        if !fft_size.is_power_of_two() || !(32..=32768).contains(&fft_size) {
            return Err(PlayerError::Config(format!(
                "visualizer.fft_size must be a power of two in 32..=32768, got {fft_size}"
            )));
        }

        if self.visualizer.frame_rate == 0 {
            return Err(PlayerError::Config(
                "visualizer.frame_rate must be positive".to_string(),
            ));
        }

        if self.visualizer.width == 0 || self.visualizer.height == 0 {
            return Err(PlayerError::Config(
                "visualizer surface must be at least 1x1".to_string(),
            ));
        }

        Ok(())
    }

    /// Controller configuration derived from these settings
    pub fn player_config(&self) -> PlayerConfig {
        PlayerConfig {
            initial_volume: self.playback.initial_volume,
            placeholder_image: self.playback.placeholder_image.clone(),
            visualizer: VisualizerConfig {
                fft_size: self.visualizer.fft_size,
                bar_density: self.visualizer.bar_density,
                bar_spacing: self.visualizer.bar_spacing,
                color: self.visualizer.color,
            },
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.playback.tick_interval_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.visualizer.frame_rate.max(1)
    }
}

// Default values
fn default_manifest() -> ManifestSettings {
    ManifestSettings {
        location: default_manifest_location(),
    }
}

fn default_manifest_location() -> String {
    DEFAULT_MANIFEST_PATH.to_string()
}

fn default_playback() -> PlaybackSettings {
    PlaybackSettings {
        initial_volume: default_initial_volume(),
        tick_interval_ms: default_tick_interval_ms(),
        placeholder_image: default_placeholder_image(),
    }
}

fn default_initial_volume() -> f32 {
    0.1
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_placeholder_image() -> String {
    DEFAULT_PLACEHOLDER_IMAGE.to_string()
}

fn default_visualizer() -> VisualizerSettings {
    VisualizerSettings {
        fft_size: default_fft_size(),
        bar_density: default_bar_density(),
        bar_spacing: default_bar_spacing(),
        color: default_color(),
        width: default_width(),
        height: default_height(),
        frame_rate: default_frame_rate(),
    }
}

fn default_fft_size() -> usize {
    2048
}

fn default_bar_density() -> f32 {
    10.0
}

fn default_bar_spacing() -> f32 {
    4.0
}

fn default_color() -> Color {
    Color::rgb(0xf9, 0xb5, 0xff)
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    200
}

fn default_frame_rate() -> u32 {
    60
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            playback: default_playback(),
            visualizer: default_visualizer(),
        }
    }
}
