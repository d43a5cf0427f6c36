//! Error types for playback control

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No track is currently loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Catalog has no tracks to navigate
    #[error("Catalog is empty")]
    EmptyCatalog,

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Volume is not a finite number
    #[error("Invalid volume: {0}")]
    InvalidVolume(f32),

    /// Seek fraction is not a finite number
    #[error("Invalid seek fraction: {0}")]
    InvalidSeekFraction(f32),

    /// Engine could not load an audio source
    #[error("Failed to load '{source_url}': {message}")]
    EngineLoad { source_url: String, message: String },

    /// Engine rejected a command
    #[error("Audio engine error: {0}")]
    Engine(String),

    /// Analysis tap could not be created
    #[error("Analysis tap error: {0}")]
    Tap(#[from] waveline_visualizer::VisualizerError),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
