//! Error types for the visualizer

use thiserror::Error;

/// Visualizer configuration errors
#[derive(Debug, Error, PartialEq)]
pub enum VisualizerError {
    /// FFT size must be a power of two between 32 and 32768
    #[error("Invalid FFT size: {0} (must be a power of two in 32..=32768)")]
    InvalidFftSize(usize),

    /// Colour string is not `#rrggbb`
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Smoothing constant outside 0.0-1.0
    #[error("Invalid smoothing constant: {0}")]
    InvalidSmoothing(f32),

    /// Decibel range is empty or inverted
    #[error("Invalid decibel range: {min} to {max}")]
    InvalidDecibelRange { min: f32, max: f32 },
}

/// Result type for visualizer operations
pub type Result<T> = std::result::Result<T, VisualizerError>;
