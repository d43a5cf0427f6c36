//! Error types for catalog loading

use std::path::PathBuf;
use thiserror::Error;

/// Manifest fetch or parse failure
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Reading a manifest file failed
    #[error("Failed to read manifest {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP request for the manifest failed (network error or bad status)
    #[error("Failed to fetch manifest: {0}")]
    Http(#[from] reqwest::Error),

    /// Manifest location could not be understood
    #[error("Invalid manifest location: {0}")]
    InvalidLocation(String),

    /// Manifest payload is not a valid track list
    #[error("Malformed manifest: {0}")]
    Parse(#[from] serde_json::Error),

    /// Manifest parsed but lists no tracks
    #[error("Manifest contains no tracks")]
    Empty,
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, ManifestError>;
