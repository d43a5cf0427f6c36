/// Player application error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlayerError>;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Command '{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error("Invalid argument for '{command}': {value}")]
    InvalidArgument { command: &'static str, value: String },

    #[error("Manifest error: {0}")]
    Manifest(#[from] waveline_core::ManifestError),

    #[error("Playback error: {0}")]
    Playback(#[from] waveline_playback::PlaybackError),

    #[error("Audio error: {0}")]
    Audio(#[from] waveline_audio_desktop::AudioError),
}

impl From<config::ConfigError> for PlayerError {
    fn from(err: config::ConfigError) -> Self {
        PlayerError::Config(err.to_string())
    }
}
