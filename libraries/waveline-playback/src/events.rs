//! Player Events
//!
//! Event-based communication for UI synchronization. Events are emitted at:
//! - Session phase changes (loading, playing, paused, ended, failed)
//! - Track changes (on every `load_track`)
//! - Progress ticks
//! - Volume changes

use crate::session::SessionPhase;
use crate::volume::VolumeTier;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Session phase changed
    StateChanged {
        /// The new phase
        phase: SessionPhase,
    },

    /// A new track was selected and is loading
    TrackChanged {
        /// Catalog index of the new track
        index: usize,
        title: String,
        artist: String,
    },

    /// Track finished playing naturally (reached end)
    TrackFinished {
        /// Catalog index of the finished track
        index: usize,
    },

    /// Periodic progress sync
    ProgressUpdated {
        /// Current playback position
        position_ms: u64,
        /// Total track duration, if known
        duration_ms: Option<u64>,
        /// Fraction played, if the duration is known and non-zero
        progress: Option<f32>,
    },

    /// Volume changed
    VolumeChanged {
        /// New volume level (0.0-1.0)
        level: f32,
        /// Icon tier for the new level
        tier: VolumeTier,
    },

    /// Catalog installed
    PlaylistChanged {
        /// New catalog length
        length: usize,
    },

    /// Error occurred during playback
    Error {
        /// Error message
        message: String,
    },
}
