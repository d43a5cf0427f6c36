//! Desktop audio engine using CPAL and Symphonia
//!
//! This crate provides `DesktopEngine`, the `AudioEngine` implementation
//! Waveline Player uses on desktop platforms.
//!
//! # Features
//!
//! - Cross-platform audio output using CPAL
//! - Decoding of every Symphonia-supported format from files, `file://` and `http(s)://` URLs
//! - Automatic sample rate conversion (rubato)
//! - A `FrequencyAnalyser` tap fed from the device callback
//!
//! # Example
//!
//! ```no_run
//! use waveline_audio_desktop::DesktopEngine;
//! use waveline_playback::AudioEngine;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut engine = DesktopEngine::new()?;
//! let handle = engine.load("music/intro.mp3", 0.1)?;
//! engine.play(handle)?;
//!
//! // Lifecycle events arrive as the loader and device make progress
//! while let Some(event) = engine.poll_event() {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

mod engine;
mod error;
mod output;
pub mod source;
mod track_loader;

pub use engine::DesktopEngine;
pub use error::{AudioError, Result};
pub use output::AudioOutput;
pub use source::{decode, decode_file, DecodedTrack, TrackSource};
pub use track_loader::{LoadRequest, LoadResult, TrackLoader};
