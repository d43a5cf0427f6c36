//! Waveline Player Application
//!
//! Terminal front end: configuration, manifest loading, stdin controls and
//! the single-threaded loop that drives the playback controller.
//!
//! This library exposes the components for testing purposes.

pub mod app;
pub mod commands;
pub mod config;
pub mod error;

pub use app::{load_catalog, run, App};
pub use commands::Command;
pub use config::PlayerSettings;
pub use error::{PlayerError, Result};
