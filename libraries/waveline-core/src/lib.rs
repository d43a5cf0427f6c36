//! Waveline Player - Core Types
//!
//! The track catalog and the manifest it is loaded from.
//!
//! This crate provides:
//! - `Track`: one playlist entry (title, artist, artwork, audio source)
//! - `Catalog`: the ordered, immutable-after-load track list with
//!   wraparound navigation
//! - `ManifestSource`: where the manifest comes from (local file or HTTP)
//!
//! # Example
//!
//! ```rust,no_run
//! use waveline_core::{Catalog, FileManifest};
//!
//! # async fn run() -> waveline_core::Result<()> {
//! let source = FileManifest::new("./data.json");
//! let catalog = Catalog::load(&source).await?;
//!
//! for (index, track) in catalog.iter().enumerate() {
//!     println!("{index}: {} - {}", track.title, track.artist);
//! }
//! # Ok(())
//! # }
//! ```

mod catalog;
mod error;
mod manifest;
mod track;

pub use catalog::Catalog;
pub use error::{ManifestError, Result};
pub use manifest::{manifest_source_for, FileManifest, HttpManifest, ManifestSource, DEFAULT_MANIFEST_PATH};
pub use track::Track;
