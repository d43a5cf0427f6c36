//! Track descriptor

use serde::{Deserialize, Serialize};
use url::Url;

/// One playlist entry
///
/// Deserialized straight from a manifest record. The manifest keys are
/// `title`, `artist`, `image` and `src`; any extra keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Artwork location
    #[serde(rename = "image")]
    pub image_url: String,

    /// Audio resource location
    #[serde(rename = "src")]
    pub source_url: String,
}

impl Track {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        image_url: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            image_url: image_url.into(),
            source_url: source_url.into(),
        }
    }

    /// Label used in playlist rows: `"Title - Artist"`
    pub fn display_label(&self) -> String {
        format!("{} - {}", self.title, self.artist)
    }

    /// Resolve relative `image`/`src` entries against the manifest location
    pub(crate) fn resolve_against(&mut self, base: &Url) {
        self.image_url = resolve(base, &self.image_url);
        self.source_url = resolve(base, &self.source_url);
    }
}

fn resolve(base: &Url, reference: &str) -> String {
    if reference.is_empty() || Url::parse(reference).is_ok() {
        return reference.to_string();
    }

    match base.join(reference) {
        Ok(url) => url.to_string(),
        Err(_) => reference.to_string(),
    }
}
