//! Track catalog
//!
//! Ordered, immutable-after-load list of tracks. A track's identity is its
//! position; navigation treats the list as circular.

use crate::{
    error::{ManifestError, Result},
    manifest::ManifestSource,
    track::Track,
};
use url::Url;

/// Ordered track list loaded once from a manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    /// Build a catalog from tracks already in memory
    ///
    /// An empty list is allowed here; it yields an inert catalog.
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    /// Empty catalog (nothing loaded yet, or loading failed)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fetch and parse a manifest
    ///
    /// Relative artwork and audio locations are resolved against the
    /// manifest's own location.
    pub async fn load(source: &dyn ManifestSource) -> Result<Self> {
        let location = source.location();
        tracing::debug!("Fetching manifest from {}", location);

        let payload = source.fetch().await?;
        let base = source.base_url();
        let catalog = Self::from_json(&payload, base.as_ref())?;

        tracing::info!("Loaded {} tracks from {}", catalog.len(), location);
        Ok(catalog)
    }

    /// Parse a manifest payload (JSON array of track records)
    pub fn from_json(payload: &[u8], base: Option<&Url>) -> Result<Self> {
        let mut tracks: Vec<Track> = serde_json::from_slice(payload)?;

        if tracks.is_empty() {
            return Err(ManifestError::Empty);
        }

        if let Some(base) = base {
            for track in &mut tracks {
                track.resolve_against(base);
            }
        }

        Ok(Self { tracks })
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    /// Index after `index`, wrapping to 0 past the end
    ///
    /// Returns `None` on an empty catalog.
    pub fn next_index(&self, index: usize) -> Option<usize> {
        let n = self.tracks.len();
        if n == 0 {
            return None;
        }
        Some((index % n + 1) % n)
    }

    /// Index before `index`, wrapping to the last track before 0
    ///
    /// Returns `None` on an empty catalog.
    pub fn prev_index(&self, index: usize) -> Option<usize> {
        let n = self.tracks.len();
        if n == 0 {
            return None;
        }
        Some((index % n + n - 1) % n)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Track;
    type IntoIter = std::slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_TRACKS: &str = r#"[
        {"title": "A", "artist": "Artist A", "image": "a.jpg", "src": "a.mp3"},
        {"title": "B", "artist": "Artist B", "image": "b.jpg", "src": "b.mp3", "year": 2021}
    ]"#;

    #[test]
    fn parses_tracks_in_order() {
        let catalog = Catalog::from_json(TWO_TRACKS.as_bytes(), None).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(0).unwrap().title, "A");
        assert_eq!(catalog.get(1).unwrap().source_url, "b.mp3");
    }

    #[test]
    fn empty_manifest_is_an_error() {
        let err = Catalog::from_json(b"[]", None).unwrap_err();
        assert!(matches!(err, ManifestError::Empty));
    }

    #[test]
    fn malformed_manifest_is_an_error() {
        let err = Catalog::from_json(b"{\"title\": 1}", None).unwrap_err();
        assert!(matches!(err, ManifestError::Parse(_)));

        let err = Catalog::from_json(br#"[{"title": "no src"}]"#, None).unwrap_err();
        assert!(matches!(err, ManifestError::Parse(_)));
    }

    #[test]
    fn wraparound_navigation() {
        let catalog = Catalog::from_json(TWO_TRACKS.as_bytes(), None).unwrap();

        assert_eq!(catalog.next_index(0), Some(1));
        assert_eq!(catalog.next_index(1), Some(0));
        assert_eq!(catalog.prev_index(0), Some(1));
        assert_eq!(catalog.prev_index(1), Some(0));
    }

    #[test]
    fn navigation_on_empty_catalog_is_guarded() {
        let catalog = Catalog::empty();

        assert_eq!(catalog.next_index(0), None);
        assert_eq!(catalog.prev_index(0), None);
    }

    #[test]
    fn base_url_resolves_sources() {
        let base = Url::parse("https://example.com/player/data.json").unwrap();
        let catalog = Catalog::from_json(TWO_TRACKS.as_bytes(), Some(&base)).unwrap();

        assert_eq!(
            catalog.get(0).unwrap().source_url,
            "https://example.com/player/a.mp3"
        );
    }
}
