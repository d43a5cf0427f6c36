//! Manifest sources
//!
//! The manifest is the one piece of external I/O the player waits on before
//! anything else happens. It can live next to the binary or behind HTTP.

use crate::error::{ManifestError, Result};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use url::Url;

/// Default manifest location, relative to the working directory
pub const DEFAULT_MANIFEST_PATH: &str = "./data.json";

/// Where a manifest payload comes from
#[async_trait]
pub trait ManifestSource: Send + Sync {
    /// Human-readable location (for logs)
    fn location(&self) -> String;

    /// Base used to resolve relative track entries, if any
    fn base_url(&self) -> Option<Url>;

    /// Fetch the raw payload
    async fn fetch(&self) -> Result<Vec<u8>>;
}

/// Manifest stored on the local filesystem
#[derive(Debug, Clone)]
pub struct FileManifest {
    path: PathBuf,
}

impl FileManifest {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn absolute_path(&self) -> Option<PathBuf> {
        if self.path.is_absolute() {
            Some(self.path.clone())
        } else {
            let relative: PathBuf = self
                .path
                .components()
                .filter(|c| !matches!(c, Component::CurDir))
                .collect();
            std::env::current_dir().ok().map(|dir| dir.join(relative))
        }
    }
}

impl Default for FileManifest {
    fn default() -> Self {
        Self::new(DEFAULT_MANIFEST_PATH)
    }
}

#[async_trait]
impl ManifestSource for FileManifest {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn base_url(&self) -> Option<Url> {
        self.absolute_path()
            .and_then(|path| Url::from_file_path(path).ok())
    }

    async fn fetch(&self) -> Result<Vec<u8>> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|source| ManifestError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

/// Manifest served over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpManifest {
    url: Url,
    client: reqwest::Client,
}

impl HttpManifest {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }

    /// Parse `location` as an absolute HTTP(S) URL
    pub fn parse(location: &str) -> Result<Self> {
        let url = Url::parse(location)
            .map_err(|e| ManifestError::InvalidLocation(format!("{location}: {e}")))?;

        match url.scheme() {
            "http" | "https" => Ok(Self::new(url)),
            other => Err(ManifestError::InvalidLocation(format!(
                "unsupported scheme '{other}' in {location}"
            ))),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl ManifestSource for HttpManifest {
    fn location(&self) -> String {
        self.url.to_string()
    }

    fn base_url(&self) -> Option<Url> {
        Some(self.url.clone())
    }

    async fn fetch(&self) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await?
            .error_for_status()?;

        Ok(response.bytes().await?.to_vec())
    }
}

/// Pick a manifest source from a configured location
///
/// `http://` and `https://` locations are fetched over the network; anything
/// else (including `file://` URLs) is read from disk.
pub fn manifest_source_for(location: &str) -> Result<Box<dyn ManifestSource>> {
    if location.starts_with("http://") || location.starts_with("https://") {
        return Ok(Box::new(HttpManifest::parse(location)?));
    }

    if location.starts_with("file://") {
        let url = Url::parse(location)
            .map_err(|e| ManifestError::InvalidLocation(format!("{location}: {e}")))?;
        let path = url
            .to_file_path()
            .map_err(|()| ManifestError::InvalidLocation(location.to_string()))?;
        return Ok(Box::new(FileManifest::new(path)));
    }

    Ok(Box::new(FileManifest::new(location)))
}
