//! On-disk response cache
//!
//! Every response that carried an HTTP status is stored as one JSON file at
//! `<root>/<hh>/<hash>`, where `hash` is the hex SHA-1 of the URL and `hh` its
//! first two characters. Files are written to a temporary name and renamed so a
//! reader never sees a partial entry.

use super::ClientError;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// One cached HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Cache directory shared by every collector handle
#[derive(Debug, Clone)]
pub struct ResponseCache {
    root: PathBuf,
}

impl ResponseCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates the cache root so an unwritable location fails at startup
    pub async fn ensure_root(&self) -> Result<(), ClientError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| ClientError::Cache {
                path: self.root.clone(),
                source,
            })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the entry for `url`
    ///
    /// # Example
    ///
    /// ```
    /// use michelin_my_maps::client::ResponseCache;
    ///
    /// let cache = ResponseCache::new("/tmp/cache");
    /// let path = cache.path_for("https://guide.michelin.com/en");
    /// let hash = path.file_name().unwrap().to_str().unwrap();
    /// assert_eq!(hash.len(), 40);
    /// assert!(path.parent().unwrap().ends_with(&hash[..2]));
    /// ```
    pub fn path_for(&self, url: &str) -> PathBuf {
        let hash = hex::encode(Sha1::digest(url.as_bytes()));
        self.root.join(&hash[..2]).join(hash)
    }

    /// Reads the entry for `url`
    ///
    /// Missing or unreadable entries are misses; a corrupt file is refetched
    /// and overwritten.
    pub async fn get(&self, url: &str) -> Option<CachedResponse> {
        let path = self.path_for(url);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::debug!("Cache read failed for {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_slice::<CachedResponse>(&bytes) {
            Ok(entry) if entry.url == url => Some(entry),
            Ok(entry) => {
                tracing::debug!("Cache entry {} belongs to {}", path.display(), entry.url);
                None
            }
            Err(e) => {
                tracing::debug!("Corrupt cache entry {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Stores an entry, replacing any previous one for the same URL
    pub async fn put(&self, entry: &CachedResponse) -> Result<(), ClientError> {
        let path = self.path_for(&entry.url);
        let cache_err = |source| ClientError::Cache {
            path: path.clone(),
            source,
        };

        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await.map_err(cache_err)?;
        }

        let json = serde_json::to_vec(entry)
            .map_err(|e| cache_err(std::io::Error::new(ErrorKind::InvalidData, e)))?;

        let tmp = path.with_extension(format!("tmp-{:08x}", rand::random::<u32>()));
        if let Err(e) = tokio::fs::write(&tmp, &json).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(cache_err(e));
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(cache_err(e));
        }
        Ok(())
    }

    /// Removes the entry for `url`; a missing entry is not an error
    pub async fn clear(&self, url: &str) -> Result<(), ClientError> {
        let path = self.path_for(url);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ClientError::Cache { path, source }),
        }
    }
}
