//! Filesystem-backed blob store.
//!
//! Artifacts live in a single configured directory, one file per content
//! address, named `<digest_hex>.mp3`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ContentAddress;

use super::{BlobStore, CacheError};

/// Blob store rooted at the audio output directory
pub struct DirBlobStore {
    root: PathBuf,
}

impl DirBlobStore {
    /// Create a store rooted at `root`; the directory must already exist
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute path of the artifact for an address
    pub fn path_for(&self, address: &ContentAddress) -> PathBuf {
        self.root.join(address.filename())
    }

    fn io_error(path: &Path, source: std::io::Error) -> CacheError {
        CacheError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[async_trait]
impl BlobStore for DirBlobStore {
    async fn exists(&self, address: &ContentAddress) -> Result<bool, CacheError> {
        let path = self.path_for(address);
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| Self::io_error(&path, e))
    }

    async fn write(&self, address: &ContentAddress, bytes: &[u8]) -> Result<(), CacheError> {
        let path = self.path_for(address);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| Self::io_error(&path, e))?;
        debug!(address = %address, bytes = bytes.len(), "artifact written");
        Ok(())
    }
}
