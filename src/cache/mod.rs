//! Content-addressed blob store for audio artifacts.
//!
//! The store is a black-box key-value interface keyed by [`ContentAddress`]:
//! the pipeline only ever asks "does this artifact exist" and "write these
//! bytes". Artifacts are read-only after creation and survive across runs,
//! which is what makes warm-cache reruns free.

pub mod fs;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::ContentAddress;

pub use fs::DirBlobStore;

/// Errors from the blob store; always fatal to the run
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Gateway to the artifact store
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Check whether an artifact exists at the given address.
    ///
    /// A probe failure that is not "not found" is an error, not a miss.
    async fn exists(&self, address: &ContentAddress) -> Result<bool, CacheError>;

    /// Write a new artifact at the given address
    async fn write(&self, address: &ContentAddress, bytes: &[u8]) -> Result<(), CacheError>;
}
