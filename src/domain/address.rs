//! Content addressing for audio artifacts.
//!
//! The address of an artifact is the SHA-256 digest of the synthesis key,
//! so the same key always maps to the same file regardless of run.

use std::fmt;

use sha2::{Digest, Sha256};

/// File extension for synthesized audio artifacts
pub const AUDIO_EXTENSION: &str = "mp3";

/// Deterministic storage address for one synthesis key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentAddress(String);

impl ContentAddress {
    /// Compute the address for a synthesis key
    pub fn for_key(key: &str) -> Self {
        let digest = Sha256::digest(key.as_bytes());
        Self(hex::encode(digest))
    }

    /// Lowercase hex digest
    pub fn hex(&self) -> &str {
        &self.0
    }

    /// Artifact filename (`<digest_hex>.mp3`)
    pub fn filename(&self) -> String {
        format!("{}.{}", self.0, AUDIO_EXTENSION)
    }
}

impl fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
