//! Domain-specific error types following panic-free policy.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing the cache store.
///
/// A missing or unparseable cache is *not* an error: it loads as `None`.
/// These variants cover the filesystem refusing to cooperate.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Cache file exists but could not be read
    #[error("Failed to read cache {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Cache file could not be written or renamed into place
    #[error("Failed to write cache {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Snapshot could not be serialized
    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
