use std::path::PathBuf;

use thiserror::Error;

/// Storage errors for the attempt log.
///
/// Every variant is fatal: continuing without a durable record of attempts
/// risks repeating codes against the device's lockout counter.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The attempt log could not be read
    #[error("Failed to read attempt log {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An attempt could not be appended durably
    #[error("Failed to append to attempt log {path}: {source}")]
    Append {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic persistence failure (non-file backends)
    #[error("Persistence error: {0}")]
    Persistence(String),
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
