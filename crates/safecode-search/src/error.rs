//! Search error types.

use thiserror::Error;

use safecode_hardware::HardwareError;
use safecode_storage::StorageError;

/// Errors that abort a search run.
///
/// Every variant is fatal: no physical action is retried.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Device could not be configured or a line write failed.
    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),

    /// Attempt log could not be read or appended.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Invalid configuration or an internal state transition was rejected.
    #[error(transparent)]
    Core(#[from] safecode_core::Error),
}

impl SearchError {
    /// Whether the error came from the device.
    pub fn is_hardware(&self) -> bool {
        matches!(self, SearchError::Hardware(_))
    }

    /// Whether the error came from the attempt log.
    pub fn is_storage(&self) -> bool {
        matches!(self, SearchError::Storage(_))
    }
}

/// Result type for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions_keep_category() {
        let err: SearchError = HardwareError::Desynchronized.into();
        assert!(err.is_hardware());

        let err: SearchError = StorageError::Persistence("disk full".to_string()).into();
        assert!(err.is_storage());
        assert!(err.to_string().contains("disk full"));

        let err: SearchError = safecode_core::Error::Config("bad".to_string()).into();
        assert!(!err.is_hardware() && !err.is_storage());
    }
}
