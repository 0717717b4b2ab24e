//! Error handling types for nvtx-ranges
//!
//! This module provides the error type shared by the range store, the
//! plan exporter, and the language server.

use thiserror::Error;

/// Error type for range operations
#[derive(Debug, Error)]
pub enum RangeError {
    /// No workspace root is known, so there is nowhere to keep ranges
    #[error("No workspace folder is open; ranges cannot be stored")]
    MissingWorkspace,

    /// The range file exists but its content is not a valid range set
    #[error("Failed to read ranges from {path}: {message}")]
    StorageRead { path: String, message: String },

    /// The range file could not be written
    #[error("Failed to write ranges to {path}: {message}")]
    StorageWrite { path: String, message: String },

    /// A range or plan entry failed validation
    #[error("Invalid range: {}", errors.join("; "))]
    Invalid { errors: Vec<String> },
}

/// Result type for range operations
pub type RangeResult<T> = Result<T, RangeError>;

/// Helper functions for common error patterns
impl RangeError {
    /// Create a storage read error
    pub fn storage_read(path: impl AsRef<std::path::Path>, message: impl ToString) -> Self {
        RangeError::StorageRead {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }

    /// Create a storage write error
    pub fn storage_write(path: impl AsRef<std::path::Path>, message: impl ToString) -> Self {
        RangeError::StorageWrite {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }

    /// Create a validation error from collected messages
    pub fn invalid(errors: Vec<String>) -> Self {
        RangeError::Invalid { errors }
    }
}
