//! File share error types.

use sharebox_shared::AppError;
use thiserror::Error;

use crate::storage::StorageError;

/// File share operation errors.
#[derive(Debug, Error)]
pub enum ShareError {
    /// Invalid input from the client.
    #[error("validation failed: {0}")]
    Validation(String),

    /// File too large.
    #[error("file too large: {size} bytes exceeds maximum {max} bytes")]
    FileTooLarge {
        /// Declared file size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },

    /// No record exists for the identifier.
    #[error("file not found: {0}")]
    NotFound(String),

    /// A record with the identifier already exists.
    #[error("duplicate file id: {0}")]
    DuplicateId(String),

    /// Storage operation failed.
    #[error("storage error: {0}")]
    Storage(StorageError),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl ShareError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    /// Create a file too large error.
    #[must_use]
    pub fn file_too_large(size: u64, max: u64) -> Self {
        Self::FileTooLarge { size, max }
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<StorageError> for ShareError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::FileTooLarge { size, max } => Self::FileTooLarge { size, max },
            other => Self::Storage(other),
        }
    }
}

impl From<ShareError> for AppError {
    fn from(err: ShareError) -> Self {
        match err {
            ShareError::Validation(msg) => Self::Validation(msg),
            ShareError::FileTooLarge { .. } => Self::Validation("File too large".to_string()),
            ShareError::NotFound(_) => Self::NotFound("File not found".to_string()),
            ShareError::DuplicateId(id) => Self::Conflict(format!("duplicate file id {id}")),
            ShareError::Storage(e) => Self::Storage(e.to_string()),
            ShareError::Repository(msg) => Self::Database(msg),
        }
    }
}
