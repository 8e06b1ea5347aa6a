//! Error types for rollcall-storage

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in log storage
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error reading or writing the durable record
    #[error("I/O error: {0}")]
    Io(String),

    /// The log could not be encoded for writing
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The durable record exists but cannot be trusted
    #[error("Corrupt log record at {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    /// The backend refused the write
    #[error("Write rejected: {0}")]
    WriteRejected(String),

    /// An event for this (badge, activity) pair already exists
    #[error("Check-in already exists for {0}")]
    Conflict(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl StorageError {
    /// Create a new Corrupt error
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new Serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Whether this error means the on-disk state is unusable at startup
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
