//! Error types for the sync layer.

use couple_store::StoreError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote store could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error from a directory-backed store.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Local store error.
    #[error("local store error: {0}")]
    Store(#[from] StoreError),

    /// A remote record does not have the expected shape.
    #[error("invalid record {key}: {reason}")]
    InvalidRecord { key: String, reason: String },
}
