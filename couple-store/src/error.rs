//! Error types for the local store.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored value has an unexpected type or content.
    #[error("invalid data for {key}: {detail}")]
    InvalidData { key: String, detail: String },

    /// The connection lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,
}
