//! Error types for durable storage backends.

use thiserror::Error;

/// Errors raised by a [`KeyValueStorage`](crate::KeyValueStorage) backend.
///
/// Stores never surface these to callers; they log them and treat the
/// affected entry as absent.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the underlying medium failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored record could not be encoded or decoded.
    #[error("malformed stored entry: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend refused the operation (quota, closed handle).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
