//! Cache error types.

use thiserror::Error;

/// Errors that can occur when using the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Failed to open the store.
    #[error("Failed to open store: {0}")]
    OpenError(String),

    /// Failed to serialize value.
    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// Failed to perform store operation.
    #[error("Store operation failed on {key}: {message}")]
    StoreError { key: String, message: String },

    /// Key cannot be mapped onto the backend.
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

impl CacheError {
    pub(crate) fn store(key: &str, err: impl std::fmt::Display) -> Self {
        CacheError::StoreError {
            key: key.to_string(),
            message: err.to_string(),
        }
    }
}
