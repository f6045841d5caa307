use tally_types::ObjectKey;

/// Errors from corpus store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Listing the objects under a prefix failed.
    #[error("failed to list objects in {bucket} starting with {prefix:?}: {reason}")]
    Listing {
        bucket: String,
        prefix: String,
        reason: String,
    },

    /// The requested object does not exist.
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: ObjectKey },

    /// The key cannot be mapped onto this backend.
    #[error("invalid object key {key}: {reason}")]
    InvalidKey { key: ObjectKey, reason: String },

    /// Network or HTTP-level failure talking to the store.
    #[error("transport error: {0}")]
    Transport(String),

    /// The store was configured with values it cannot use.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error from a local backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
