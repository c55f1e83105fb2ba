use thiserror::Error;

/// Errors that can occur during object storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(String),

    /// An I/O error occurred while talking to the backing store.
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The provided object id is not a valid identifier.
    #[error("invalid object id: {0}")]
    InvalidId(String),

    /// The object exceeds the configured size limit.
    #[error("object exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
}
