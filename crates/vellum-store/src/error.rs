/// Errors from content store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata sidecar could not be encoded or decoded.
    #[error("metadata serialization error: {0}")]
    Metadata(#[from] serde_json::Error),

    /// A blob on disk does not hash to the key it is filed under.
    #[error("corrupt blob {hash}: stored bytes hash to {computed}")]
    CorruptBlob { hash: String, computed: String },

    /// Attempted to store an empty key or retrieve with one.
    #[error("empty content hash")]
    EmptyHash,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
