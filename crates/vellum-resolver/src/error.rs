use vellum_store::StoreError;
use vellum_types::UriError;

/// Errors from URI resolution and storage operations.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    /// Malformed URI, rejected before any I/O.
    #[error(transparent)]
    InvalidUri(#[from] UriError),

    /// The addressed content does not exist in the store.
    #[error("content not found: {0}")]
    NotFound(String),

    /// Retrieved bytes no longer hash to the address they were requested
    /// under. Fatal: never retried.
    #[error("integrity mismatch resolving {uri}: expected {expected}, computed {computed}")]
    IntegrityMismatch {
        uri: String,
        expected: String,
        computed: String,
    },

    /// The URI names a container sub-entry that no entry matches.
    #[error("no entry matching '{path}' in container {uri}")]
    SegmentNotFound { uri: String, path: String },

    /// The content is not a readable multi-file container.
    #[error("container error for {uri}: {reason}")]
    Container { uri: String, reason: String },

    /// Failure surfaced verbatim from the content store.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// HTTP fetch failed or timed out.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Local filesystem read failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for resolver operations.
pub type ResolverResult<T> = Result<T, ResolverError>;
