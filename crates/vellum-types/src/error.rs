use serde::{Deserialize, Serialize};

/// Errors produced while parsing identity URIs.
///
/// All variants are detected before any I/O: parsing is pure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum UriError {
    /// The input was empty or whitespace-only.
    #[error("empty URI")]
    Empty,

    /// The URI has no recognizable `scheme://` prefix.
    #[error("missing scheme in URI: {0}")]
    MissingScheme(String),

    /// The scheme is not one of `doc`, `file`, `http`, `https`.
    #[error("unsupported URI scheme: {0}")]
    UnsupportedScheme(String),

    /// A `doc://` URI must carry at least `<algorithm>/<hash>`.
    #[error("doc URI must have at least an algorithm and a hash: {0}")]
    MissingComponents(String),

    /// The algorithm component is not a known hash algorithm.
    #[error("unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),

    /// The hash is not valid lowercase hexadecimal.
    #[error("hash is not valid hexadecimal: {0}")]
    InvalidHex(String),

    /// The hash length does not match the algorithm's fixed digest width.
    #[error("hash length {actual} does not match {algorithm} digest width {expected}")]
    InvalidHashLength {
        algorithm: String,
        expected: usize,
        actual: usize,
    },
}
