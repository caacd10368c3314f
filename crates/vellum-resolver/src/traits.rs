/// Error from a normalizer. Opaque to the resolver; normalization failures
/// are logged and never fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("normalization failed: {0}")]
pub struct NormalizeError(pub String);

impl NormalizeError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Canonicalizes ZIP-based package bytes before hashing.
///
/// Implementations must be pure and deterministic: the same input always
/// produces the same output, so two differently-serialized but logically
/// identical packages land under one content address. The resolver invokes
/// this only for bytes carrying the ZIP local-file-header signature.
pub trait PackageNormalizer: Send + Sync {
    fn normalize(&self, bytes: &[u8]) -> Result<Vec<u8>, NormalizeError>;
}
