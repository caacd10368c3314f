use vellum_types::{ContentMetadata, DocUri, HashAlgorithm};

/// A fully resolved piece of content.
///
/// Never partially populated: a `Resolution` only exists for a successful
/// resolution; every failure is an error value instead.
#[derive(Clone, Debug)]
pub struct Resolution {
    /// The resolved bytes (for segment URIs, the sub-entry's bytes).
    pub content: Vec<u8>,
    /// Size, kind, and provenance of the resolved content.
    pub metadata: ContentMetadata,
    /// Always `true` on a returned resolution.
    pub resolved: bool,
    /// `true` only for `doc://` resolutions.
    pub canonical: bool,
    /// `true` when served from the resolution cache.
    pub from_cache: bool,
}

/// Outcome of storing a document under its content address.
#[derive(Clone, Debug)]
pub struct StoredDocument {
    /// The new canonical identity.
    pub uri: DocUri,
    /// Hex digest of the (possibly normalized) stored bytes.
    pub hash: String,
    /// Algorithm the digest was computed with.
    pub algorithm: HashAlgorithm,
    /// Stored size in bytes.
    pub size: u64,
    /// `true` on a deduplication hit.
    pub existed: bool,
    /// `true` when package normalization ran before hashing.
    pub normalized: bool,
}

/// Outcome of promoting a source URI to canonical form.
#[derive(Clone, Debug)]
pub struct Canonicalized {
    /// The canonical identity for the source's content.
    pub uri: DocUri,
    /// `true` when the source was already a `doc://` URI; the mapping is
    /// then the identity and nothing was stored.
    pub already_canonical: bool,
    /// The source URI as given.
    pub source: String,
}
