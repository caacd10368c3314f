use async_trait::async_trait;
use vellum_types::{ContentMetadata, HashAlgorithm};

use crate::error::StoreResult;

/// Outcome of a store operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredContent {
    /// Hex digest the content was filed under.
    pub hash: String,
    /// `true` when the content was already present (deduplication hit).
    pub existed: bool,
}

/// A blob read back from the store.
#[derive(Clone, Debug)]
pub struct RetrievedContent {
    pub content: Vec<u8>,
    pub metadata: ContentMetadata,
}

/// Content-addressed byte store.
///
/// All implementations must satisfy these invariants:
/// - Blobs are immutable once written; the same bytes always land under the
///   same key for a given algorithm.
/// - Writes are idempotent: storing existing content is a no-op that reports
///   `existed: true`.
/// - The store never interprets content.
/// - Failures are surfaced verbatim to the caller, never swallowed.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store bytes under their own digest, computed with `algorithm`.
    ///
    /// Returns the digest and whether the content already existed.
    async fn store(
        &self,
        content: &[u8],
        metadata: ContentMetadata,
        algorithm: HashAlgorithm,
    ) -> StoreResult<StoredContent>;

    /// Retrieve a blob by digest. Returns `Ok(None)` when absent.
    async fn retrieve(&self, hash: &str) -> StoreResult<Option<RetrievedContent>>;

    /// Whether a blob exists under the given digest.
    async fn exists(&self, hash: &str) -> StoreResult<bool> {
        Ok(self.retrieve(hash).await?.is_some())
    }
}
