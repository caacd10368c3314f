use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use vellum_types::{ContentMetadata, HashAlgorithm};

use crate::error::{StoreError, StoreResult};
use crate::traits::{ContentStore, RetrievedContent, StoredContent};

/// In-memory, HashMap-based content store.
///
/// Intended for tests and embedding. All blobs are held in memory behind a
/// `RwLock` for safe concurrent access. Blobs are cloned on read/write.
pub struct InMemoryContentStore {
    blobs: RwLock<HashMap<String, (Vec<u8>, ContentMetadata)>>,
}

impl InMemoryContentStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored blobs.
    pub fn total_bytes(&self) -> u64 {
        self.blobs
            .read()
            .expect("lock poisoned")
            .values()
            .map(|(content, _)| content.len() as u64)
            .sum()
    }

    /// Remove all blobs from the store.
    pub fn clear(&self) {
        self.blobs.write().expect("lock poisoned").clear();
    }

    /// Overwrite the bytes filed under an existing digest, leaving the key
    /// untouched. Test-only hook for simulating on-disk corruption.
    pub fn corrupt(&self, hash: &str, content: Vec<u8>) -> bool {
        let mut map = self.blobs.write().expect("lock poisoned");
        match map.get_mut(hash) {
            Some(entry) => {
                entry.0 = content;
                true
            }
            None => false,
        }
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn store(
        &self,
        content: &[u8],
        metadata: ContentMetadata,
        algorithm: HashAlgorithm,
    ) -> StoreResult<StoredContent> {
        let hash = vellum_hash::compute_content_hash(content, algorithm);
        let mut map = self.blobs.write().expect("lock poisoned");
        let existed = map.contains_key(&hash);
        if !existed {
            map.insert(hash.clone(), (content.to_vec(), metadata));
        }
        Ok(StoredContent { hash, existed })
    }

    async fn retrieve(&self, hash: &str) -> StoreResult<Option<RetrievedContent>> {
        if hash.is_empty() {
            return Err(StoreError::EmptyHash);
        }
        let map = self.blobs.read().expect("lock poisoned");
        Ok(map.get(hash).map(|(content, metadata)| RetrievedContent {
            content: content.clone(),
            metadata: metadata.clone(),
        }))
    }

    async fn exists(&self, hash: &str) -> StoreResult<bool> {
        let map = self.blobs.read().expect("lock poisoned");
        Ok(map.contains_key(hash))
    }
}

impl std::fmt::Debug for InMemoryContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryContentStore")
            .field("blob_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_and_retrieve_roundtrip() {
        let store = InMemoryContentStore::new();
        let stored = store
            .store(b"0123456789", ContentMetadata::with_size(10), HashAlgorithm::Sha256)
            .await
            .unwrap();
        assert!(!stored.existed);
        assert_eq!(
            stored.hash,
            "84d89877f0d4041efb6bf91a16f0248f2fd573e6af05c19f96bedb9f882f7882"
        );

        let got = store.retrieve(&stored.hash).await.unwrap().unwrap();
        assert_eq!(got.content, b"0123456789");
        assert_eq!(got.metadata.size, 10);
    }

    #[tokio::test]
    async fn duplicate_write_reports_existed() {
        let store = InMemoryContentStore::new();
        let first = store
            .store(b"same", ContentMetadata::default(), HashAlgorithm::Sha256)
            .await
            .unwrap();
        let second = store
            .store(b"same", ContentMetadata::default(), HashAlgorithm::Sha256)
            .await
            .unwrap();
        assert!(!first.existed);
        assert!(second.existed);
        assert_eq!(first.hash, second.hash);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn missing_blob_is_none() {
        let store = InMemoryContentStore::new();
        let missing = "0".repeat(64);
        assert!(store.retrieve(&missing).await.unwrap().is_none());
        assert!(!store.exists(&missing).await.unwrap());
    }

    #[tokio::test]
    async fn empty_hash_rejected() {
        let store = InMemoryContentStore::new();
        assert!(matches!(store.retrieve("").await, Err(StoreError::EmptyHash)));
    }
}
