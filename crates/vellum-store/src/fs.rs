use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vellum_types::{ContentMetadata, HashAlgorithm};

use crate::error::{StoreError, StoreResult};
use crate::traits::{ContentStore, RetrievedContent, StoredContent};

/// Sidecar record written next to every blob.
#[derive(Serialize, Deserialize)]
struct Sidecar {
    algorithm: HashAlgorithm,
    metadata: ContentMetadata,
}

/// Filesystem-backed content store.
///
/// Blobs live under a two-level fan-out keyed by the hex digest
/// (`<root>/ab/cdef…`), the same layout git uses for loose objects, with a
/// `.meta.json` sidecar per blob. Writes go through a temp file and an
/// atomic rename so a crashed write never leaves a half-blob under a valid
/// key. Retrieval re-hashes the bytes against the key and fails on mismatch.
pub struct FsContentStore {
    root: PathBuf,
}

impl FsContentStore {
    /// Open (or create) a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, hash: &str) -> PathBuf {
        let (fan, rest) = hash.split_at(2);
        self.root.join(fan).join(rest)
    }

    fn sidecar_path(&self, hash: &str) -> PathBuf {
        let mut path = self.blob_path(hash);
        path.set_extension("meta.json");
        path
    }
}

#[async_trait]
impl ContentStore for FsContentStore {
    async fn store(
        &self,
        content: &[u8],
        metadata: ContentMetadata,
        algorithm: HashAlgorithm,
    ) -> StoreResult<StoredContent> {
        let hash = vellum_hash::compute_content_hash(content, algorithm);
        let blob_path = self.blob_path(&hash);

        if tokio::fs::try_exists(&blob_path).await? {
            return Ok(StoredContent { hash, existed: true });
        }

        let dir = blob_path.parent().expect("blob path has a fan-out parent");
        tokio::fs::create_dir_all(dir).await?;

        // Write-then-rename: readers never observe a partial blob.
        let tmp_path = blob_path.with_extension(format!("tmp.{}", std::process::id()));
        tokio::fs::write(&tmp_path, content).await?;
        tokio::fs::rename(&tmp_path, &blob_path).await?;

        let sidecar = Sidecar { algorithm, metadata };
        tokio::fs::write(self.sidecar_path(&hash), serde_json::to_vec_pretty(&sidecar)?).await?;

        tracing::debug!(hash = %hash, size = content.len(), "stored blob");
        Ok(StoredContent { hash, existed: false })
    }

    async fn retrieve(&self, hash: &str) -> StoreResult<Option<RetrievedContent>> {
        if hash.len() < 3 {
            return Err(StoreError::EmptyHash);
        }
        let blob_path = self.blob_path(hash);
        let content = match tokio::fs::read(&blob_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let metadata = match tokio::fs::read(self.sidecar_path(hash)).await {
            Ok(raw) => {
                let sidecar: Sidecar = serde_json::from_slice(&raw)?;
                let computed = vellum_hash::compute_content_hash(&content, sidecar.algorithm);
                if computed != hash {
                    return Err(StoreError::CorruptBlob {
                        hash: hash.to_string(),
                        computed,
                    });
                }
                sidecar.metadata
            }
            // Sidecar lost: fall back to bare metadata. The resolver still
            // verifies content against the URI hash on resolution.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                ContentMetadata::with_size(content.len() as u64)
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Some(RetrievedContent { content, metadata }))
    }

    async fn exists(&self, hash: &str) -> StoreResult<bool> {
        if hash.len() < 3 {
            return Err(StoreError::EmptyHash);
        }
        Ok(tokio::fs::try_exists(self.blob_path(hash)).await?)
    }
}

impl std::fmt::Debug for FsContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsContentStore").field("root", &self.root).finish()
    }
}
