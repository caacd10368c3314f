use std::sync::Arc;

use futures::stream::{self, StreamExt};
use vellum_store::ContentStore;
use vellum_types::{ContentMetadata, DocUri, Provenance, SourceRef};

use crate::cache::ResolutionCache;
use crate::config::{BatchOptions, ResolveOptions, ResolverConfig, StoreOptions};
use crate::container;
use crate::error::{ResolverError, ResolverResult};
use crate::traits::PackageNormalizer;
use crate::types::{Canonicalized, Resolution, StoredDocument};

/// Resolves identity URIs against a content-addressable store.
///
/// One resolver instance owns one [`ResolutionCache`] and one HTTP client;
/// both live for the resolver's lifetime. All operations return result
/// values — no failure escapes as a panic.
pub struct UriResolver {
    store: Arc<dyn ContentStore>,
    cache: ResolutionCache,
    config: ResolverConfig,
    http: reqwest::Client,
    normalizer: Option<Arc<dyn PackageNormalizer>>,
}

impl UriResolver {
    /// Create a resolver over the given store.
    pub fn new(store: Arc<dyn ContentStore>, config: ResolverConfig) -> Self {
        let cache = ResolutionCache::new(config.cache_capacity, config.cache_ttl);
        Self {
            store,
            cache,
            config,
            http: reqwest::Client::new(),
            normalizer: None,
        }
    }

    /// Attach a package normalizer applied before hashing on store.
    pub fn with_normalizer(mut self, normalizer: Arc<dyn PackageNormalizer>) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    /// The resolver's configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve any supported URI into content bytes plus metadata.
    ///
    /// Dispatches on scheme: `doc://` resolutions are canonical, verified,
    /// and cached; `file://` and `http(s)://` are non-canonical fallbacks.
    pub async fn resolve(&self, uri: &str, options: &ResolveOptions) -> ResolverResult<Resolution> {
        match SourceRef::parse(uri)? {
            SourceRef::Doc(doc) => self.resolve_doc(&doc, options).await,
            SourceRef::File(path) => self.resolve_file(&path).await,
            SourceRef::Http(url) => self.resolve_http(&url).await,
        }
    }

    /// Resolve a batch of URIs with bounded concurrency.
    ///
    /// Up to `options.concurrency` resolutions run at once in a sliding
    /// window. The output order always matches the input order regardless
    /// of completion order, and each element carries its own outcome: one
    /// URI failing never aborts the batch.
    pub async fn batch_resolve(
        &self,
        uris: &[String],
        options: &BatchOptions,
    ) -> Vec<ResolverResult<Resolution>> {
        stream::iter(uris.iter().map(|uri| self.resolve(uri, &options.resolve)))
            .buffered(options.concurrency.max(1))
            .collect()
            .await
    }

    /// Store document bytes under their content address.
    ///
    /// ZIP-based packages are normalized before hashing (unless disabled or
    /// no normalizer is attached) so that two differently-serialized but
    /// logically identical packages land under one address. A normalization
    /// failure is logged and the raw bytes are stored instead; it is never
    /// fatal. Persistence and deduplication are the store's concern.
    pub async fn store_document(
        &self,
        bytes: &[u8],
        metadata: ContentMetadata,
        options: &StoreOptions,
    ) -> ResolverResult<StoredDocument> {
        let algorithm = options.algorithm.unwrap_or(self.config.default_algorithm);

        let mut normalized = false;
        let bytes: Vec<u8> = if !options.skip_normalization && container::is_zip_package(bytes) {
            match &self.normalizer {
                Some(normalizer) => match normalizer.normalize(bytes) {
                    Ok(canonical) => {
                        normalized = true;
                        canonical
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "package normalization failed; storing raw bytes");
                        bytes.to_vec()
                    }
                },
                None => bytes.to_vec(),
            }
        } else {
            bytes.to_vec()
        };

        let mut metadata = metadata;
        metadata.size = bytes.len() as u64;
        if metadata.content_kind.is_none() {
            metadata.content_kind = options.content_kind.clone();
        }

        let stored = self.store.store(&bytes, metadata, algorithm).await?;
        let uri = DocUri::new(algorithm, stored.hash.clone())?;
        tracing::debug!(uri = %uri.short(), existed = stored.existed, "stored document");

        Ok(StoredDocument {
            uri,
            hash: stored.hash,
            algorithm,
            size: bytes.len() as u64,
            existed: stored.existed,
            normalized,
        })
    }

    /// Promote a source URI to canonical content-addressed form.
    ///
    /// An already-canonical source maps to itself with nothing stored.
    /// Otherwise the source is resolved and its bytes stored, with the
    /// original source recorded as provenance.
    pub async fn canonicalize(
        &self,
        source_uri: &str,
        options: &StoreOptions,
    ) -> ResolverResult<Canonicalized> {
        let source = SourceRef::parse(source_uri)?;
        let resolution = self.resolve(source_uri, &ResolveOptions::default()).await?;

        if resolution.canonical {
            // Identity mapping: already content-addressed, nothing to store.
            if let SourceRef::Doc(doc) = source {
                return Ok(Canonicalized {
                    uri: doc,
                    already_canonical: true,
                    source: source_uri.to_string(),
                });
            }
        }
        let metadata = ContentMetadata {
            size: resolution.content.len() as u64,
            content_kind: options.content_kind.clone(),
            source: Some(source_uri.to_string()),
            provenance: Some(Provenance::from_source(source_uri)),
        };
        let stored = self.store_document(&resolution.content, metadata, options).await?;

        Ok(Canonicalized {
            uri: stored.uri,
            already_canonical: false,
            source: source_uri.to_string(),
        })
    }

    /// Drop every cached resolution.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Number of live cache entries.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    async fn resolve_doc(&self, uri: &DocUri, options: &ResolveOptions) -> ResolverResult<Resolution> {
        let key = uri.to_string();

        if options.use_cache {
            if let Some(mut hit) = self.cache.get(&key) {
                hit.from_cache = true;
                tracing::trace!(uri = %uri.short(), "cache hit");
                return Ok(hit);
            }
        }

        let retrieved = self
            .store
            .retrieve(&uri.hash)
            .await?
            .ok_or_else(|| ResolverError::NotFound(key.clone()))?;

        // Integrity gate: the container bytes must still hash to the
        // address they were requested under. A mismatch is fatal and is
        // never retried — retrying cannot un-tamper content.
        let computed = vellum_hash::compute_content_hash(&retrieved.content, uri.algorithm);
        if computed != uri.hash {
            return Err(ResolverError::IntegrityMismatch {
                uri: key,
                expected: uri.hash.clone(),
                computed,
            });
        }

        let mut metadata = retrieved.metadata;
        let content = if uri.has_segments() {
            let entry = container::extract_entry(&retrieved.content, &uri.segment_path(), &key)?;
            metadata.size = entry.len() as u64;
            entry
        } else {
            retrieved.content
        };
        metadata.source = Some(key.clone());

        let resolution = Resolution {
            content,
            metadata,
            resolved: true,
            canonical: true,
            from_cache: false,
        };
        if options.use_cache {
            self.cache.insert(key, resolution.clone());
        }
        Ok(resolution)
    }

    async fn resolve_file(&self, path: &str) -> ResolverResult<Resolution> {
        let content = tokio::fs::read(path).await?;
        let metadata = ContentMetadata {
            size: content.len() as u64,
            content_kind: None,
            source: Some(format!("file://{path}")),
            provenance: None,
        };
        Ok(Resolution {
            content,
            metadata,
            resolved: true,
            canonical: false,
            from_cache: false,
        })
    }

    async fn resolve_http(&self, url: &str) -> ResolverResult<Resolution> {
        let response = self
            .http
            .get(url)
            .timeout(self.config.http_timeout)
            .send()
            .await?
            .error_for_status()?;
        let content = response.bytes().await?.to_vec();
        let metadata = ContentMetadata {
            size: content.len() as u64,
            content_kind: None,
            source: Some(url.to_string()),
            provenance: None,
        };
        Ok(Resolution {
            content,
            metadata,
            resolved: true,
            canonical: false,
            from_cache: false,
        })
    }
}

impl std::fmt::Debug for UriResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UriResolver")
            .field("config", &self.config)
            .field("cached", &self.cache.len())
            .finish()
    }
}
