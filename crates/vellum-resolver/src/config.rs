use std::time::Duration;

use vellum_types::HashAlgorithm;

/// Configuration for a [`UriResolver`](crate::UriResolver).
#[derive(Clone, Debug)]
pub struct ResolverConfig {
    /// Algorithm used when storing documents without an explicit override.
    pub default_algorithm: HashAlgorithm,
    /// Timeout applied to each `http(s)://` resolution.
    pub http_timeout: Duration,
    /// Maximum number of cached resolutions; oldest entries evict first.
    pub cache_capacity: usize,
    /// Optional time-to-live for cache entries. `None` means entries live
    /// until evicted by capacity or an explicit clear.
    pub cache_ttl: Option<Duration>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_algorithm: HashAlgorithm::Sha256,
            http_timeout: Duration::from_secs(30),
            cache_capacity: 256,
            cache_ttl: None,
        }
    }
}

/// Per-call options for `resolve`.
#[derive(Clone, Debug)]
pub struct ResolveOptions {
    /// Consult and populate the resolution cache. Only `doc://` resolutions
    /// are ever cached.
    pub use_cache: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self { use_cache: true }
    }
}

/// Per-call options for `store_document`.
#[derive(Clone, Debug, Default)]
pub struct StoreOptions {
    /// Algorithm override; falls back to the resolver's default.
    pub algorithm: Option<HashAlgorithm>,
    /// Skip package normalization before hashing.
    pub skip_normalization: bool,
    /// Declared document kind recorded in metadata.
    pub content_kind: Option<String>,
}

/// Per-call options for `batch_resolve`.
#[derive(Clone, Debug)]
pub struct BatchOptions {
    /// Maximum number of resolutions in flight at once.
    pub concurrency: usize,
    /// Options applied to each individual resolution.
    pub resolve: ResolveOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 5,
            resolve: ResolveOptions::default(),
        }
    }
}
