//! URI resolution for Vellum.
//!
//! The [`UriResolver`] is the single gateway between identity URIs and
//! bytes. It resolves canonical `doc://<algorithm>/<hash>` URIs against a
//! [`ContentStore`](vellum_store::ContentStore), verifying on every
//! resolution that the retrieved bytes still hash to the address they were
//! requested under, and it resolves `file://` and `http(s)://` sources as
//! non-canonical fallbacks that can be promoted into content-addressed form.
//!
//! # Guarantees
//!
//! - A successful `doc://` resolution implies the content's recomputed hash
//!   equals the URI's hash. Any mismatch is a fatal integrity failure and is
//!   never retried.
//! - Container segment extraction is deterministic: matches follow the
//!   container's native entry order, not alphabetical order.
//! - [`UriResolver::batch_resolve`] preserves input order regardless of
//!   completion order, and one failure never aborts the batch.

pub mod cache;
pub mod config;
pub mod container;
pub mod error;
pub mod resolver;
pub mod traits;
pub mod types;

pub use cache::ResolutionCache;
pub use config::{BatchOptions, ResolveOptions, ResolverConfig, StoreOptions};
pub use error::{ResolverError, ResolverResult};
pub use resolver::UriResolver;
pub use traits::{NormalizeError, PackageNormalizer};
pub use types::{Canonicalized, Resolution, StoredDocument};

// The same hash function the store uses; re-exported so resolver callers
// never need a separate dependency to pre-compute addresses.
pub use vellum_hash::compute_content_hash;
