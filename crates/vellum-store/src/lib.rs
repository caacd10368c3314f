//! Content-addressed byte storage for Vellum.
//!
//! Every document in Vellum is stored as an immutable blob keyed by the hex
//! digest of its bytes. Identical content always lands under one key, so
//! writes deduplicate for free and a stored blob can always be verified
//! against its own address.
//!
//! # Storage Backends
//!
//! All backends implement the [`ContentStore`] trait:
//!
//! - [`InMemoryContentStore`] — `HashMap`-based store for tests and embedding
//! - [`FsContentStore`] — fan-out directory layout with JSON metadata sidecars
//!
//! # Design Rules
//!
//! 1. Blobs are immutable once written (content-addressing guarantees this).
//! 2. Writes are idempotent; a repeated write reports `existed: true`.
//! 3. Concurrent reads are always safe (blobs are immutable).
//! 4. The store never interprets content — it is a pure key-value store.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsContentStore;
pub use memory::InMemoryContentStore;
pub use traits::{ContentStore, RetrievedContent, StoredContent};
