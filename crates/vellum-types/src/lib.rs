//! Foundation types for Vellum.
//!
//! This crate provides the identity and metadata types used throughout the
//! Vellum system. Every other Vellum crate depends on `vellum-types`.
//!
//! # Key Types
//!
//! - [`DocUri`] — Content-addressed document identity (`doc://<algorithm>/<hash>`)
//! - [`SourceRef`] — Any resolvable source: canonical `doc://`, or `file://` / `http(s)://`
//! - [`HashAlgorithm`] — Supported digest algorithms (sha256, sha512, blake3)
//! - [`ContentMetadata`] — Size, kind, and provenance attached to stored content

pub mod algorithm;
pub mod error;
pub mod metadata;
pub mod uri;

pub use algorithm::HashAlgorithm;
pub use error::UriError;
pub use metadata::{ContentMetadata, Provenance};
pub use uri::{DocUri, SourceRef};
