//! Deterministic document processing for Vellum.
//!
//! The [`DeterministicProcessor`] turns a (template, context) pair into a
//! content-addressed artifact and then certifies, empirically, that the
//! pair reproduces: it re-runs generation and normalization several times
//! and requires every run to hash identically. Reproducibility here is a
//! measured property, not a static proof — a template that happens to be
//! stable for the sampled runs can still pass.
//!
//! # Pipeline
//!
//! `resolve → validate → generate → normalize → store → verify → cleanup`
//!
//! Stages execute strictly in this order within one invocation. Rendering,
//! normalization, linting, and diffing are external collaborators consumed
//! through the traits in [`traits`]; the pipeline never parses document
//! formats itself.

pub mod config;
pub mod context;
pub mod defaults;
pub mod error;
pub mod metrics;
pub mod processor;
pub mod result;
pub mod traits;

pub use config::ProcessorConfig;
pub use context::{canonical_context_json, sanitize_context};
pub use defaults::{ByteDiffer, PassthroughNormalizer, PermissiveLinter};
pub use error::{PipelineError, PipelineResult};
pub use metrics::ProcessorMetrics;
pub use processor::{DeterministicProcessor, ProcessJob};
pub use result::{BatchReport, ProcessingResult, StageMetrics, Verification};
pub use traits::{
    ContextReport, DiffOutcome, DocumentKind, LintIssue, LintReport, Normalizer, RenderOutcome,
    Renderer, SemanticDiffer, Severity, TemplateLinter,
};
