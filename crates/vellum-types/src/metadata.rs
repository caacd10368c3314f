use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata attached to stored or resolved content.
///
/// The store persists this alongside the bytes; the resolver returns it with
/// every resolution. The store itself never interprets any of it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentMetadata {
    /// Size of the content in bytes.
    pub size: u64,
    /// Declared document kind, e.g. `"latex"` or `"docx"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_kind: Option<String>,
    /// Where the content came from (URI, path, or pipeline description).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Generation provenance, when the content was produced by the pipeline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
}

impl ContentMetadata {
    /// Metadata carrying only a size.
    pub fn with_size(size: u64) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }
}

/// Origin record for a generated artifact.
///
/// The context stored here is the sanitized form; raw contexts are used for
/// hashing but never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    /// Template the artifact was generated from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_ref: Option<String>,
    /// Sanitized generation context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    /// Original non-canonical source, when content was promoted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_source: Option<String>,
    /// When the record was written.
    pub recorded_at: DateTime<Utc>,
}

impl Provenance {
    /// Provenance for content promoted from a non-canonical source.
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            template_ref: None,
            context: None,
            original_source: Some(source.into()),
            recorded_at: Utc::now(),
        }
    }

    /// Provenance for a pipeline-generated artifact.
    pub fn generated(template_ref: impl Into<String>, context: Value) -> Self {
        Self {
            template_ref: Some(template_ref.into()),
            context: Some(context),
            original_source: None,
            recorded_at: Utc::now(),
        }
    }
}
