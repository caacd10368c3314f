use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vellum_resolver::NormalizeError;

/// Families of documents the pipeline can produce.
///
/// The kind is declared by the renderer and selects which normalizer runs:
/// LaTeX sources are text, package formats (OPC/Office) are ZIP containers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Latex,
    Package,
    Unknown,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Latex => "latex",
            Self::Package => "package",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// What the renderer reports back. An opaque black box to the pipeline:
/// failure is data here, not an escaping error.
#[derive(Clone, Debug)]
pub struct RenderOutcome {
    pub success: bool,
    pub document_kind: DocumentKind,
    pub error: Option<String>,
}

impl RenderOutcome {
    pub fn ok(document_kind: DocumentKind) -> Self {
        Self {
            success: true,
            document_kind,
            error: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            document_kind: DocumentKind::Unknown,
            error: Some(reason.into()),
        }
    }
}

/// External template renderer.
///
/// Renders `template_path` with `context` into `output_path`. The pipeline
/// never inspects how; it only consumes the outcome and the produced file.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, template_path: &Path, context: &Value, output_path: &Path)
        -> RenderOutcome;
}

/// Per-family canonicalization of generated bytes.
///
/// Must be pure and deterministic. A normalization failure is never fatal
/// to the pipeline: the caller logs it and proceeds with raw bytes.
pub trait Normalizer: Send + Sync {
    fn document_kind(&self) -> DocumentKind;
    fn normalize(&self, bytes: &[u8]) -> Result<Vec<u8>, NormalizeError>;
}

/// Severity of a lint finding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One finding from the template linter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LintIssue {
    pub severity: Severity,
    pub message: String,
    /// Set when the finding is a non-deterministic construct (wall-clock
    /// time, random values, environment reads). These fail the pipeline
    /// under strict mode.
    pub nondeterministic: bool,
}

impl LintIssue {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            nondeterministic: false,
        }
    }

    pub fn nondeterministic(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            nondeterministic: true,
        }
    }
}

/// Report from linting a template source.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LintReport {
    pub valid: bool,
    pub errors: Vec<LintIssue>,
    pub warnings: Vec<LintIssue>,
}

impl LintReport {
    /// All findings flagged as non-deterministic constructs.
    pub fn nondeterministic_findings(&self) -> Vec<&LintIssue> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .filter(|i| i.nondeterministic)
            .collect()
    }
}

/// Report from validating a generation context.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ContextReport {
    pub valid: bool,
    pub issues: Vec<LintIssue>,
}

/// External template linter.
pub trait TemplateLinter: Send + Sync {
    fn lint_template(&self, source: &str, template_ref: &str) -> LintReport;
    fn validate_context(&self, context: &Value) -> ContextReport;
}

/// Opaque comparison result from the semantic differ.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiffOutcome {
    pub identical: bool,
    pub summary: String,
    pub details: Value,
}

/// External semantic differ.
pub trait SemanticDiffer: Send + Sync {
    fn compare(&self, a: &[u8], b: &[u8]) -> DiffOutcome;
}
