//! No-op collaborator implementations.
//!
//! These keep the pipeline fully deterministic in unit tests and serve as
//! the fallback wiring when a deployment brings only a renderer.

use serde_json::Value;
use vellum_resolver::NormalizeError;

use crate::traits::{
    ContextReport, DiffOutcome, DocumentKind, LintReport, Normalizer, SemanticDiffer,
    TemplateLinter,
};

/// Identity normalizer for a fixed document kind.
pub struct PassthroughNormalizer {
    kind: DocumentKind,
}

impl PassthroughNormalizer {
    pub fn new(kind: DocumentKind) -> Self {
        Self { kind }
    }
}

impl Normalizer for PassthroughNormalizer {
    fn document_kind(&self) -> DocumentKind {
        self.kind
    }

    fn normalize(&self, bytes: &[u8]) -> Result<Vec<u8>, NormalizeError> {
        Ok(bytes.to_vec())
    }
}

/// Linter that accepts every template and context.
pub struct PermissiveLinter;

impl TemplateLinter for PermissiveLinter {
    fn lint_template(&self, _source: &str, _template_ref: &str) -> LintReport {
        LintReport {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn validate_context(&self, _context: &Value) -> ContextReport {
        ContextReport {
            valid: true,
            issues: Vec::new(),
        }
    }
}

/// Differ that compares raw bytes for equality. The semantic comparison a
/// real differ performs is out of scope here; byte identity is the
/// strictest possible answer.
pub struct ByteDiffer;

impl SemanticDiffer for ByteDiffer {
    fn compare(&self, a: &[u8], b: &[u8]) -> DiffOutcome {
        let identical = a == b;
        DiffOutcome {
            identical,
            summary: if identical {
                "byte-identical".to_string()
            } else {
                format!("differ: {} vs {} bytes", a.len(), b.len())
            },
            details: Value::Null,
        }
    }
}
