use vellum_resolver::ResolverError;

/// Errors from the processing pipeline.
///
/// Most of these never escape `process_template`, which folds them into an
/// unsuccessful [`ProcessingResult`](crate::ProcessingResult); they surface
/// directly only from the narrower operations (`compare_documents`,
/// `generate_content_hash`) and from construction.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Template or output URI failed to resolve or store.
    #[error(transparent)]
    Resolver(#[from] ResolverError),

    /// Filesystem failure in a pipeline stage.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Context could not be serialized.
    #[error("context serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The linter found a non-deterministic construct. Fatal only under
    /// strict mode; otherwise downgraded to a warning.
    #[error("non-deterministic template {template_ref}: {}", findings.join("; "))]
    NonDeterministicTemplate {
        template_ref: String,
        findings: Vec<String>,
    },

    /// A declared document kind has no registered normalizer. Fatal only
    /// under strict mode; otherwise the bytes pass through untouched.
    #[error("no normalizer registered for document kind: {0}")]
    UnsupportedDocumentKind(String),

    /// The external renderer reported failure.
    #[error("renderer failed: {0}")]
    Renderer(String),

    /// The renderer exceeded the configured generation deadline.
    #[error("renderer exceeded deadline of {0:?}")]
    RenderTimeout(std::time::Duration),

    /// The requested operation is disabled by configuration.
    #[error("feature disabled: {0}")]
    FeatureDisabled(&'static str),

    /// Construction-time misuse. The only error allowed to escape a
    /// constructor.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
