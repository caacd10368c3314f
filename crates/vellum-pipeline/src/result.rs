use std::path::PathBuf;
use std::time::Duration;

use vellum_types::DocUri;

/// Per-invocation stage timings.
#[derive(Clone, Debug, Default)]
pub struct StageMetrics {
    /// Whole-invocation wall-clock time.
    pub processing_time: Duration,
    /// Time spent normalizing, verification runs included.
    pub normalization_time: Duration,
    /// Time spent in the verification loop.
    pub verification_time: Duration,
}

/// Outcome of the empirical reproducibility check.
#[derive(Clone, Debug)]
pub struct Verification {
    /// `true` iff every verification run hashed identically to the first
    /// generation.
    pub reproducible: bool,
    /// Hash of the first (stored) generation.
    pub content_hash: String,
    /// Number of additional generation runs performed.
    pub verification_runs: u32,
    /// How many of those runs matched the first hash.
    pub hashes_matched: u32,
    /// Count of distinct hashes observed across first generation and all
    /// runs; 1 when fully reproducible, >= 2 on any divergence.
    pub hash_variation: u32,
    /// Whether a normalizer ran on the generated bytes.
    pub normalization_applied: bool,
}

/// Result of one `process_template` invocation.
///
/// Always returned, never thrown past: failures carry `success: false` and
/// a human-readable `error` alongside whatever timings were gathered.
#[derive(Clone, Debug)]
pub struct ProcessingResult {
    pub success: bool,
    pub reproducible: bool,
    /// Hash of the normalized artifact; absent when generation failed.
    pub content_hash: Option<String>,
    /// Canonical identity, when the destination was a `doc://` reference.
    pub doc_uri: Option<DocUri>,
    /// Filesystem destination, when the output went to a path.
    pub output_path: Option<PathBuf>,
    pub metrics: StageMetrics,
    pub verification: Option<Verification>,
    pub warnings: Vec<String>,
    pub error: Option<String>,
}

impl ProcessingResult {
    pub(crate) fn failure(error: String, warnings: Vec<String>, metrics: StageMetrics) -> Self {
        Self {
            success: false,
            reproducible: false,
            content_hash: None,
            doc_uri: None,
            output_path: None,
            metrics,
            verification: None,
            warnings,
            error: Some(error),
        }
    }
}

/// Aggregate outcome of a sequential batch.
#[derive(Debug)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub reproducible: usize,
    /// `reproducible / succeeded`; 0 when nothing succeeded.
    pub reproducibility_rate: f64,
    /// Per-job results, in input order.
    pub results: Vec<ProcessingResult>,
}
