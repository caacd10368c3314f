use std::path::PathBuf;
use std::time::Duration;

use vellum_types::HashAlgorithm;

use crate::error::{PipelineError, PipelineResult};

/// Configuration for a [`DeterministicProcessor`](crate::DeterministicProcessor).
#[derive(Clone, Debug)]
pub struct ProcessorConfig {
    /// Run the template linter before generation.
    pub lint_templates: bool,
    /// Fail the pipeline on non-deterministic lint findings and on document
    /// kinds with no registered normalizer. Off by default: findings become
    /// warnings and unknown kinds pass through un-normalized.
    pub strict_mode: bool,
    /// Number of additional generation runs used to certify reproducibility.
    pub verification_runs: u32,
    /// Allow `compare_documents`.
    pub enable_comparison: bool,
    /// Deadline for each renderer invocation. `None` lets a hung renderer
    /// stall the pipeline indefinitely.
    pub generation_timeout: Option<Duration>,
    /// Algorithm for artifact hashing and storage.
    pub default_algorithm: HashAlgorithm,
    /// Directory for temp files; the system temp dir when `None`.
    pub temp_dir: Option<PathBuf>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            lint_templates: true,
            strict_mode: false,
            verification_runs: 3,
            enable_comparison: true,
            generation_timeout: None,
            default_algorithm: HashAlgorithm::Sha256,
            temp_dir: None,
        }
    }
}

impl ProcessorConfig {
    /// Reject configurations the pipeline cannot honor. Called at
    /// processor construction; the only place a pipeline error may escape
    /// outside a result value.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.verification_runs == 0 {
            return Err(PipelineError::InvalidConfiguration(
                "verification_runs must be at least 1".to_string(),
            ));
        }
        if let Some(timeout) = self.generation_timeout {
            if timeout.is_zero() {
                return Err(PipelineError::InvalidConfiguration(
                    "generation_timeout must be non-zero when set".to_string(),
                ));
            }
        }
        Ok(())
    }
}
