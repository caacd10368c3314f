use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::Value;
use uuid::Uuid;
use vellum_resolver::{compute_content_hash, ResolveOptions, StoreOptions, UriResolver};
use vellum_types::{ContentMetadata, Provenance};

use crate::config::ProcessorConfig;
use crate::context;
use crate::defaults::{ByteDiffer, PermissiveLinter};
use crate::error::{PipelineError, PipelineResult};
use crate::metrics::ProcessorMetrics;
use crate::result::{BatchReport, ProcessingResult, StageMetrics, Verification};
use crate::traits::{DiffOutcome, DocumentKind, Normalizer, Renderer, SemanticDiffer, TemplateLinter};

/// One unit of batch work.
#[derive(Clone, Debug)]
pub struct ProcessJob {
    pub template_ref: String,
    pub context: Value,
    pub output_ref: String,
}

/// One generation + normalization pass.
struct GenerationRun {
    bytes: Vec<u8>,
    kind: DocumentKind,
    normalized: bool,
    normalization_time: Duration,
}

// ---------------------------------------------------------------------------
// DeterministicProcessor
// ---------------------------------------------------------------------------

/// Orchestrates the deterministic generation pipeline.
///
/// Holds one [`UriResolver`], the external collaborators, and
/// processor-lifetime [`ProcessorMetrics`]. One `process_template` call runs
/// its stages strictly in sequence; the processor takes no locks across
/// concurrent calls, so callers must not alias output destinations.
pub struct DeterministicProcessor {
    resolver: Arc<UriResolver>,
    renderer: Arc<dyn Renderer>,
    normalizers: Vec<Arc<dyn Normalizer>>,
    linter: Arc<dyn TemplateLinter>,
    differ: Arc<dyn SemanticDiffer>,
    config: ProcessorConfig,
    metrics: Mutex<ProcessorMetrics>,
}

impl DeterministicProcessor {
    /// Create a processor over a resolver and a renderer.
    ///
    /// Starts with a permissive linter, a byte differ, and no normalizers;
    /// attach real collaborators with the `with_*` builders. The only
    /// failure mode is an invalid configuration.
    pub fn new(
        resolver: Arc<UriResolver>,
        renderer: Arc<dyn Renderer>,
        config: ProcessorConfig,
    ) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self {
            resolver,
            renderer,
            normalizers: Vec::new(),
            linter: Arc::new(PermissiveLinter),
            differ: Arc::new(ByteDiffer),
            config,
            metrics: Mutex::new(ProcessorMetrics::default()),
        })
    }

    /// Register a normalizer for its document kind.
    pub fn with_normalizer(mut self, normalizer: Arc<dyn Normalizer>) -> Self {
        self.normalizers.push(normalizer);
        self
    }

    /// Replace the template linter.
    pub fn with_linter(mut self, linter: Arc<dyn TemplateLinter>) -> Self {
        self.linter = linter;
        self
    }

    /// Replace the semantic differ.
    pub fn with_differ(mut self, differ: Arc<dyn SemanticDiffer>) -> Self {
        self.differ = differ;
        self
    }

    /// The processor's configuration.
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Snapshot of the processor-lifetime metrics.
    pub fn metrics(&self) -> ProcessorMetrics {
        self.metrics.lock().expect("lock poisoned").clone()
    }

    // -----------------------------------------------------------------------
    // process_template
    // -----------------------------------------------------------------------

    /// Run the full pipeline for one (template, context) pair.
    ///
    /// Never panics and never propagates an error: every outcome, including
    /// failure, is folded into the returned [`ProcessingResult`]. Every call
    /// counts one document in the lifetime metrics, with failure recorded as
    /// a non-reproducible outcome.
    pub async fn process_template(
        &self,
        template_ref: &str,
        context: &Value,
        output_ref: &str,
    ) -> ProcessingResult {
        let started = Instant::now();
        let mut warnings = Vec::new();
        let mut tempfiles = Vec::new();

        let outcome = self
            .run_pipeline(template_ref, context, output_ref, &mut warnings, &mut tempfiles)
            .await;
        self.cleanup(&tempfiles).await;

        let mut result = match outcome {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(template = template_ref, error = %e, "pipeline failed");
                ProcessingResult::failure(e.to_string(), warnings, StageMetrics::default())
            }
        };
        result.metrics.processing_time = started.elapsed();

        let mut metrics = self.metrics.lock().expect("lock poisoned");
        metrics.record_document(result.reproducible);
        metrics.add_total_time(result.metrics.processing_time);
        result
    }

    async fn run_pipeline(
        &self,
        template_ref: &str,
        context: &Value,
        output_ref: &str,
        warnings: &mut Vec<String>,
        tempfiles: &mut Vec<PathBuf>,
    ) -> PipelineResult<ProcessingResult> {
        // Stage 1: resolve the template to a local path.
        let template_path = self.resolve_template(template_ref, tempfiles).await?;

        // Stage 2: validate template and context.
        if self.config.lint_templates {
            self.lint(&template_path, template_ref, context, warnings).await?;
        }

        // Stages 3 + 4: generate and normalize.
        let run = self
            .generate_and_normalize(&template_path, context, Some(warnings), tempfiles)
            .await?;
        let content_hash = compute_content_hash(&run.bytes, self.config.default_algorithm);

        // Stage 5: store canonically or copy to the requested path.
        let (doc_uri, output_path) = self
            .store_output(template_ref, context, output_ref, &run, warnings)
            .await?;

        // Stage 6: certify reproducibility by regeneration.
        let verify_started = Instant::now();
        let mut normalization_time = run.normalization_time;
        let runs = self.config.verification_runs;
        let mut matched = 0u32;
        let mut observed: Vec<String> = vec![content_hash.clone()];
        for attempt in 1..=runs {
            match self
                .generate_and_normalize(&template_path, context, None, tempfiles)
                .await
            {
                Ok(rerun) => {
                    let hash = compute_content_hash(&rerun.bytes, self.config.default_algorithm);
                    normalization_time += rerun.normalization_time;
                    if hash == content_hash {
                        matched += 1;
                    }
                    if !observed.contains(&hash) {
                        observed.push(hash);
                    }
                }
                Err(e) => {
                    // A run that cannot even regenerate counts as divergence.
                    warnings.push(format!("verification run {attempt} failed: {e}"));
                    let marker = format!("(run {attempt} failed)");
                    observed.push(marker);
                }
            }
        }
        let verification_time = verify_started.elapsed();

        let reproducible = matched == runs;
        if !reproducible {
            tracing::warn!(
                template = template_ref,
                hash_variation = observed.len(),
                hashes_matched = matched,
                "document did not reproduce"
            );
        }

        Ok(ProcessingResult {
            success: true,
            reproducible,
            content_hash: Some(content_hash.clone()),
            doc_uri,
            output_path,
            metrics: StageMetrics {
                processing_time: Duration::ZERO, // set by the caller
                normalization_time,
                verification_time,
            },
            verification: Some(Verification {
                reproducible,
                content_hash,
                verification_runs: runs,
                hashes_matched: matched,
                hash_variation: observed.len() as u32,
                normalization_applied: run.normalized,
            }),
            warnings: std::mem::take(warnings),
            error: None,
        })
    }

    // -----------------------------------------------------------------------
    // Stages
    // -----------------------------------------------------------------------

    async fn resolve_template(
        &self,
        template_ref: &str,
        tempfiles: &mut Vec<PathBuf>,
    ) -> PipelineResult<PathBuf> {
        if template_ref.starts_with("doc://") {
            let resolution = self
                .resolver
                .resolve(template_ref, &ResolveOptions::default())
                .await?;
            let path = self.temp_path("template");
            tokio::fs::write(&path, &resolution.content).await?;
            tempfiles.push(path.clone());
            Ok(path)
        } else {
            let path = template_ref.strip_prefix("file://").unwrap_or(template_ref);
            Ok(PathBuf::from(path))
        }
    }

    async fn lint(
        &self,
        template_path: &Path,
        template_ref: &str,
        context: &Value,
        warnings: &mut Vec<String>,
    ) -> PipelineResult<()> {
        let lint_started = Instant::now();
        let outcome = match tokio::fs::read_to_string(template_path).await {
            Ok(source) => {
                let report = self.linter.lint_template(&source, template_ref);
                let findings: Vec<String> = report
                    .nondeterministic_findings()
                    .iter()
                    .map(|i| i.message.clone())
                    .collect();
                if !findings.is_empty() && self.config.strict_mode {
                    Err(PipelineError::NonDeterministicTemplate {
                        template_ref: template_ref.to_string(),
                        findings,
                    })
                } else {
                    for finding in findings {
                        warnings.push(format!("non-deterministic construct: {finding}"));
                    }
                    for issue in report
                        .errors
                        .iter()
                        .chain(report.warnings.iter())
                        .filter(|i| !i.nondeterministic)
                    {
                        warnings.push(format!("lint: {}", issue.message));
                    }
                    let context_report = self.linter.validate_context(context);
                    for issue in &context_report.issues {
                        warnings.push(format!("context: {}", issue.message));
                    }
                    Ok(())
                }
            }
            // Downgraded: an unreadable source only costs the lint pass.
            Err(e) => {
                warnings.push(format!("template source unavailable for linting: {e}"));
                Ok(())
            }
        };
        self.metrics
            .lock()
            .expect("lock poisoned")
            .add_linting_time(lint_started.elapsed());
        outcome
    }

    async fn generate_and_normalize(
        &self,
        template_path: &Path,
        context: &Value,
        mut warnings: Option<&mut Vec<String>>,
        tempfiles: &mut Vec<PathBuf>,
    ) -> PipelineResult<GenerationRun> {
        // Isolated output per run: process-unique temp names keep
        // concurrent invocations and verification reruns apart.
        let output_path = self.temp_path("render");
        tempfiles.push(output_path.clone());

        let generation_started = Instant::now();
        let render = self.renderer.render(template_path, context, &output_path);
        let outcome = match self.config.generation_timeout {
            Some(deadline) => tokio::time::timeout(deadline, render)
                .await
                .map_err(|_| PipelineError::RenderTimeout(deadline))?,
            None => render.await,
        };
        self.metrics
            .lock()
            .expect("lock poisoned")
            .add_generation_time(generation_started.elapsed());

        if !outcome.success {
            return Err(PipelineError::Renderer(
                outcome.error.unwrap_or_else(|| "renderer reported failure".to_string()),
            ));
        }

        let raw = tokio::fs::read(&output_path).await?;
        let normalization_started = Instant::now();
        let (bytes, normalized) = match self.normalizer_for(outcome.document_kind) {
            Some(normalizer) => match normalizer.normalize(&raw) {
                Ok(canonical) => (canonical, true),
                // Best-effort canonicalization, not a correctness gate.
                Err(e) => {
                    tracing::warn!(
                        kind = %outcome.document_kind,
                        error = %e,
                        "normalization failed; continuing with raw bytes"
                    );
                    if let Some(warnings) = warnings.as_mut() {
                        warnings.push(format!("normalization failed: {e}"));
                    }
                    (raw, false)
                }
            },
            None => {
                if self.config.strict_mode && outcome.document_kind != DocumentKind::Unknown {
                    return Err(PipelineError::UnsupportedDocumentKind(
                        outcome.document_kind.to_string(),
                    ));
                }
                (raw, false)
            }
        };
        let normalization_time = normalization_started.elapsed();
        self.metrics
            .lock()
            .expect("lock poisoned")
            .add_normalization_time(normalization_time);

        Ok(GenerationRun {
            bytes,
            kind: outcome.document_kind,
            normalized,
            normalization_time,
        })
    }

    async fn store_output(
        &self,
        template_ref: &str,
        context: &Value,
        output_ref: &str,
        run: &GenerationRun,
        warnings: &mut Vec<String>,
    ) -> PipelineResult<(Option<vellum_types::DocUri>, Option<PathBuf>)> {
        if output_ref.starts_with("doc://") {
            let metadata = ContentMetadata {
                size: run.bytes.len() as u64,
                content_kind: Some(run.kind.to_string()),
                source: Some(template_ref.to_string()),
                provenance: Some(Provenance::generated(
                    template_ref,
                    context::sanitize_context(context),
                )),
            };
            let options = StoreOptions {
                algorithm: Some(self.config.default_algorithm),
                // Stage 4 already canonicalized these bytes.
                skip_normalization: true,
                content_kind: Some(run.kind.to_string()),
            };
            let stored = self.resolver.store_document(&run.bytes, metadata, &options).await?;
            if stored.existed {
                warnings.push("identical artifact already stored".to_string());
            }
            Ok((Some(stored.uri), None))
        } else {
            let path = PathBuf::from(output_ref.strip_prefix("file://").unwrap_or(output_ref));
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
            tokio::fs::write(&path, &run.bytes).await?;
            Ok((None, Some(path)))
        }
    }

    async fn cleanup(&self, tempfiles: &[PathBuf]) {
        for path in tempfiles {
            if let Err(e) = tokio::fs::remove_file(path).await {
                // Never surfaced, but never silent either.
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "temp cleanup failed");
                }
            }
        }
    }

    fn normalizer_for(&self, kind: DocumentKind) -> Option<&Arc<dyn Normalizer>> {
        self.normalizers.iter().find(|n| n.document_kind() == kind)
    }

    fn temp_path(&self, label: &str) -> PathBuf {
        let dir = self
            .config
            .temp_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        dir.join(format!(
            "vellum-{label}-{}-{}.tmp",
            std::process::id(),
            Uuid::new_v4()
        ))
    }

    // -----------------------------------------------------------------------
    // Other operations
    // -----------------------------------------------------------------------

    /// Hand two documents' bytes to the semantic differ.
    pub async fn compare_documents(&self, path_a: &Path, path_b: &Path) -> PipelineResult<DiffOutcome> {
        if !self.config.enable_comparison {
            return Err(PipelineError::FeatureDisabled("document comparison"));
        }
        let a = tokio::fs::read(path_a).await?;
        let b = tokio::fs::read(path_b).await?;
        Ok(self.differ.compare(&a, &b))
    }

    /// Process jobs strictly in input order, one at a time.
    ///
    /// No internal concurrency: jobs share the renderer's temp directories,
    /// and ordering is part of the contract.
    pub async fn batch_process(&self, jobs: &[ProcessJob]) -> BatchReport {
        let mut results = Vec::with_capacity(jobs.len());
        for job in jobs {
            results.push(
                self.process_template(&job.template_ref, &job.context, &job.output_ref)
                    .await,
            );
        }
        let succeeded = results.iter().filter(|r| r.success).count();
        let reproducible = results.iter().filter(|r| r.success && r.reproducible).count();
        BatchReport {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            reproducible,
            reproducibility_rate: if succeeded == 0 {
                0.0
            } else {
                reproducible as f64 / succeeded as f64
            },
            results,
        }
    }

    /// Predict the identity of a (template, context) pair without rendering.
    ///
    /// Hashes the template bytes followed by the canonical serialization of
    /// the raw context; key order never matters.
    pub async fn generate_content_hash(
        &self,
        template_ref: &str,
        context: &Value,
    ) -> PipelineResult<String> {
        let template = if template_ref.starts_with("doc://") {
            self.resolver
                .resolve(template_ref, &ResolveOptions::default())
                .await?
                .content
        } else {
            let path = template_ref.strip_prefix("file://").unwrap_or(template_ref);
            tokio::fs::read(path).await?
        };
        Ok(context::content_hash_for(&template, context, self.config.default_algorithm))
    }

    /// Provenance-safe form of a context. See [`context::sanitize_context`].
    pub fn sanitize_context(&self, context: &Value) -> Value {
        context::sanitize_context(context)
    }

    /// Advisory environment self-check.
    ///
    /// Environment drift (toolchain family, timezone, locale, epoch
    /// pinning) is a real source of non-reproducibility that hashing
    /// cannot see. This only warns; it never blocks processing.
    pub fn validate_configuration(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        // Toolchain family check against an explicit pin, when one is set.
        if let Ok(pinned) = std::env::var("VELLUM_RUSTC_VERSION") {
            let built = env!("CARGO_PKG_RUST_VERSION");
            if pinned.trim() != built {
                warnings.push(format!(
                    "toolchain pin VELLUM_RUSTC_VERSION={pinned} does not match \
                     this build's rust-version {built}; rebuilds on another \
                     toolchain may render differently"
                ));
            }
        }
        match std::env::var("TZ") {
            Ok(tz) if tz == "UTC" => {}
            Ok(tz) => warnings.push(format!(
                "TZ is '{tz}'; time-sensitive templates may render differently on other hosts"
            )),
            Err(_) => warnings.push(
                "TZ is unset; renderers will use the host timezone".to_string(),
            ),
        }
        let locale = std::env::var("LC_ALL")
            .or_else(|_| std::env::var("LANG"))
            .unwrap_or_default();
        if !locale.to_ascii_uppercase().contains("UTF-8") && !locale.to_ascii_uppercase().contains("UTF8") {
            warnings.push(format!(
                "locale '{locale}' is not UTF-8; text collation in templates may vary"
            ));
        }
        if std::env::var("SOURCE_DATE_EPOCH").is_err() {
            warnings.push(
                "SOURCE_DATE_EPOCH is unset; renderers that embed build dates will not reproduce"
                    .to_string(),
            );
        }
        for warning in &warnings {
            tracing::warn!(check = "environment", "{warning}");
        }
        warnings
    }
}

impl std::fmt::Debug for DeterministicProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeterministicProcessor")
            .field("config", &self.config)
            .field("normalizers", &self.normalizers.len())
            .finish()
    }
}
