use std::time::Duration;

use serde::Serialize;

/// Processor-lifetime metrics.
///
/// Created at processor construction and mutated on every processed
/// document; never reset except by dropping the processor.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ProcessorMetrics {
    /// Documents that have gone through the full pipeline, successful or not.
    pub documents_processed: u64,
    /// Cumulative time in the generation stage, verification runs included.
    pub generation_time: Duration,
    /// Cumulative time in the normalization stage.
    pub normalization_time: Duration,
    /// Cumulative time in the linting stage.
    pub linting_time: Duration,
    /// Cumulative wall-clock time across whole invocations.
    pub total_time: Duration,
    /// Running mean of per-document reproducibility outcomes.
    pub reproducibility_rate: f64,
}

impl ProcessorMetrics {
    /// Fold one document's outcome into the running mean.
    ///
    /// Exact incremental mean: `rate' = (rate * (n-1) + outcome) / n` with
    /// `n` the post-increment document count and outcome in {0, 1}. This is
    /// not an exponential moving average; every document weighs equally no
    /// matter how old.
    pub fn record_document(&mut self, reproducible: bool) {
        self.documents_processed += 1;
        let n = self.documents_processed as f64;
        let outcome = if reproducible { 1.0 } else { 0.0 };
        self.reproducibility_rate = (self.reproducibility_rate * (n - 1.0) + outcome) / n;
    }

    pub fn add_generation_time(&mut self, elapsed: Duration) {
        self.generation_time += elapsed;
    }

    pub fn add_normalization_time(&mut self, elapsed: Duration) {
        self.normalization_time += elapsed;
    }

    pub fn add_linting_time(&mut self, elapsed: Duration) {
        self.linting_time += elapsed;
    }

    pub fn add_total_time(&mut self, elapsed: Duration) {
        self.total_time += elapsed;
    }
}
