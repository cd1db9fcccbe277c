//! Recording helpers used by the retry controller and orchestrator.

use super::prometheus::BenchMetrics;
use crate::provider::GenerationMode;

impl BenchMetrics {
    /// Records one generation attempt.
    ///
    /// * `outcome` - `valid`, `invalid`, `provider_error` or `timeout`
    /// * `duration_secs` - wall time of the attempt, validation included
    pub fn record_attempt(&self, mode: GenerationMode, outcome: &str, duration_secs: f64) {
        self.attempts_total
            .with_label_values(&[mode.as_str(), outcome])
            .inc();
        self.attempt_duration
            .with_label_values(&[mode.as_str()])
            .observe(duration_secs);

        tracing::trace!(
            mode = %mode,
            outcome = outcome,
            duration_secs = duration_secs,
            "Recorded attempt metric"
        );
    }

    pub fn record_retry(&self, mode: GenerationMode) {
        self.retries_total.with_label_values(&[mode.as_str()]).inc();
    }

    /// Records the total score of a scored artifact.
    pub fn record_score(&self, mode: GenerationMode, total: u32) {
        self.score_total
            .with_label_values(&[mode.as_str()])
            .observe(f64::from(total));
    }

    /// Records a finished prompt; `status` is `success` or `failure`.
    pub fn record_prompt(&self, status: &str) {
        self.prompts_total.with_label_values(&[status]).inc();
    }
}
