//! Prometheus metric registration and export.
//!
//! Every run owns its own [`Registry`], so concurrent runs (and tests) never
//! share counters.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Metrics for one benchmark run. Cloning shares the underlying registry.
#[derive(Clone)]
pub struct BenchMetrics {
    pub(super) registry: Registry,
    /// Attempts, labeled by mode and outcome (valid, invalid, provider_error, timeout).
    pub(super) attempts_total: IntCounterVec,
    /// Retries consumed, labeled by mode.
    pub(super) retries_total: IntCounterVec,
    /// Attempt duration in seconds, labeled by mode.
    pub(super) attempt_duration: HistogramVec,
    /// Distribution of total scores, labeled by mode.
    pub(super) score_total: HistogramVec,
    /// Prompts completed, labeled by status (success, failure).
    pub(super) prompts_total: IntCounterVec,
}

impl std::fmt::Debug for BenchMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchMetrics").finish_non_exhaustive()
    }
}

impl BenchMetrics {
    /// Creates and registers all run metrics.
    ///
    /// # Errors
    ///
    /// Returns a `prometheus::Error` if a metric definition is invalid or a
    /// name is registered twice.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let attempts_total = IntCounterVec::new(
            Opts::new(
                "component_bench_attempts_total",
                "Generation attempts by mode and outcome",
            ),
            &["mode", "outcome"],
        )?;

        let retries_total = IntCounterVec::new(
            Opts::new("component_bench_retries_total", "Retries consumed by mode"),
            &["mode"],
        )?;

        let attempt_duration = HistogramVec::new(
            HistogramOpts::new(
                "component_bench_attempt_duration_seconds",
                "Generation attempt duration in seconds",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0, 120.0]),
            &["mode"],
        )?;

        let score_total = HistogramVec::new(
            HistogramOpts::new("component_bench_score_total", "Distribution of total scores")
                .buckets(vec![
                    10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0,
                ]),
            &["mode"],
        )?;

        let prompts_total = IntCounterVec::new(
            Opts::new("component_bench_prompts_total", "Prompts processed by status"),
            &["status"],
        )?;

        registry.register(Box::new(attempts_total.clone()))?;
        registry.register(Box::new(retries_total.clone()))?;
        registry.register(Box::new(attempt_duration.clone()))?;
        registry.register(Box::new(score_total.clone()))?;
        registry.register(Box::new(prompts_total.clone()))?;

        tracing::debug!("Prometheus metrics registered");

        Ok(Self {
            registry,
            attempts_total,
            retries_total,
            attempt_duration,
            score_total,
            prompts_total,
        })
    }

    /// Exports every registered metric in Prometheus text format.
    pub fn export(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            return format!("# Error encoding metrics: {}\n", e);
        }

        String::from_utf8(buffer)
            .unwrap_or_else(|e| format!("# Error converting metrics to UTF-8: {}\n", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registries_are_independent() {
        let a = BenchMetrics::new().expect("metrics a");
        let b = BenchMetrics::new().expect("metrics b");

        a.retries_total.with_label_values(&["baseline"]).inc();

        assert!(a.export().contains("component_bench_retries_total{mode=\"baseline\"} 1"));
        assert!(!b.export().contains("mode=\"baseline\""));
    }

    #[test]
    fn test_export_is_text_format() {
        let metrics = BenchMetrics::new().expect("metrics");
        metrics
            .attempts_total
            .with_label_values(&["enhanced", "valid"])
            .inc();
        let text = metrics.export();
        assert!(!text.starts_with("# Error"));
        assert!(text.contains("# TYPE component_bench_attempts_total counter"));
    }
}
