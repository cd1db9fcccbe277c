//! Prometheus metrics for benchmark runs.
//!
//! ```ignore
//! use component_bench::metrics::BenchMetrics;
//!
//! let metrics = BenchMetrics::new()?;
//! metrics.record_retry(GenerationMode::Baseline);
//! std::fs::write("metrics.prom", metrics.export())?;
//! ```

pub mod collectors;
pub mod prometheus;

pub use prometheus::BenchMetrics;
