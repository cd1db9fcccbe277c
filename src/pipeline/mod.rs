//! Benchmark pipeline orchestration.
//!
//! # Pipeline Flow
//!
//! 1. **Corpus**: prompt files are discovered, parsed and filtered
//! 2. **Preparation**: output and report directories are created and probed;
//!    any failure here aborts the run before a prompt is touched
//! 3. **Batches**: prompts are processed `max_parallel` at a time
//! 4. **Per prompt**: baseline generation with retries, scoring, then
//!    enhancement seeded with the baseline artifact, scoring
//! 5. **Aggregation**: results are sorted by prompt id into a [`BenchmarkRun`]
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use component_bench::pipeline::{BatchOrchestrator, BenchmarkConfig};
//! use component_bench::provider::TemplateProvider;
//!
//! let config = BenchmarkConfig::from_env()?
//!     .with_max_parallel(4)
//!     .with_baseline_only(false);
//!
//! let orchestrator = BatchOrchestrator::new(config, Arc::new(TemplateProvider::new()))?;
//! let run = orchestrator.execute(None).await?;
//!
//! println!("{} succeeded, {} failed", run.success_count(), run.failure_count());
//! ```

pub mod config;
pub mod orchestrator;
pub mod run;
pub mod stats;

pub use config::{BenchmarkConfig, ConfigError, DEFAULT_MAX_PARALLEL};
pub use orchestrator::{BatchOrchestrator, BenchmarkEvent};
pub use run::{ArtifactRef, BenchmarkRun, ComponentResult, RunConfigSummary};
pub use stats::{ModeStats, RunStats};
