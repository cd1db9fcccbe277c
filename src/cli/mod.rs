//! Command-line interface for component-bench.
//!
//! Provides commands for running benchmarks, re-rendering reports, and
//! validating or scoring individual component files.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli, Commands};
