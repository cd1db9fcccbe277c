//! component-bench: benchmark engine for prompt-driven UI component generation.
//!
//! This library loads a prompt corpus, drives each prompt through baseline
//! and enhanced generation with bounded retries, validates and scores the
//! artifacts, and aggregates the results into persisted reports.

// Core modules
pub mod cli;
pub mod corpus;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod provider;
pub mod report;
pub mod retry;
pub mod scoring;
pub mod storage;
pub mod validation;

// Re-export commonly used error types
pub use error::{BenchError, GenerationError, ReportError};
