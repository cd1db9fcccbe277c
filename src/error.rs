//! Error types for component-bench operations.
//!
//! Errors are split by how far they are allowed to travel:
//! - Infrastructure errors abort a run before any prompt is processed
//! - Generation errors are consumed by the retry controller and surface as data
//! - Report errors come from rendering or persisting report artifacts

use std::path::PathBuf;

use thiserror::Error;

/// Infrastructure-level errors. These are the only errors that escape a run.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Prompt directory '{0}' does not exist")]
    PromptDirMissing(PathBuf),

    #[error("Prompt directory '{path}' could not be read: {reason}")]
    PromptDirUnreadable { path: PathBuf, reason: String },

    #[error("No prompt files found in '{0}'")]
    NoPrompts(PathBuf),

    #[error("No prompt matches filter '{0}'")]
    FilterMatchedNothing(String),

    #[error("Output directory '{path}' is not writable: {reason}")]
    OutputDirUnwritable { path: PathBuf, reason: String },

    #[error("Run summary already exists at '{0}'")]
    SummaryExists(PathBuf),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::pipeline::ConfigError),

    #[error("Rubric error: {0}")]
    Rubric(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}

/// Errors produced by a single generation attempt.
///
/// All variants are recoverable: the retry controller consumes them and
/// records the last one on the attempt once retries are exhausted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Provider failed: {0}")]
    Provider(String),

    #[error("Attempt timed out after {millis} ms")]
    Timeout { millis: u64 },

    #[error("Invalid artifact: {}", .reasons.join("; "))]
    InvalidArtifact { reasons: Vec<String> },

    #[error("Enhancement requires a baseline artifact")]
    MissingSeed,
}

/// Errors that can occur while rendering or writing reports.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Template rendering error: {0}")]
    Tera(#[from] tera::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
