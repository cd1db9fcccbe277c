//! The `BenchmarkRun` aggregate root and its per-prompt results.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::corpus::PromptRecord;
use crate::scoring::ScoreRecord;

use super::config::BenchmarkConfig;
use super::stats::RunStats;

/// Configuration values recorded with the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfigSummary {
    pub enhancement_enabled: bool,
    pub max_retries: u32,
    pub max_parallel: usize,
    pub attempt_timeout_secs: u64,
}

impl From<&BenchmarkConfig> for RunConfigSummary {
    fn from(config: &BenchmarkConfig) -> Self {
        Self {
            enhancement_enabled: config.enhancement_enabled(),
            max_retries: config.max_retries,
            max_parallel: config.max_parallel,
            attempt_timeout_secs: config.attempt_timeout.as_secs(),
        }
    }
}

/// A file written for one prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// `prompt`, `baseline` or `enhanced`.
    pub kind: String,
    pub path: PathBuf,
    /// Hex-encoded SHA-256 of the file contents.
    pub sha256: String,
}

/// Outcome of one prompt.
///
/// A result with `error` set has no scores. `improvement` is
/// `enhanced.total - baseline.total` when both scores exist, otherwise 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentResult {
    pub prompt_id: String,
    pub component_kind: String,
    pub baseline_score: Option<ScoreRecord>,
    pub enhanced_score: Option<ScoreRecord>,
    pub improvement: i32,
    pub baseline_retries: u32,
    pub enhanced_retries: u32,
    /// Baseline failure; the prompt failed.
    pub error: Option<String>,
    /// Enhancement failure; baseline scores stand.
    #[serde(default)]
    pub enhancement_error: Option<String>,
    #[serde(default)]
    pub artifacts: Vec<ArtifactRef>,
}

impl ComponentResult {
    /// A prompt whose baseline exhausted its retries.
    pub fn failed(prompt: &PromptRecord, baseline_retries: u32, error: impl Into<String>) -> Self {
        Self {
            prompt_id: prompt.id.clone(),
            component_kind: prompt.component_kind.clone(),
            baseline_score: None,
            enhanced_score: None,
            improvement: 0,
            baseline_retries,
            enhanced_retries: 0,
            error: Some(error.into()),
            enhancement_error: None,
            artifacts: Vec::new(),
        }
    }

    /// A prompt with a scored baseline.
    pub fn scored(prompt: &PromptRecord, baseline: ScoreRecord, baseline_retries: u32) -> Self {
        Self {
            prompt_id: prompt.id.clone(),
            component_kind: prompt.component_kind.clone(),
            baseline_score: Some(baseline),
            enhanced_score: None,
            improvement: 0,
            baseline_retries,
            enhanced_retries: 0,
            error: None,
            enhancement_error: None,
            artifacts: Vec::new(),
        }
    }

    /// Attaches the enhanced score and recomputes the improvement.
    pub fn with_enhanced(mut self, enhanced: ScoreRecord, enhanced_retries: u32) -> Self {
        self.enhanced_score = Some(enhanced);
        self.enhanced_retries = enhanced_retries;
        self.improvement = self.expected_improvement();
        self
    }

    /// Records an enhancement that exhausted its retries.
    pub fn with_enhancement_error(mut self, enhanced_retries: u32, error: impl Into<String>) -> Self {
        self.enhanced_retries = enhanced_retries;
        self.enhancement_error = Some(error.into());
        self.improvement = self.expected_improvement();
        self
    }

    pub fn with_artifacts(mut self, artifacts: Vec<ArtifactRef>) -> Self {
        self.artifacts = artifacts;
        self
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    /// The improvement implied by the scores present.
    pub fn expected_improvement(&self) -> i32 {
        match (&self.baseline_score, &self.enhanced_score) {
            (Some(b), Some(e)) => e.total as i32 - b.total as i32,
            _ => 0,
        }
    }

    /// Retries consumed by both modes.
    pub fn total_retries(&self) -> u32 {
        self.baseline_retries + self.enhanced_retries
    }

    /// The enhanced score when present, otherwise the baseline score.
    pub fn best_score(&self) -> Option<&ScoreRecord> {
        self.enhanced_score.as_ref().or(self.baseline_score.as_ref())
    }
}

/// Aggregate root of a benchmark run.
///
/// Built by the orchestrator, persisted once, and read by the report
/// aggregator without modification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRun {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub config: RunConfigSummary,
    pub stats: RunStats,
    pub prompt_count: usize,
    /// Sorted by prompt id.
    pub results: Vec<ComponentResult>,
}

impl BenchmarkRun {
    pub fn new(config: RunConfigSummary) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            config,
            stats: RunStats::new(),
            prompt_count: 0,
            results: Vec::new(),
        }
    }

    pub fn success_count(&self) -> u64 {
        self.stats.success
    }

    pub fn failure_count(&self) -> u64 {
        self.stats.failure
    }

    pub fn retry_count(&self) -> u64 {
        self.stats.retries
    }

    /// File-name stamp: UTC time plus the first eight characters of the run id.
    pub fn stamp(&self) -> String {
        let id = self.run_id.simple().to_string();
        format!("{}-{}", self.timestamp.format("%Y%m%dT%H%M%SZ"), &id[..8])
    }

    pub(super) fn sort_results(&mut self) {
        self.results.sort_by(|a, b| a.prompt_id.cmp(&b.prompt_id));
    }
}
