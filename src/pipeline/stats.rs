//! Run-wide counters.
//!
//! Owned by the orchestrator and updated only between batches, after every
//! task of the batch has settled.

use serde::{Deserialize, Serialize};

use crate::provider::GenerationMode;

/// Per-mode counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeStats {
    /// Artifacts that passed validation in this mode.
    pub generated: u64,
}

/// Statistics about a benchmark run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Prompts whose baseline succeeded.
    pub success: u64,
    /// Prompts whose baseline exhausted its retries.
    pub failure: u64,
    /// Retries consumed across all prompts and modes.
    pub retries: u64,
    pub baseline: ModeStats,
    pub enhanced: ModeStats,
}

impl RunStats {
    /// Creates new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self) {
        self.success += 1;
    }

    pub fn record_failure(&mut self) {
        self.failure += 1;
    }

    pub fn record_retries(&mut self, retries: u32) {
        self.retries += u64::from(retries);
    }

    /// Records one validated artifact for `mode`.
    pub fn record_generated(&mut self, mode: GenerationMode) {
        match mode {
            GenerationMode::Baseline => self.baseline.generated += 1,
            GenerationMode::Enhanced => self.enhanced.generated += 1,
        }
    }

    /// Prompts processed so far.
    pub fn processed(&self) -> u64 {
        self.success + self.failure
    }

    /// Share of processed prompts that succeeded, in `[0, 1]`. Zero when
    /// nothing was processed.
    pub fn success_rate(&self) -> f64 {
        match self.processed() {
            0 => 0.0,
            n => self.success as f64 / n as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stats_are_zero() {
        let stats = RunStats::new();
        assert_eq!(stats.processed(), 0);
        assert_eq!(stats.success_rate(), 0.0);
    }

    #[test]
    fn test_record_methods() {
        let mut stats = RunStats::new();
        stats.record_success();
        stats.record_success();
        stats.record_failure();
        stats.record_retries(2);
        stats.record_retries(3);
        stats.record_generated(GenerationMode::Baseline);
        stats.record_generated(GenerationMode::Baseline);
        stats.record_generated(GenerationMode::Enhanced);

        assert_eq!(stats.success, 2);
        assert_eq!(stats.failure, 1);
        assert_eq!(stats.retries, 5);
        assert_eq!(stats.baseline.generated, 2);
        assert_eq!(stats.enhanced.generated, 1);
        assert!((stats.success_rate() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(RunStats::new()).unwrap();
        assert_eq!(json["baseline"]["generated"], 0);
        assert_eq!(json["enhanced"]["generated"], 0);
        assert_eq!(json["retries"], 0);
    }
}
