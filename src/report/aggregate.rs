//! Summary statistics over a finished run.
//!
//! Aggregation is a read-only projection of a [`BenchmarkRun`]: it never
//! mutates the run and can be repeated against a persisted summary. Empty
//! sets produce `None` rather than an error or a division by zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pipeline::{BenchmarkRun, ComponentResult};
use crate::scoring::ScoreRecord;

/// Number of top and bottom performers reported.
pub const DEFAULT_TOP_N: usize = 3;

/// Axis averages at or above this are strengths.
pub const STRENGTH_THRESHOLD: f64 = 80.0;

/// Axis averages below this are weaknesses.
pub const WEAKNESS_THRESHOLD: f64 = 70.0;

/// Score axes in weight order.
pub const AXIS_NAMES: [&str; 5] = [
    "fidelity",
    "code_quality",
    "accessibility",
    "ux_polish",
    "innovation",
];

/// Mean of each axis over a set of scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisAverages {
    pub fidelity: f64,
    pub code_quality: f64,
    pub accessibility: f64,
    pub ux_polish: f64,
    pub innovation: f64,
    pub total: f64,
}

impl AxisAverages {
    fn from_scores<'a>(scores: impl Iterator<Item = &'a ScoreRecord>) -> Option<Self> {
        let mut sums = [0.0f64; 6];
        let mut count = 0usize;
        for s in scores {
            count += 1;
            sums[0] += f64::from(s.fidelity);
            sums[1] += f64::from(s.code_quality);
            sums[2] += f64::from(s.accessibility);
            sums[3] += f64::from(s.ux_polish);
            sums[4] += f64::from(s.innovation);
            sums[5] += f64::from(s.total);
        }
        if count == 0 {
            return None;
        }
        let n = count as f64;
        Some(Self {
            fidelity: sums[0] / n,
            code_quality: sums[1] / n,
            accessibility: sums[2] / n,
            ux_polish: sums[3] / n,
            innovation: sums[4] / n,
            total: sums[5] / n,
        })
    }

    fn minus(&self, other: &AxisAverages) -> Self {
        Self {
            fidelity: self.fidelity - other.fidelity,
            code_quality: self.code_quality - other.code_quality,
            accessibility: self.accessibility - other.accessibility,
            ux_polish: self.ux_polish - other.ux_polish,
            innovation: self.innovation - other.innovation,
            total: self.total - other.total,
        }
    }

    /// The five scored axes as `(name, average)`, total excluded.
    pub fn axes(&self) -> [(&'static str, f64); 5] {
        let values = [
            self.fidelity,
            self.code_quality,
            self.accessibility,
            self.ux_polish,
            self.innovation,
        ];
        [0, 1, 2, 3, 4].map(|i| (AXIS_NAMES[i], values[i]))
    }
}

/// One row of the score table, also used for rankings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub prompt_id: String,
    pub component_kind: String,
    pub baseline_total: Option<u32>,
    pub enhanced_total: Option<u32>,
    pub improvement: i32,
    pub retries: u32,
    pub succeeded: bool,
}

impl From<&ComponentResult> for ResultRow {
    fn from(result: &ComponentResult) -> Self {
        Self {
            prompt_id: result.prompt_id.clone(),
            component_kind: result.component_kind.clone(),
            baseline_total: result.baseline_score.as_ref().map(|s| s.total),
            enhanced_total: result.enhanced_score.as_ref().map(|s| s.total),
            improvement: result.improvement,
            retries: result.total_retries(),
            succeeded: result.succeeded(),
        }
    }
}

/// A prompt-level or enhancement-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEntry {
    pub prompt_id: String,
    /// `baseline` (prompt failed) or `enhanced` (baseline scores kept).
    pub stage: String,
    pub retries: u32,
    pub error: String,
}

/// Everything the reports are rendered from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub enhancement_enabled: bool,
    pub prompt_count: usize,
    pub success_count: u64,
    pub failure_count: u64,
    pub retry_count: u64,
    /// Percentage of processed prompts that succeeded.
    pub success_rate: f64,
    /// Mean baseline total.
    pub baseline_average: Option<f64>,
    /// Mean enhanced total over successfully enhanced prompts.
    pub enhanced_average: Option<f64>,
    /// Mean improvement over prompts with positive improvement.
    pub average_improvement: Option<f64>,
    pub min_improvement: Option<i32>,
    pub max_improvement: Option<i32>,
    pub baseline_axes: Option<AxisAverages>,
    pub enhanced_axes: Option<AxisAverages>,
    /// Mean per-axis `enhanced - baseline` over prompts that have both
    /// scores.
    pub axis_deltas: Option<AxisAverages>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub top_performers: Vec<ResultRow>,
    pub bottom_performers: Vec<ResultRow>,
    /// One row per prompt, sorted by prompt id.
    pub rows: Vec<ResultRow>,
    pub failures: Vec<FailureEntry>,
}

/// Derives a [`ReportSummary`] from a run.
#[derive(Debug, Clone)]
pub struct ReportAggregator {
    top_n: usize,
}

impl Default for ReportAggregator {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl ReportAggregator {
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    pub fn aggregate(&self, run: &BenchmarkRun) -> ReportSummary {
        let succeeded: Vec<&ComponentResult> =
            run.results.iter().filter(|r| r.succeeded()).collect();

        let baseline_axes =
            AxisAverages::from_scores(succeeded.iter().filter_map(|r| r.baseline_score.as_ref()));
        let enhanced_axes =
            AxisAverages::from_scores(succeeded.iter().filter_map(|r| r.enhanced_score.as_ref()));
        let axis_deltas = paired_deltas(&succeeded);

        let positive: Vec<i32> = succeeded
            .iter()
            .map(|r| r.improvement)
            .filter(|i| *i > 0)
            .collect();
        let average_improvement = mean(positive.iter().map(|i| f64::from(*i)));

        let (strengths, weaknesses) = match enhanced_axes.as_ref().or(baseline_axes.as_ref()) {
            Some(axes) => classify_axes(axes),
            None => (Vec::new(), Vec::new()),
        };

        let mut ranked: Vec<ResultRow> = succeeded.iter().map(|r| ResultRow::from(*r)).collect();
        ranked.sort_by(|a, b| {
            b.improvement
                .cmp(&a.improvement)
                .then_with(|| a.prompt_id.cmp(&b.prompt_id))
        });
        let top_performers: Vec<ResultRow> = ranked.iter().take(self.top_n).cloned().collect();

        let mut ascending = ranked;
        ascending.sort_by(|a, b| {
            a.improvement
                .cmp(&b.improvement)
                .then_with(|| a.prompt_id.cmp(&b.prompt_id))
        });
        let bottom_performers: Vec<ResultRow> =
            ascending.iter().take(self.top_n).cloned().collect();

        let mut rows: Vec<ResultRow> = run.results.iter().map(ResultRow::from).collect();
        rows.sort_by(|a, b| a.prompt_id.cmp(&b.prompt_id));

        ReportSummary {
            run_id: run.run_id,
            timestamp: run.timestamp,
            enhancement_enabled: run.config.enhancement_enabled,
            prompt_count: run.prompt_count,
            success_count: run.success_count(),
            failure_count: run.failure_count(),
            retry_count: run.retry_count(),
            success_rate: run.stats.success_rate() * 100.0,
            baseline_average: baseline_axes.map(|a| a.total),
            enhanced_average: enhanced_axes.map(|a| a.total),
            average_improvement,
            min_improvement: succeeded.iter().map(|r| r.improvement).min(),
            max_improvement: succeeded.iter().map(|r| r.improvement).max(),
            baseline_axes,
            enhanced_axes,
            axis_deltas,
            strengths,
            weaknesses,
            top_performers,
            bottom_performers,
            rows,
            failures: collect_failures(&run.results),
        }
    }
}

/// Axis deltas restricted to prompts scored in both modes, so an exhausted
/// enhancement never skews the baseline side.
fn paired_deltas(results: &[&ComponentResult]) -> Option<AxisAverages> {
    let pairs: Vec<(&ScoreRecord, &ScoreRecord)> = results
        .iter()
        .filter_map(|r| Some((r.baseline_score.as_ref()?, r.enhanced_score.as_ref()?)))
        .collect();

    let baseline = AxisAverages::from_scores(pairs.iter().map(|(b, _)| *b))?;
    let enhanced = AxisAverages::from_scores(pairs.iter().map(|(_, e)| *e))?;
    Some(enhanced.minus(&baseline))
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

fn classify_axes(axes: &AxisAverages) -> (Vec<String>, Vec<String>) {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    for (name, value) in axes.axes() {
        if value >= STRENGTH_THRESHOLD {
            strengths.push(name.to_string());
        } else if value < WEAKNESS_THRESHOLD {
            weaknesses.push(name.to_string());
        }
    }
    (strengths, weaknesses)
}

fn collect_failures(results: &[ComponentResult]) -> Vec<FailureEntry> {
    let mut failures = Vec::new();
    for result in results {
        if let Some(error) = &result.error {
            failures.push(FailureEntry {
                prompt_id: result.prompt_id.clone(),
                stage: "baseline".to_string(),
                retries: result.baseline_retries,
                error: error.clone(),
            });
        }
        if let Some(error) = &result.enhancement_error {
            failures.push(FailureEntry {
                prompt_id: result.prompt_id.clone(),
                stage: "enhanced".to_string(),
                retries: result.enhanced_retries,
                error: error.clone(),
            });
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::PromptRecord;
    use crate::pipeline::{BenchmarkConfig, RunConfigSummary};
    use crate::provider::GenerationMode;

    fn score(id: &str, mode: GenerationMode, axis: u32, total: u32) -> ScoreRecord {
        ScoreRecord {
            prompt_id: id.to_string(),
            mode,
            fidelity: axis,
            code_quality: axis,
            accessibility: axis,
            ux_polish: axis,
            innovation: axis,
            total,
        }
    }

    fn ok(id: &str, baseline: u32, enhanced: Option<u32>) -> ComponentResult {
        let prompt = PromptRecord::new(id, "- item");
        let result = ComponentResult::scored(
            &prompt,
            score(id, GenerationMode::Baseline, baseline, baseline),
            0,
        );
        match enhanced {
            Some(e) => result.with_enhanced(score(id, GenerationMode::Enhanced, e, e), 1),
            None => result,
        }
    }

    fn run_with(results: Vec<ComponentResult>) -> BenchmarkRun {
        let mut run = BenchmarkRun::new(RunConfigSummary::from(&BenchmarkConfig::default()));
        run.prompt_count = results.len();
        for r in &results {
            if r.succeeded() {
                run.stats.record_success();
            } else {
                run.stats.record_failure();
            }
            run.stats.record_retries(r.total_retries());
        }
        run.results = results;
        run
    }

    #[test]
    fn test_empty_run_is_all_none() {
        let summary = ReportAggregator::default().aggregate(&run_with(Vec::new()));
        assert_eq!(summary.baseline_average, None);
        assert_eq!(summary.enhanced_average, None);
        assert_eq!(summary.average_improvement, None);
        assert_eq!(summary.min_improvement, None);
        assert_eq!(summary.success_rate, 0.0);
        assert!(summary.top_performers.is_empty());
        assert!(summary.strengths.is_empty());
    }

    #[test]
    fn test_averages_and_improvements() {
        let prompt = PromptRecord::new("broken", "- item");
        let summary = ReportAggregator::default().aggregate(&run_with(vec![
            ok("a", 60, Some(80)),
            ok("b", 70, Some(70)),
            ok("c", 80, None),
            ComponentResult::failed(&prompt, 3, "no export"),
        ]));

        assert_eq!(summary.baseline_average, Some(70.0));
        assert_eq!(summary.enhanced_average, Some(75.0));
        // only "a" improved
        assert_eq!(summary.average_improvement, Some(20.0));
        assert_eq!(summary.min_improvement, Some(0));
        assert_eq!(summary.max_improvement, Some(20));
        assert_eq!(summary.success_rate, 75.0);
        assert_eq!(summary.rows.len(), 4);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].stage, "baseline");
        assert_eq!(summary.failures[0].retries, 3);
    }

    #[test]
    fn test_ranking_ties_and_exclusions() {
        let prompt = PromptRecord::new("zz-failed", "- item");
        let summary = ReportAggregator::default().aggregate(&run_with(vec![
            ok("delta", 60, Some(70)),
            ok("alpha", 60, Some(70)),
            ok("charlie", 60, Some(90)),
            ok("bravo", 60, Some(60)),
            ComponentResult::failed(&prompt, 3, "boom"),
        ]));

        let top: Vec<&str> = summary.top_performers.iter().map(|r| r.prompt_id.as_str()).collect();
        assert_eq!(top, vec!["charlie", "alpha", "delta"]);

        let bottom: Vec<&str> = summary
            .bottom_performers
            .iter()
            .map(|r| r.prompt_id.as_str())
            .collect();
        assert_eq!(bottom, vec!["bravo", "alpha", "delta"]);
        assert!(!top.contains(&"zz-failed") && !bottom.contains(&"zz-failed"));
    }

    #[test]
    fn test_strengths_use_enhanced_axes() {
        let summary = ReportAggregator::default().aggregate(&run_with(vec![
            ok("a", 60, Some(85)),
            ok("b", 60, Some(85)),
        ]));
        assert_eq!(summary.strengths.len(), 5);
        assert!(summary.weaknesses.is_empty());

        let deltas = summary.axis_deltas.unwrap();
        assert_eq!(deltas.accessibility, 25.0);
    }

    #[test]
    fn test_strengths_fall_back_to_baseline() {
        let summary = ReportAggregator::default().aggregate(&run_with(vec![ok("a", 65, None)]));
        assert!(summary.enhanced_axes.is_none());
        assert!(summary.axis_deltas.is_none());
        assert!(summary.strengths.is_empty());
        assert_eq!(summary.weaknesses.len(), 5);
    }

    #[test]
    fn test_axis_deltas_only_compare_paired_prompts() {
        let prompt = PromptRecord::new("c", "- item");
        let exhausted = ComponentResult::scored(
            &prompt,
            score("c", GenerationMode::Baseline, 40, 40),
            0,
        )
        .with_enhancement_error(3, "no export");

        let summary = ReportAggregator::default().aggregate(&run_with(vec![
            ok("a", 60, Some(80)),
            ok("b", 70, Some(80)),
            exhausted,
        ]));

        // baseline side still averages all three successful prompts
        assert_eq!(summary.baseline_axes.unwrap().accessibility, 170.0 / 3.0);
        let deltas = summary.axis_deltas.unwrap();
        assert_eq!(deltas.accessibility, 15.0);
        assert_eq!(deltas.total, 15.0);
    }

    #[test]
    fn test_enhancement_failure_listed() {
        let prompt = PromptRecord::new("card", "- item");
        let result = ComponentResult::scored(
            &prompt,
            score("card", GenerationMode::Baseline, 70, 70),
            0,
        )
        .with_enhancement_error(2, "timed out");
        let summary = ReportAggregator::default().aggregate(&run_with(vec![result]));
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].stage, "enhanced");
        assert_eq!(summary.success_count, 1);
    }

    #[test]
    fn test_aggregate_does_not_mutate_run() {
        let run = run_with(vec![ok("a", 60, Some(80))]);
        let before = run.clone();
        let _ = ReportAggregator::default().aggregate(&run);
        assert_eq!(run, before);
    }
}
