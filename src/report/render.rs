//! Markdown and JSON rendering of a [`ReportSummary`].
//!
//! Both artifacts come from the same summary value, so their figures always
//! agree. Display strings (`N/A`, signs, rounding) are prepared here rather
//! than in the template.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::{Context, Tera};

use crate::error::ReportError;
use crate::pipeline::BenchmarkRun;

use super::aggregate::{AxisAverages, ReportAggregator, ReportSummary, ResultRow, AXIS_NAMES};

const REPORT_TEMPLATE: &str = r#"# Component Generation Benchmark

Run `{{ run_id }}` at {{ timestamp }}

## Executive Summary

| Metric | Value |
|---|---|
| Prompts | {{ prompt_count }} |
| Succeeded | {{ success_count }} |
| Failed | {{ failure_count }} |
| Success rate | {{ success_rate }} |
| Retries | {{ retry_count }} |
| Enhancement | {{ enhancement }} |
| Baseline average | {{ baseline_average }} |
| Enhanced average | {{ enhanced_average }} |
| Average improvement | {{ average_improvement }} |
| Improvement range | {{ improvement_range }} |

## Scores

| Prompt | Baseline | Enhanced | Improvement | Retries | Status |
|---|---|---|---|---|---|
{% for row in rows %}| {{ row.prompt_id }} | {{ row.baseline }} | {{ row.enhanced }} | {{ row.improvement }} | {{ row.retries }} | {{ row.status }} |
{% endfor %}
## Axis Averages

| Axis | Baseline | Enhanced | Delta |
|---|---|---|---|
{% for axis in axes %}| {{ axis.name }} | {{ axis.baseline }} | {{ axis.enhanced }} | {{ axis.delta }} |
{% endfor %}
## Top Performers
{% if top | length == 0 %}
No scored prompts.
{% else %}
{% for row in top %}{{ loop.index }}. **{{ row.prompt_id }}**: {{ row.improvement }} ({{ row.baseline }} -> {{ row.enhanced }})
{% endfor %}{% endif %}
## Bottom Performers
{% if bottom | length == 0 %}
No scored prompts.
{% else %}
{% for row in bottom %}{{ loop.index }}. **{{ row.prompt_id }}**: {{ row.improvement }} ({{ row.baseline }} -> {{ row.enhanced }})
{% endfor %}{% endif %}
## Strengths and Weaknesses

- Strengths: {% if strengths | length == 0 %}none{% else %}{{ strengths | join(sep=", ") }}{% endif %}
- Weaknesses: {% if weaknesses | length == 0 %}none{% else %}{{ weaknesses | join(sep=", ") }}{% endif %}
{% if failures | length > 0 %}
## Failures

| Prompt | Stage | Retries | Error |
|---|---|---|---|
{% for f in failures %}| {{ f.prompt_id }} | {{ f.stage }} | {{ f.retries }} | {{ f.error }} |
{% endfor %}{% endif %}{% if charts %}
## Charts

```mermaid
xychart-beta
    title "Total score by prompt"
    x-axis {{ chart_labels }}
    y-axis "Score" 0 --> 100
    bar {{ chart_baseline }}
{% if chart_enhanced %}    line {{ chart_enhanced }}
{% endif %}```

```mermaid
xychart-beta
    title "Average score by axis"
    x-axis {{ axis_labels }}
    y-axis "Score" 0 --> 100
    bar {{ axis_chart_values }}
```
{% endif %}"#;

/// Paths of the rendered report artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub markdown: PathBuf,
    pub json: PathBuf,
}

#[derive(Serialize)]
struct RowView {
    prompt_id: String,
    baseline: String,
    enhanced: String,
    improvement: String,
    retries: u32,
    status: &'static str,
}

impl From<&ResultRow> for RowView {
    fn from(row: &ResultRow) -> Self {
        Self {
            prompt_id: row.prompt_id.clone(),
            baseline: opt_u32(row.baseline_total),
            enhanced: opt_u32(row.enhanced_total),
            improvement: signed(f64::from(row.improvement)),
            retries: row.retries,
            status: if row.succeeded { "ok" } else { "failed" },
        }
    }
}

#[derive(Serialize)]
struct AxisView {
    name: &'static str,
    baseline: String,
    enhanced: String,
    delta: String,
}

/// Renders the narrative Markdown report.
pub fn render_markdown(summary: &ReportSummary, charts: bool) -> Result<String, ReportError> {
    let mut context = Context::new();
    context.insert("run_id", &summary.run_id.to_string());
    context.insert("timestamp", &summary.timestamp.to_rfc3339());
    context.insert("prompt_count", &summary.prompt_count);
    context.insert("success_count", &summary.success_count);
    context.insert("failure_count", &summary.failure_count);
    context.insert("retry_count", &summary.retry_count);
    context.insert("success_rate", &format!("{:.1}%", summary.success_rate));
    context.insert(
        "enhancement",
        if summary.enhancement_enabled {
            "enabled"
        } else {
            "disabled"
        },
    );
    context.insert("baseline_average", &opt_f64(summary.baseline_average));
    context.insert("enhanced_average", &opt_f64(summary.enhanced_average));
    context.insert(
        "average_improvement",
        &summary
            .average_improvement
            .map(signed)
            .unwrap_or_else(na),
    );
    context.insert(
        "improvement_range",
        &match (summary.min_improvement, summary.max_improvement) {
            (Some(min), Some(max)) => {
                format!("{} to {}", signed(f64::from(min)), signed(f64::from(max)))
            }
            _ => na(),
        },
    );

    let rows: Vec<RowView> = summary.rows.iter().map(RowView::from).collect();
    let top: Vec<RowView> = summary.top_performers.iter().map(RowView::from).collect();
    let bottom: Vec<RowView> = summary.bottom_performers.iter().map(RowView::from).collect();
    context.insert("rows", &rows);
    context.insert("top", &top);
    context.insert("bottom", &bottom);
    context.insert(
        "axes",
        &axis_views(
            summary.baseline_axes.as_ref(),
            summary.enhanced_axes.as_ref(),
            summary.axis_deltas.as_ref(),
        ),
    );
    context.insert("strengths", &summary.strengths);
    context.insert("weaknesses", &summary.weaknesses);
    context.insert("failures", &summary.failures);

    let scored: Vec<&ResultRow> = summary.rows.iter().filter(|r| r.succeeded).collect();
    let charts = charts && !scored.is_empty();
    context.insert("charts", &charts);
    if charts {
        let labels: Vec<&str> = scored.iter().map(|r| r.prompt_id.as_str()).collect();
        context.insert("chart_labels", &serde_json::to_string(&labels)?);
        context.insert(
            "chart_baseline",
            &series(scored.iter().map(|r| r.baseline_total.unwrap_or(0))),
        );
        let chart_enhanced = if summary.enhanced_average.is_some() {
            series(scored.iter().map(|r| r.enhanced_total.unwrap_or(0)))
        } else {
            String::new()
        };
        context.insert("chart_enhanced", &chart_enhanced);

        let axis_values = summary
            .enhanced_axes
            .or(summary.baseline_axes)
            .map(|a| a.axes().map(|(_, v)| v.round() as u32).to_vec())
            .unwrap_or_default();
        context.insert("axis_labels", &serde_json::to_string(&AXIS_NAMES)?);
        context.insert("axis_chart_values", &series(axis_values.into_iter()));
    }

    Ok(Tera::one_off(REPORT_TEMPLATE, &context, false)?)
}

/// Renders the structured JSON report.
pub fn render_json(summary: &ReportSummary) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(summary)?)
}

/// Aggregates `run` and writes `report-<stamp>.md` and `report-<stamp>.json`
/// into `report_dir`. The run itself is not modified.
pub fn write_reports(
    run: &BenchmarkRun,
    report_dir: &Path,
    charts: bool,
) -> Result<ReportPaths, ReportError> {
    let summary = ReportAggregator::default().aggregate(run);
    std::fs::create_dir_all(report_dir)?;

    let stamp = run.stamp();
    let paths = ReportPaths {
        markdown: report_dir.join(format!("report-{}.md", stamp)),
        json: report_dir.join(format!("report-{}.json", stamp)),
    };

    std::fs::write(&paths.markdown, render_markdown(&summary, charts)?)?;
    std::fs::write(&paths.json, render_json(&summary)?)?;

    tracing::info!(
        markdown = %paths.markdown.display(),
        json = %paths.json.display(),
        "Reports written"
    );
    Ok(paths)
}

fn axis_views(
    baseline: Option<&AxisAverages>,
    enhanced: Option<&AxisAverages>,
    deltas: Option<&AxisAverages>,
) -> Vec<AxisView> {
    let pick = |a: Option<&AxisAverages>, i: usize| a.map(|a| a.axes()[i].1);
    let mut views = Vec::with_capacity(AXIS_NAMES.len() + 1);
    for (i, name) in AXIS_NAMES.into_iter().enumerate() {
        views.push(AxisView {
            name,
            baseline: opt_f64(pick(baseline, i)),
            enhanced: opt_f64(pick(enhanced, i)),
            delta: pick(deltas, i).map(signed).unwrap_or_else(na),
        });
    }
    views.push(AxisView {
        name: "total",
        baseline: opt_f64(baseline.map(|a| a.total)),
        enhanced: opt_f64(enhanced.map(|a| a.total)),
        delta: deltas.map(|a| signed(a.total)).unwrap_or_else(na),
    });
    views
}

fn na() -> String {
    "N/A".to_string()
}

fn opt_u32(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(na)
}

fn opt_f64(value: Option<f64>) -> String {
    value.map(|v| format!("{:.1}", v)).unwrap_or_else(na)
}

fn signed(value: f64) -> String {
    format!("{:+.1}", value)
}

fn series(values: impl Iterator<Item = u32>) -> String {
    let items: Vec<String> = values.map(|v| v.to_string()).collect();
    format!("[{}]", items.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::PromptRecord;
    use crate::pipeline::{BenchmarkConfig, ComponentResult, RunConfigSummary};
    use crate::provider::GenerationMode;
    use crate::scoring::ScoreRecord;
    use tempfile::TempDir;

    fn score(mode: GenerationMode, total: u32) -> ScoreRecord {
        ScoreRecord {
            prompt_id: "x".to_string(),
            mode,
            fidelity: total,
            code_quality: total,
            accessibility: total,
            ux_polish: total,
            innovation: total,
            total,
        }
    }

    fn run() -> BenchmarkRun {
        let mut run = BenchmarkRun::new(RunConfigSummary::from(&BenchmarkConfig::default()));
        let card = PromptRecord::new("card", "- title");
        let table = PromptRecord::new("data-table", "- rows");
        run.results = vec![
            ComponentResult::scored(&card, score(GenerationMode::Baseline, 62), 1)
                .with_enhanced(score(GenerationMode::Enhanced, 88), 0),
            ComponentResult::failed(&table, 3, "Invalid artifact: no export statement found"),
        ];
        run.prompt_count = 2;
        run.stats.success = 1;
        run.stats.failure = 1;
        run.stats.retries = 4;
        run
    }

    #[test]
    fn test_markdown_sections() {
        let summary = ReportAggregator::default().aggregate(&run());
        let md = render_markdown(&summary, true).unwrap();

        assert!(md.contains("## Executive Summary"));
        assert!(md.contains("| Success rate | 50.0% |"));
        assert!(md.contains("| card | 62 | 88 | +26.0 | 1 | ok |"));
        assert!(md.contains("| data-table | N/A | N/A | +0.0 | 3 | failed |"));
        assert!(md.contains("1. **card**: +26.0 (62 -> 88)"));
        assert!(md.contains("## Failures"));
        assert!(md.contains("no export statement found"));
        assert!(md.contains("xychart-beta"));
        assert!(md.contains("x-axis [\"card\"]"));
        assert!(md.contains("bar [62]"));
        assert!(md.contains("line [88]"));
    }

    #[test]
    fn test_markdown_without_charts() {
        let summary = ReportAggregator::default().aggregate(&run());
        let md = render_markdown(&summary, false).unwrap();
        assert!(!md.contains("mermaid"));
    }

    #[test]
    fn test_empty_summary_renders_na() {
        let empty = BenchmarkRun::new(RunConfigSummary::from(&BenchmarkConfig::default()));
        let summary = ReportAggregator::default().aggregate(&empty);
        let md = render_markdown(&summary, true).unwrap();
        assert!(md.contains("| Baseline average | N/A |"));
        assert!(md.contains("No scored prompts."));
        assert!(!md.contains("mermaid"));
    }

    #[test]
    fn test_json_matches_markdown_figures() {
        let summary = ReportAggregator::default().aggregate(&run());
        let json: serde_json::Value = serde_json::from_str(&render_json(&summary).unwrap()).unwrap();
        let md = render_markdown(&summary, false).unwrap();

        assert_eq!(json["baseline_average"], 62.0);
        assert!(md.contains("| Baseline average | 62.0 |"));
        assert_eq!(json["enhanced_average"], 88.0);
        assert!(md.contains("| Enhanced average | 88.0 |"));
        assert_eq!(json["success_rate"], 50.0);
    }

    #[test]
    fn test_write_reports() {
        let dir = TempDir::new().unwrap();
        let run = run();
        let paths = write_reports(&run, dir.path(), true).unwrap();

        assert!(paths.markdown.exists());
        assert!(paths.json.exists());
        let name = paths.json.file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(name, format!("report-{}.json", run.stamp()));
    }
}
