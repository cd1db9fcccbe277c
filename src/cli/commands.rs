//! CLI command definitions for component-bench.
//!
//! `run` executes a benchmark end to end; `report` re-renders reports from a
//! persisted run summary; `validate` and `score` apply the validator and
//! scorer to a single file.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::info;

use crate::corpus::{extract_requirements, parse_prompt_name, PromptRecord};
use crate::pipeline::{BatchOrchestrator, BenchmarkConfig, BenchmarkEvent, BenchmarkRun};
use crate::provider::{GenerationMode, TemplateProvider};
use crate::report::{write_reports, ReportAggregator, ReportPaths};
use crate::scoring::{Scorer, ScoringRubric};
use crate::storage::{load_run, save_run};
use crate::validation::{Validator, DEFAULT_MIN_CODE_LENGTH};

/// Benchmark for prompt-driven UI component generation.
#[derive(Parser)]
#[command(name = "component-bench")]
#[command(about = "Benchmark baseline and enhanced UI component generation")]
#[command(version)]
#[command(
    long_about = "component-bench drives every prompt in a directory through baseline generation, enhancement, structural validation and five-axis scoring, then writes a JSON run summary plus Markdown and JSON reports.\n\nExample usage:\n  component-bench run --prompt-dir ./prompts --max-parallel 4\n  component-bench report --summary ./bench-reports/benchmark-summary-<stamp>.json"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run the benchmark over a prompt directory.
    Run(RunArgs),

    /// Re-render reports from a persisted run summary.
    Report(ReportArgs),

    /// Validate a single component file.
    Validate(ValidateArgs),

    /// Score a single component file.
    Score(ScoreArgs),
}

/// Arguments for `component-bench run`.
///
/// Unset options fall back to the `BENCH_*` environment variables, then to
/// the built-in defaults.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Directory containing `<kind>-prompt.md` files.
    #[arg(short = 'p', long)]
    pub prompt_dir: Option<PathBuf>,

    /// Directory for per-prompt artifacts.
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Directory for the run summary, reports and metrics.
    #[arg(short = 'r', long)]
    pub report_dir: Option<PathBuf>,

    /// Retries per prompt and mode.
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Prompts processed concurrently per batch.
    #[arg(long)]
    pub max_parallel: Option<usize>,

    /// Skip the enhancement pass.
    #[arg(long)]
    pub baseline_only: bool,

    /// Only run prompts whose id equals or contains this value.
    #[arg(long = "prompt")]
    pub prompt_filter: Option<String>,

    /// Timeout for a single generation attempt, in seconds.
    #[arg(long)]
    pub attempt_timeout_secs: Option<u64>,

    /// Minimum artifact length accepted by the validator.
    #[arg(long)]
    pub min_code_length: Option<usize>,

    /// Omit Mermaid charts from the Markdown report.
    #[arg(long)]
    pub no_charts: bool,

    /// YAML scoring rubric replacing the built-in one.
    #[arg(long, env = "BENCH_RUBRIC")]
    pub rubric: Option<PathBuf>,

    /// Artificial latency added to each generation call, in milliseconds.
    #[arg(long, env = "BENCH_SIMULATED_LATENCY_MS", default_value = "0")]
    pub simulated_latency_ms: u64,

    /// Output JSON summary.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `component-bench report`.
#[derive(Parser, Debug)]
pub struct ReportArgs {
    /// Path to a `benchmark-summary-*.json` file.
    #[arg(short = 's', long)]
    pub summary: PathBuf,

    /// Where to write the reports (default: next to the summary).
    #[arg(short = 'r', long)]
    pub report_dir: Option<PathBuf>,

    /// Omit Mermaid charts from the Markdown report.
    #[arg(long)]
    pub no_charts: bool,
}

/// Arguments for `component-bench validate`.
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Component source file.
    #[arg(short = 'f', long)]
    pub file: PathBuf,

    /// Expected component name (default: derived from the file name).
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Minimum artifact length.
    #[arg(long, default_value_t = DEFAULT_MIN_CODE_LENGTH)]
    pub min_code_length: usize,

    /// Output JSON result.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `component-bench score`.
#[derive(Parser, Debug)]
pub struct ScoreArgs {
    /// Component source file.
    #[arg(short = 'f', long)]
    pub file: PathBuf,

    /// Prompt file whose requirements drive fidelity scoring.
    #[arg(short = 'p', long)]
    pub prompt: Option<PathBuf>,

    /// Scoring mode: baseline or enhanced.
    #[arg(short = 'm', long, default_value = "baseline")]
    pub mode: GenerationMode,

    /// YAML scoring rubric replacing the built-in one.
    #[arg(long, env = "BENCH_RUBRIC")]
    pub rubric: Option<PathBuf>,
}

/// Parse CLI arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the CLI with the parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => run_benchmark_command(args).await,
        Commands::Report(args) => run_report_command(args),
        Commands::Validate(args) => run_validate_command(args),
        Commands::Score(args) => run_score_command(args),
    }
}

// ============================================================================
// Run
// ============================================================================

#[derive(Debug, Serialize)]
struct RunOutput<'a> {
    run_id: String,
    summary_path: PathBuf,
    report_markdown: PathBuf,
    report_json: PathBuf,
    metrics_path: PathBuf,
    stats: &'a crate::pipeline::RunStats,
    baseline_average: Option<f64>,
    enhanced_average: Option<f64>,
    average_improvement: Option<f64>,
}

/// Builds the run configuration: defaults, then environment, then flags.
fn build_config(args: &RunArgs) -> anyhow::Result<BenchmarkConfig> {
    apply_overrides(BenchmarkConfig::from_env_unvalidated()?, args)
}

/// Applies the flags that were given on top of `config`, then validates the
/// result once.
fn apply_overrides(mut config: BenchmarkConfig, args: &RunArgs) -> anyhow::Result<BenchmarkConfig> {
    if let Some(dir) = &args.prompt_dir {
        config = config.with_prompt_dir(dir);
    }
    if let Some(dir) = &args.output_dir {
        config = config.with_output_dir(dir);
    }
    if let Some(dir) = &args.report_dir {
        config = config.with_report_dir(dir);
    }
    if let Some(max) = args.max_retries {
        config = config.with_max_retries(max);
    }
    if let Some(max) = args.max_parallel {
        config = config.with_max_parallel(max);
    }
    if args.baseline_only {
        config = config.with_baseline_only(true);
    }
    if args.prompt_filter.is_some() {
        config = config.with_prompt_filter(args.prompt_filter.clone());
    }
    if let Some(secs) = args.attempt_timeout_secs {
        config = config.with_attempt_timeout(Duration::from_secs(secs));
    }
    if let Some(len) = args.min_code_length {
        config = config.with_min_code_length(len);
    }
    if args.no_charts {
        config = config.with_charts(false);
    }
    if let Some(path) = &args.rubric {
        config = config.with_rubric(ScoringRubric::from_yaml_file(path)?);
    }

    config.validate()?;
    Ok(config)
}

async fn run_benchmark_command(args: RunArgs) -> anyhow::Result<()> {
    let config = build_config(&args)?;
    let charts = config.charts;
    let report_dir = config.report_dir.clone();

    let provider =
        TemplateProvider::new().with_latency(Duration::from_millis(args.simulated_latency_ms));
    let orchestrator = BatchOrchestrator::new(config, Arc::new(provider))?;

    let (tx, mut rx) = mpsc::channel::<BenchmarkEvent>(64);
    let quiet = args.json;
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if !quiet {
                print_event(&event);
            }
        }
    });

    let result = orchestrator.execute(Some(tx)).await;
    let _ = printer.await;
    let run = result?;

    let summary_path = save_run(&report_dir, &run).await?;
    let reports = write_reports(&run, &report_dir, charts)?;
    let metrics_path = report_dir.join(format!("metrics-{}.prom", run.stamp()));
    tokio::fs::write(&metrics_path, orchestrator.metrics().export()).await?;

    let summary = ReportAggregator::default().aggregate(&run);

    if args.json {
        let output = RunOutput {
            run_id: run.run_id.to_string(),
            summary_path,
            report_markdown: reports.markdown,
            report_json: reports.json,
            metrics_path,
            stats: &run.stats,
            baseline_average: summary.baseline_average,
            enhanced_average: summary.enhanced_average,
            average_improvement: summary.average_improvement,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_run_summary(&run, &summary, &summary_path, &reports, &metrics_path);
    }

    Ok(())
}

fn print_event(event: &BenchmarkEvent) {
    match event {
        BenchmarkEvent::RunStarted {
            prompts,
            max_parallel,
            ..
        } => {
            println!(
                "Running {} prompt(s), {} at a time",
                prompts, max_parallel
            );
        }
        BenchmarkEvent::PromptCompleted {
            prompt_id,
            succeeded: true,
            baseline_total,
            enhanced_total,
            improvement,
            retries,
            ..
        } => {
            let enhanced = enhanced_total
                .map(|t| format!(" enhanced={} ({:+})", t, improvement))
                .unwrap_or_default();
            println!(
                "  [ok]     {:<24} baseline={}{} retries={}",
                prompt_id,
                baseline_total.map(|t| t.to_string()).unwrap_or_else(|| "N/A".to_string()),
                enhanced,
                retries
            );
        }
        BenchmarkEvent::PromptCompleted {
            prompt_id,
            retries,
            error,
            ..
        } => {
            println!(
                "  [failed] {:<24} retries={} error={}",
                prompt_id,
                retries,
                error.as_deref().unwrap_or("unknown")
            );
        }
        BenchmarkEvent::BatchStarted { .. } | BenchmarkEvent::RunCompleted { .. } => {}
    }
}

fn print_run_summary(
    run: &BenchmarkRun,
    summary: &crate::report::ReportSummary,
    summary_path: &Path,
    reports: &ReportPaths,
    metrics_path: &Path,
) {
    let fmt = |v: Option<f64>| v.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "N/A".to_string());

    println!("\n=== Benchmark Results ===");
    println!("Run:                 {}", run.run_id);
    println!(
        "Success rate:        {:.1}% ({}/{})",
        summary.success_rate,
        run.success_count(),
        run.stats.processed()
    );
    println!("Retries:             {}", run.retry_count());
    println!("Baseline average:    {}", fmt(summary.baseline_average));
    println!("Enhanced average:    {}", fmt(summary.enhanced_average));
    println!(
        "Average improvement: {}",
        summary
            .average_improvement
            .map(|v| format!("{:+.1}", v))
            .unwrap_or_else(|| "N/A".to_string())
    );
    println!();
    println!("Summary: {}", summary_path.display());
    println!("Report:  {}", reports.markdown.display());
    println!("JSON:    {}", reports.json.display());
    println!("Metrics: {}", metrics_path.display());
}

// ============================================================================
// Report
// ============================================================================

fn run_report_command(args: ReportArgs) -> anyhow::Result<()> {
    if !args.summary.is_file() {
        return Err(anyhow::anyhow!(
            "Summary file does not exist: {}",
            args.summary.display()
        ));
    }

    let run = load_run(&args.summary)?;
    let report_dir = args.report_dir.clone().unwrap_or_else(|| {
        args.summary
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    });

    info!(run_id = %run.run_id, summary = %args.summary.display(), "Re-rendering reports");
    let reports = write_reports(&run, &report_dir, !args.no_charts)?;

    println!("Report: {}", reports.markdown.display());
    println!("JSON:   {}", reports.json.display());
    Ok(())
}

// ============================================================================
// Validate
// ============================================================================

/// Component name implied by a file name: `data-table.tsx` -> `DataTable`.
fn component_name_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    PromptRecord::new(stem, String::new()).component_name()
}

fn run_validate_command(args: ValidateArgs) -> anyhow::Result<()> {
    let code = std::fs::read_to_string(&args.file)?;
    let name = args
        .name
        .clone()
        .unwrap_or_else(|| component_name_from_path(&args.file));

    let result = Validator::new(args.min_code_length).validate(&code, &name);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.valid {
        println!("{}: valid ({})", args.file.display(), name);
    } else {
        println!(
            "{}: invalid ({} failing rule(s))",
            args.file.display(),
            result.failed_rules.len()
        );
        for (rule, reason) in result.failed_rules.iter().zip(&result.reasons) {
            println!("  - {}: {}", rule, reason);
        }
    }
    Ok(())
}

// ============================================================================
// Score
// ============================================================================

fn run_score_command(args: ScoreArgs) -> anyhow::Result<()> {
    let code = std::fs::read_to_string(&args.file)?;

    let (prompt_id, requirements) = match &args.prompt {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let id = parse_prompt_name(&file_name).unwrap_or(file_name);
            (id, extract_requirements(&text))
        }
        None => (
            args.file
                .file_stem()
                .map(|s| s.to_string_lossy().to_lowercase())
                .unwrap_or_default(),
            Vec::new(),
        ),
    };

    let rubric = match &args.rubric {
        Some(path) => ScoringRubric::from_yaml_file(path)?,
        None => ScoringRubric::default(),
    };

    let record = Scorer::new(rubric).score(&prompt_id, &code, &requirements, args.mode);
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
