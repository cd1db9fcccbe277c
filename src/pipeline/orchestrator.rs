//! Batch orchestrator.
//!
//! Drives every prompt through baseline generation, optional enhancement and
//! scoring. Prompts are processed in sequential batches of `max_parallel`;
//! members of a batch run concurrently. The orchestrator is the only owner of
//! the run statistics and result list, and updates them once a batch has
//! fully settled.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::corpus::{filter_prompts, load_dir, PromptRecord};
use crate::error::BenchError;
use crate::metrics::BenchMetrics;
use crate::provider::{GenerationMode, GenerationProvider};
use crate::retry::RetryController;
use crate::scoring::{ScoreRecord, Scorer};
use crate::storage::{artifact_files, ensure_writable_dir, ArtifactStore};
use crate::validation::Validator;

use super::config::BenchmarkConfig;
use super::run::{ArtifactRef, BenchmarkRun, ComponentResult, RunConfigSummary};

/// Progress events emitted while a run executes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BenchmarkEvent {
    RunStarted {
        run_id: Uuid,
        prompts: usize,
        max_parallel: usize,
    },
    BatchStarted {
        index: usize,
        size: usize,
    },
    PromptCompleted {
        prompt_id: String,
        succeeded: bool,
        baseline_total: Option<u32>,
        enhanced_total: Option<u32>,
        improvement: i32,
        retries: u32,
        error: Option<String>,
    },
    RunCompleted {
        success: u64,
        failure: u64,
        retries: u64,
    },
}

impl BenchmarkEvent {
    fn prompt_completed(result: &ComponentResult) -> Self {
        BenchmarkEvent::PromptCompleted {
            prompt_id: result.prompt_id.clone(),
            succeeded: result.succeeded(),
            baseline_total: result.baseline_score.as_ref().map(|s| s.total),
            enhanced_total: result.enhanced_score.as_ref().map(|s| s.total),
            improvement: result.improvement,
            retries: result.total_retries(),
            error: result.error.clone(),
        }
    }
}

/// What one prompt task hands back to the orchestrator.
struct PromptOutcome {
    result: ComponentResult,
    baseline_generated: bool,
    enhanced_generated: bool,
}

/// Coordinates a full benchmark run.
pub struct BatchOrchestrator {
    config: BenchmarkConfig,
    controller: RetryController,
    scorer: Scorer,
    store: ArtifactStore,
    metrics: BenchMetrics,
}

impl BatchOrchestrator {
    /// Builds an orchestrator around `provider`.
    ///
    /// # Errors
    ///
    /// Fails when the configuration is invalid or metrics cannot be registered.
    pub fn new(
        config: BenchmarkConfig,
        provider: Arc<dyn GenerationProvider>,
    ) -> Result<Self, BenchError> {
        config.validate()?;
        let metrics = BenchMetrics::new()?;

        let controller = RetryController::new(
            provider,
            Validator::new(config.min_code_length),
            config.max_retries,
            config.attempt_timeout,
        )
        .with_metrics(metrics.clone());

        Ok(Self {
            scorer: Scorer::new(config.rubric.clone()),
            store: ArtifactStore::new(config.output_dir.clone()),
            controller,
            metrics,
            config,
        })
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    pub fn metrics(&self) -> &BenchMetrics {
        &self.metrics
    }

    /// Loads the prompt corpus from the configured directory and applies the
    /// single-prompt filter.
    pub fn load_prompts(&self) -> Result<Vec<PromptRecord>, BenchError> {
        let prompts = load_dir(&self.config.prompt_dir)?;
        filter_prompts(prompts, self.config.prompt_filter.as_deref())
    }

    /// Creates the output and report directories and checks both are writable.
    pub async fn prepare(&self) -> Result<(), BenchError> {
        self.store.prepare().await?;
        ensure_writable_dir(&self.config.report_dir).await
    }

    /// Loads prompts from the configured directory and runs them.
    pub async fn execute(
        &self,
        event_tx: Option<mpsc::Sender<BenchmarkEvent>>,
    ) -> Result<BenchmarkRun, BenchError> {
        let prompts = self.load_prompts()?;
        self.run(prompts, event_tx).await
    }

    /// Runs `prompts` to completion.
    ///
    /// Only infrastructure errors are returned, and only before any prompt is
    /// processed. Prompt-level failures are recorded in the run.
    pub async fn run(
        &self,
        prompts: Vec<PromptRecord>,
        event_tx: Option<mpsc::Sender<BenchmarkEvent>>,
    ) -> Result<BenchmarkRun, BenchError> {
        if prompts.is_empty() {
            return Err(BenchError::NoPrompts(self.config.prompt_dir.clone()));
        }
        self.prepare().await?;

        let mut run = BenchmarkRun::new(RunConfigSummary::from(&self.config));
        run.prompt_count = prompts.len();
        let started = Instant::now();

        info!(
            run_id = %run.run_id,
            prompts = prompts.len(),
            max_parallel = self.config.max_parallel,
            max_retries = self.config.max_retries,
            enhancement = self.config.enhancement_enabled(),
            "Benchmark run started"
        );
        emit(
            &event_tx,
            BenchmarkEvent::RunStarted {
                run_id: run.run_id,
                prompts: prompts.len(),
                max_parallel: self.config.max_parallel,
            },
        )
        .await;

        for (index, batch) in prompts.chunks(self.config.max_parallel).enumerate() {
            debug!(batch = index, size = batch.len(), "Starting batch");
            emit(
                &event_tx,
                BenchmarkEvent::BatchStarted {
                    index,
                    size: batch.len(),
                },
            )
            .await;

            let futures = batch.iter().map(|prompt| self.process_prompt(prompt));
            let outcomes = futures::future::join_all(futures).await;

            for outcome in outcomes {
                let result = outcome.result;
                if result.succeeded() {
                    run.stats.record_success();
                    self.metrics.record_prompt("success");
                } else {
                    run.stats.record_failure();
                    self.metrics.record_prompt("failure");
                }
                run.stats.record_retries(result.total_retries());
                if outcome.baseline_generated {
                    run.stats.record_generated(GenerationMode::Baseline);
                }
                if outcome.enhanced_generated {
                    run.stats.record_generated(GenerationMode::Enhanced);
                }

                emit(&event_tx, BenchmarkEvent::prompt_completed(&result)).await;
                run.results.push(result);
            }
        }

        run.sort_results();

        info!(
            run_id = %run.run_id,
            success = run.stats.success,
            failure = run.stats.failure,
            retries = run.stats.retries,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Benchmark run completed"
        );
        emit(
            &event_tx,
            BenchmarkEvent::RunCompleted {
                success: run.stats.success,
                failure: run.stats.failure,
                retries: run.stats.retries,
            },
        )
        .await;

        Ok(run)
    }

    /// Baseline, then enhancement seeded with the baseline artifact.
    async fn process_prompt(&self, prompt: &PromptRecord) -> PromptOutcome {
        let mut artifacts = Vec::new();
        self.persist(
            &mut artifacts,
            prompt,
            "prompt",
            artifact_files::PROMPT,
            &prompt.raw_text,
        )
        .await;

        let baseline = self
            .controller
            .run(prompt, GenerationMode::Baseline, None)
            .await;

        let Some(baseline_code) = baseline.code else {
            let error = baseline
                .error
                .unwrap_or_else(|| "baseline generation failed".to_string());
            warn!(prompt_id = %prompt.id, retries = baseline.retries, error = %error, "Prompt failed");
            return PromptOutcome {
                result: ComponentResult::failed(prompt, baseline.retries, error)
                    .with_artifacts(artifacts),
                baseline_generated: false,
                enhanced_generated: false,
            };
        };

        self.persist(
            &mut artifacts,
            prompt,
            GenerationMode::Baseline.as_str(),
            artifact_files::BASELINE,
            &baseline_code,
        )
        .await;
        let baseline_score = self.score(prompt, &baseline_code, GenerationMode::Baseline);
        let mut result = ComponentResult::scored(prompt, baseline_score, baseline.retries);
        let mut enhanced_generated = false;

        if self.config.enhancement_enabled() {
            let enhanced = self
                .controller
                .run(prompt, GenerationMode::Enhanced, Some(&baseline_code))
                .await;

            match enhanced.code {
                Some(code) => {
                    self.persist(
                        &mut artifacts,
                        prompt,
                        GenerationMode::Enhanced.as_str(),
                        artifact_files::ENHANCED,
                        &code,
                    )
                    .await;
                    let score = self.score(prompt, &code, GenerationMode::Enhanced);
                    result = result.with_enhanced(score, enhanced.retries);
                    enhanced_generated = true;
                }
                None => {
                    let error = enhanced
                        .error
                        .unwrap_or_else(|| "enhancement failed".to_string());
                    warn!(
                        prompt_id = %prompt.id,
                        retries = enhanced.retries,
                        error = %error,
                        "Enhancement failed, keeping baseline scores"
                    );
                    result = result.with_enhancement_error(enhanced.retries, error);
                }
            }
        }

        info!(
            prompt_id = %prompt.id,
            baseline = result.baseline_score.as_ref().map(|s| s.total),
            enhanced = result.enhanced_score.as_ref().map(|s| s.total),
            improvement = result.improvement,
            retries = result.total_retries(),
            "Prompt completed"
        );

        PromptOutcome {
            result: result.with_artifacts(artifacts),
            baseline_generated: true,
            enhanced_generated,
        }
    }

    fn score(&self, prompt: &PromptRecord, code: &str, mode: GenerationMode) -> ScoreRecord {
        let record = self
            .scorer
            .score(&prompt.id, code, &prompt.requirements, mode);
        self.metrics.record_score(mode, record.total);
        record
    }

    /// Writes one artifact; a failed write is logged and skipped.
    async fn persist(
        &self,
        artifacts: &mut Vec<ArtifactRef>,
        prompt: &PromptRecord,
        kind: &str,
        file_name: &str,
        content: &str,
    ) {
        match self.store.write(&prompt.id, kind, file_name, content).await {
            Ok(artifact) => artifacts.push(artifact),
            Err(e) => warn!(
                prompt_id = %prompt.id,
                kind = kind,
                error = %e,
                "Failed to write artifact"
            ),
        }
    }
}

async fn emit(tx: &Option<mpsc::Sender<BenchmarkEvent>>, event: BenchmarkEvent) {
    if let Some(sender) = tx {
        let _ = sender.send(event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::provider::TemplateProvider;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    /// Fails every call for prompts whose id is in `broken`.
    struct SelectiveProvider {
        inner: TemplateProvider,
        broken: Vec<String>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GenerationProvider for SelectiveProvider {
        async fn generate(
            &self,
            prompt: &PromptRecord,
            mode: GenerationMode,
            seed_code: Option<&str>,
        ) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.broken.contains(&prompt.id) {
                return Err(GenerationError::Provider("model unavailable".to_string()));
            }
            self.inner.generate(prompt, mode, seed_code).await
        }
    }

    /// Valid baselines, but every enhancement loses its export.
    struct BrokenEnhancer;

    #[async_trait]
    impl GenerationProvider for BrokenEnhancer {
        async fn generate(
            &self,
            prompt: &PromptRecord,
            mode: GenerationMode,
            seed_code: Option<&str>,
        ) -> Result<String, GenerationError> {
            let code = TemplateProvider::new().generate(prompt, mode, seed_code).await?;
            match mode {
                GenerationMode::Baseline => Ok(code),
                GenerationMode::Enhanced => Ok(code.replace("export default ", "")),
            }
        }
    }

    fn prompts(ids: &[&str]) -> Vec<PromptRecord> {
        ids.iter()
            .map(|id| PromptRecord::new(*id, "Build it.\n- dark mode toggle\n- accessible button\n"))
            .collect()
    }

    fn config(dir: &TempDir) -> BenchmarkConfig {
        BenchmarkConfig::new()
            .with_prompt_dir(dir.path().join("prompts"))
            .with_output_dir(dir.path().join("out"))
            .with_report_dir(dir.path().join("reports"))
            .with_max_retries(2)
            .with_max_parallel(2)
            .with_attempt_timeout(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_clean_run() {
        let dir = TempDir::new().unwrap();
        let orchestrator =
            BatchOrchestrator::new(config(&dir), Arc::new(TemplateProvider::new())).unwrap();

        let run = orchestrator
            .run(prompts(&["theme-toggle", "card", "data-table"]), None)
            .await
            .unwrap();

        assert_eq!(run.prompt_count, 3);
        assert_eq!(run.stats.success, 3);
        assert_eq!(run.stats.failure, 0);
        assert_eq!(run.stats.retries, 0);
        assert_eq!(run.stats.baseline.generated, 3);
        assert_eq!(run.stats.enhanced.generated, 3);

        let ids: Vec<&str> = run.results.iter().map(|r| r.prompt_id.as_str()).collect();
        assert_eq!(ids, vec!["card", "data-table", "theme-toggle"]);

        for result in &run.results {
            let baseline = result.baseline_score.as_ref().unwrap();
            let enhanced = result.enhanced_score.as_ref().unwrap();
            assert_eq!(result.improvement, enhanced.total as i32 - baseline.total as i32);
            assert!(result.improvement >= 0);
            assert_eq!(result.artifacts.len(), 3);
            assert!(result.artifacts.iter().all(|a| a.path.exists()));
        }
    }

    #[tokio::test]
    async fn test_failing_prompt_does_not_block_batch() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(SelectiveProvider {
            inner: TemplateProvider::new(),
            broken: vec!["broken".to_string()],
            calls: AtomicUsize::new(0),
        });
        let orchestrator = BatchOrchestrator::new(config(&dir), provider.clone()).unwrap();

        let run = orchestrator
            .run(prompts(&["alpha", "broken", "gamma"]), None)
            .await
            .unwrap();

        assert_eq!(run.stats.success, 2);
        assert_eq!(run.stats.failure, 1);
        assert_eq!(run.stats.retries, 2);

        let broken = run.results.iter().find(|r| r.prompt_id == "broken").unwrap();
        assert!(broken.baseline_score.is_none());
        assert!(broken.enhanced_score.is_none());
        assert_eq!(broken.improvement, 0);
        assert_eq!(broken.baseline_retries, 2);
        assert!(broken.error.as_deref().unwrap().contains("model unavailable"));

        // 2 healthy prompts x 2 modes + 3 attempts for the broken one
        assert_eq!(provider.calls.load(Ordering::SeqCst), 7);
    }

    #[tokio::test]
    async fn test_baseline_only_skips_enhancement() {
        let dir = TempDir::new().unwrap();
        let orchestrator = BatchOrchestrator::new(
            config(&dir).with_baseline_only(true),
            Arc::new(TemplateProvider::new()),
        )
        .unwrap();

        let run = orchestrator.run(prompts(&["card"]), None).await.unwrap();

        assert!(!run.config.enhancement_enabled);
        assert_eq!(run.stats.enhanced.generated, 0);
        let result = &run.results[0];
        assert!(result.enhanced_score.is_none());
        assert_eq!(result.improvement, 0);
        assert_eq!(result.artifacts.len(), 2);
    }

    #[tokio::test]
    async fn test_enhancement_failure_keeps_baseline() {
        let dir = TempDir::new().unwrap();
        let orchestrator = BatchOrchestrator::new(config(&dir), Arc::new(BrokenEnhancer)).unwrap();

        let run = orchestrator.run(prompts(&["card"]), None).await.unwrap();

        assert_eq!(run.stats.success, 1);
        assert_eq!(run.stats.retries, 2);
        let result = &run.results[0];
        assert!(result.baseline_score.is_some());
        assert!(result.enhanced_score.is_none());
        assert_eq!(result.enhanced_retries, 2);
        assert!(result.enhancement_error.is_some());
        assert_eq!(result.improvement, 0);
    }

    #[tokio::test]
    async fn test_events_emitted() {
        let dir = TempDir::new().unwrap();
        let orchestrator =
            BatchOrchestrator::new(config(&dir), Arc::new(TemplateProvider::new())).unwrap();
        let (tx, mut rx) = mpsc::channel(64);

        orchestrator
            .run(prompts(&["a", "b", "c"]), Some(tx))
            .await
            .unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }

        assert!(matches!(events.first(), Some(BenchmarkEvent::RunStarted { prompts: 3, .. })));
        assert!(matches!(
            events.last(),
            Some(BenchmarkEvent::RunCompleted { success: 3, .. })
        ));
        let batches = events
            .iter()
            .filter(|e| matches!(e, BenchmarkEvent::BatchStarted { .. }))
            .count();
        assert_eq!(batches, 2);
        let completed = events
            .iter()
            .filter(|e| matches!(e, BenchmarkEvent::PromptCompleted { .. }))
            .count();
        assert_eq!(completed, 3);
    }

    #[tokio::test]
    async fn test_empty_prompt_list_is_infrastructure_error() {
        let dir = TempDir::new().unwrap();
        let orchestrator =
            BatchOrchestrator::new(config(&dir), Arc::new(TemplateProvider::new())).unwrap();
        let err = orchestrator.run(Vec::new(), None).await.unwrap_err();
        assert!(matches!(err, BenchError::NoPrompts(_)));
    }

    #[tokio::test]
    async fn test_missing_prompt_dir() {
        let dir = TempDir::new().unwrap();
        let orchestrator =
            BatchOrchestrator::new(config(&dir), Arc::new(TemplateProvider::new())).unwrap();
        let err = orchestrator.execute(None).await.unwrap_err();
        assert!(matches!(err, BenchError::PromptDirMissing(_)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = TempDir::new().unwrap();
        let result = BatchOrchestrator::new(
            config(&dir).with_max_parallel(0),
            Arc::new(TemplateProvider::new()),
        );
        assert!(matches!(result, Err(BenchError::Config(_))));
    }
}
