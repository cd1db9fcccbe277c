//! Bounded retry of generation + validation attempts.
//!
//! Every `(prompt, mode)` pair is driven through an explicit state machine:
//!
//! ```text
//! Pending -> Attempting -> Succeeded            (valid artifact)
//!                       -> Retrying -> Attempting (failure, retries < max)
//!                       -> Exhausted            (failure, retries == max)
//! ```
//!
//! Provider errors, timeouts and invalid artifacts are all the same thing to
//! the machine: a failed attempt that consumes one retry. Nothing escapes to
//! the orchestrator except the frozen [`GenerationAttempt`].

mod machine;

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::corpus::PromptRecord;
use crate::error::GenerationError;
use crate::metrics::BenchMetrics;
use crate::provider::{GenerationMode, GenerationProvider};
use crate::validation::Validator;

pub use machine::{AttemptState, RetryMachine, Transition};

/// Default retry budget per `(prompt, mode)`.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default per-attempt timeout.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(120);

/// Result of driving one `(prompt, mode)` pair to a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationAttempt {
    pub prompt_id: String,
    pub mode: GenerationMode,
    /// The validated artifact, present only on success.
    pub code: Option<String>,
    /// Retries consumed; never exceeds the configured maximum.
    pub retries: u32,
    /// Provider calls made (`retries + 1`).
    pub attempts: u32,
    pub succeeded: bool,
    /// Last failure, present only when retries were exhausted.
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

/// Runs generation attempts under a fixed retry budget and timeout.
#[derive(Clone)]
pub struct RetryController {
    provider: Arc<dyn GenerationProvider>,
    validator: Validator,
    max_retries: u32,
    attempt_timeout: Duration,
    metrics: Option<BenchMetrics>,
}

impl RetryController {
    pub fn new(
        provider: Arc<dyn GenerationProvider>,
        validator: Validator,
        max_retries: u32,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            validator,
            max_retries,
            attempt_timeout,
            metrics: None,
        }
    }

    /// Records per-attempt metrics into `metrics`.
    pub fn with_metrics(mut self, metrics: BenchMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Drives `(prompt, mode)` until success or exhaustion.
    pub async fn run(
        &self,
        prompt: &PromptRecord,
        mode: GenerationMode,
        seed_code: Option<&str>,
    ) -> GenerationAttempt {
        let started = Instant::now();
        let expected_name = prompt.component_name();
        let mut machine = RetryMachine::new(self.max_retries);

        while machine.begin_attempt() {
            let attempt_started = Instant::now();
            let outcome = self.attempt(prompt, mode, seed_code, &expected_name).await;
            self.record_attempt(mode, &outcome, attempt_started.elapsed());

            match machine.step(outcome) {
                Some(Transition::Succeeded(code)) => {
                    let attempt = GenerationAttempt {
                        prompt_id: prompt.id.clone(),
                        mode,
                        code: Some(code),
                        retries: machine.retries(),
                        attempts: machine.retries() + 1,
                        succeeded: true,
                        error: None,
                        elapsed_ms: started.elapsed().as_millis() as u64,
                    };
                    info!(
                        prompt_id = %prompt.id,
                        mode = %mode,
                        retries = attempt.retries,
                        "Generation succeeded"
                    );
                    return attempt;
                }
                Some(Transition::Retrying { retries, reason }) => {
                    warn!(
                        prompt_id = %prompt.id,
                        mode = %mode,
                        retries,
                        max_retries = self.max_retries,
                        reason = %reason,
                        "Attempt failed, retrying"
                    );
                    if let Some(metrics) = &self.metrics {
                        metrics.record_retry(mode);
                    }
                }
                Some(Transition::Exhausted { reason }) => {
                    warn!(
                        prompt_id = %prompt.id,
                        mode = %mode,
                        retries = machine.retries(),
                        reason = %reason,
                        "Retries exhausted"
                    );
                    return self.exhausted(prompt, mode, &machine, reason, started);
                }
                None => break,
            }
        }

        self.exhausted(
            prompt,
            mode,
            &machine,
            "retry machine stopped unexpectedly".to_string(),
            started,
        )
    }

    /// One provider call plus validation, bounded by the attempt timeout.
    async fn attempt(
        &self,
        prompt: &PromptRecord,
        mode: GenerationMode,
        seed_code: Option<&str>,
        expected_name: &str,
    ) -> Result<String, GenerationError> {
        let generated = tokio::time::timeout(
            self.attempt_timeout,
            self.provider.generate(prompt, mode, seed_code),
        )
        .await
        .map_err(|_| GenerationError::Timeout {
            millis: self.attempt_timeout.as_millis() as u64,
        })??;

        let validation = self.validator.validate(&generated, expected_name);
        if validation.valid {
            Ok(generated)
        } else {
            debug!(
                prompt_id = %prompt.id,
                mode = %mode,
                failed_rules = ?validation.failed_rules,
                "Artifact failed validation"
            );
            Err(GenerationError::InvalidArtifact {
                reasons: validation.reasons,
            })
        }
    }

    fn record_attempt(
        &self,
        mode: GenerationMode,
        outcome: &Result<String, GenerationError>,
        elapsed: Duration,
    ) {
        let Some(metrics) = &self.metrics else {
            return;
        };
        let label = match outcome {
            Ok(_) => "valid",
            Err(GenerationError::InvalidArtifact { .. }) => "invalid",
            Err(GenerationError::Timeout { .. }) => "timeout",
            Err(_) => "provider_error",
        };
        metrics.record_attempt(mode, label, elapsed.as_secs_f64());
    }

    fn exhausted(
        &self,
        prompt: &PromptRecord,
        mode: GenerationMode,
        machine: &RetryMachine,
        reason: String,
        started: Instant,
    ) -> GenerationAttempt {
        GenerationAttempt {
            prompt_id: prompt.id.clone(),
            mode,
            code: None,
            retries: machine.retries(),
            attempts: machine.retries() + 1,
            succeeded: false,
            error: Some(reason),
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    }
}
