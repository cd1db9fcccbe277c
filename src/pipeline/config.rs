//! Benchmark run configuration.
//!
//! Values come from defaults, then `BENCH_*` environment variables, then CLI
//! flags (applied through the `with_*` builders). Everything here is fixed
//! for the duration of a run.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::retry::{DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_MAX_RETRIES};
use crate::scoring::ScoringRubric;
use crate::validation::DEFAULT_MIN_CODE_LENGTH;

/// Default number of prompts processed concurrently per batch.
pub const DEFAULT_MAX_PARALLEL: usize = 3;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration for one benchmark run.
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    // Paths
    /// Directory containing `<kind>-prompt.md` files.
    pub prompt_dir: PathBuf,
    /// Root of the per-prompt artifact directories.
    pub output_dir: PathBuf,
    /// Directory receiving the run summary, reports and metrics.
    pub report_dir: PathBuf,

    // Execution
    /// Retry budget per `(prompt, mode)`. Run-wide, never adaptive.
    pub max_retries: u32,
    /// Batch size; bounds peak concurrency.
    pub max_parallel: usize,
    /// Skip the enhanced pass entirely.
    pub baseline_only: bool,
    /// Restrict the run to prompts whose id equals or contains this value.
    pub prompt_filter: Option<String>,
    /// Upper bound on a single provider call.
    pub attempt_timeout: Duration,

    // Validation and scoring
    /// Minimum artifact length for the validator.
    pub min_code_length: usize,
    pub rubric: ScoringRubric,

    // Reporting
    /// Embed Mermaid charts in the Markdown report.
    pub charts: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            prompt_dir: PathBuf::from("./prompts"),
            output_dir: PathBuf::from("./bench-output"),
            report_dir: PathBuf::from("./bench-reports"),

            max_retries: DEFAULT_MAX_RETRIES,
            max_parallel: DEFAULT_MAX_PARALLEL,
            baseline_only: false,
            prompt_filter: None,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,

            min_code_length: DEFAULT_MIN_CODE_LENGTH,
            rubric: ScoringRubric::default(),

            charts: true,
        }
    }
}

impl BenchmarkConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `BENCH_PROMPT_DIR`: Prompt directory (default: ./prompts)
    /// - `BENCH_OUTPUT_DIR`: Artifact directory (default: ./bench-output)
    /// - `BENCH_REPORT_DIR`: Report directory (default: ./bench-reports)
    /// - `BENCH_MAX_RETRIES`: Retries per prompt and mode (default: 3)
    /// - `BENCH_MAX_PARALLEL`: Prompts per batch (default: 3)
    /// - `BENCH_BASELINE_ONLY`: Skip enhancement (default: false)
    /// - `BENCH_PROMPT_FILTER`: Single-prompt filter
    /// - `BENCH_ATTEMPT_TIMEOUT_SECS`: Per-attempt timeout (default: 120)
    /// - `BENCH_MIN_CODE_LENGTH`: Validator minimum length (default: 200)
    /// - `BENCH_CHARTS`: Embed charts in the report (default: true)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable has an invalid value or the
    /// resulting configuration fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::from_env_unvalidated()?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`BenchmarkConfig::from_env`], but leaves validation to the
    /// caller so later overrides can still fix an out-of-range value.
    pub fn from_env_unvalidated() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from `lookup`, which maps a `BENCH_*` key to
    /// its value. Does not validate.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(val) = lookup("BENCH_PROMPT_DIR") {
            config.prompt_dir = PathBuf::from(val);
        }

        if let Some(val) = lookup("BENCH_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(val);
        }

        if let Some(val) = lookup("BENCH_REPORT_DIR") {
            config.report_dir = PathBuf::from(val);
        }

        if let Some(val) = lookup("BENCH_MAX_RETRIES") {
            config.max_retries = parse_env_value(&val, "BENCH_MAX_RETRIES")?;
        }

        if let Some(val) = lookup("BENCH_MAX_PARALLEL") {
            config.max_parallel = parse_env_value(&val, "BENCH_MAX_PARALLEL")?;
        }

        if let Some(val) = lookup("BENCH_BASELINE_ONLY") {
            config.baseline_only = parse_env_bool(&val, "BENCH_BASELINE_ONLY")?;
        }

        if let Some(val) = lookup("BENCH_PROMPT_FILTER") {
            let val = val.trim();
            if !val.is_empty() {
                config.prompt_filter = Some(val.to_string());
            }
        }

        if let Some(val) = lookup("BENCH_ATTEMPT_TIMEOUT_SECS") {
            let secs: u64 = parse_env_value(&val, "BENCH_ATTEMPT_TIMEOUT_SECS")?;
            config.attempt_timeout = Duration::from_secs(secs);
        }

        if let Some(val) = lookup("BENCH_MIN_CODE_LENGTH") {
            config.min_code_length = parse_env_value(&val, "BENCH_MIN_CODE_LENGTH")?;
        }

        if let Some(val) = lookup("BENCH_CHARTS") {
            config.charts = parse_env_bool(&val, "BENCH_CHARTS")?;
        }

        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` if any values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_parallel == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_parallel must be greater than 0".to_string(),
            ));
        }

        if self.attempt_timeout.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "attempt_timeout must be greater than 0".to_string(),
            ));
        }

        if self.prompt_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "prompt_dir cannot be empty".to_string(),
            ));
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "output_dir cannot be empty".to_string(),
            ));
        }

        if self.report_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "report_dir cannot be empty".to_string(),
            ));
        }

        self.rubric
            .validate()
            .map_err(|e| ConfigError::ValidationFailed(format!("rubric: {}", e)))?;

        Ok(())
    }

    /// Whether the enhanced pass runs.
    pub fn enhancement_enabled(&self) -> bool {
        !self.baseline_only
    }

    /// Builder method to set the prompt directory.
    pub fn with_prompt_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.prompt_dir = path.into();
        self
    }

    /// Builder method to set the artifact output directory.
    pub fn with_output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = path.into();
        self
    }

    /// Builder method to set the report directory.
    pub fn with_report_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_dir = path.into();
        self
    }

    /// Builder method to set the retry budget.
    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    /// Builder method to set the batch size.
    pub fn with_max_parallel(mut self, max: usize) -> Self {
        self.max_parallel = max;
        self
    }

    /// Builder method to enable or disable baseline-only mode.
    pub fn with_baseline_only(mut self, baseline_only: bool) -> Self {
        self.baseline_only = baseline_only;
        self
    }

    /// Builder method to set the single-prompt filter.
    pub fn with_prompt_filter(mut self, filter: Option<String>) -> Self {
        self.prompt_filter = filter.filter(|f| !f.trim().is_empty());
        self
    }

    /// Builder method to set the per-attempt timeout.
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Builder method to set the validator minimum length.
    pub fn with_min_code_length(mut self, length: usize) -> Self {
        self.min_code_length = length;
        self
    }

    /// Builder method to set the scoring rubric.
    pub fn with_rubric(mut self, rubric: ScoringRubric) -> Self {
        self.rubric = rubric;
        self
    }

    /// Builder method to enable or disable report charts.
    pub fn with_charts(mut self, charts: bool) -> Self {
        self.charts = charts;
        self
    }
}

/// Parse an environment variable value into a type.
fn parse_env_value<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("could not parse '{}'", value),
    })
}

/// Parse an environment variable as a boolean.
fn parse_env_bool(value: &str, key: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected boolean value, got '{}'", value),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.prompt_dir, PathBuf::from("./prompts"));
        assert_eq!(config.output_dir, PathBuf::from("./bench-output"));
        assert_eq!(config.report_dir, PathBuf::from("./bench-reports"));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.max_parallel, 3);
        assert!(!config.baseline_only);
        assert!(config.enhancement_enabled());
        assert!(config.prompt_filter.is_none());
        assert_eq!(config.attempt_timeout, Duration::from_secs(120));
        assert_eq!(config.min_code_length, 200);
        assert!(config.charts);
    }

    #[test]
    fn test_config_builder() {
        let config = BenchmarkConfig::new()
            .with_prompt_dir("/p")
            .with_output_dir("/o")
            .with_report_dir("/r")
            .with_max_retries(5)
            .with_max_parallel(8)
            .with_baseline_only(true)
            .with_prompt_filter(Some("table".to_string()))
            .with_attempt_timeout(Duration::from_secs(10))
            .with_min_code_length(50)
            .with_charts(false);

        assert_eq!(config.prompt_dir, PathBuf::from("/p"));
        assert_eq!(config.output_dir, PathBuf::from("/o"));
        assert_eq!(config.report_dir, PathBuf::from("/r"));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.max_parallel, 8);
        assert!(!config.enhancement_enabled());
        assert_eq!(config.prompt_filter.as_deref(), Some("table"));
        assert_eq!(config.attempt_timeout, Duration::from_secs(10));
        assert_eq!(config.min_code_length, 50);
        assert!(!config.charts);
    }

    #[test]
    fn test_blank_filter_is_none() {
        let config = BenchmarkConfig::new().with_prompt_filter(Some("  ".to_string()));
        assert!(config.prompt_filter.is_none());
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(BenchmarkConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_retries_is_valid() {
        assert!(BenchmarkConfig::default().with_max_retries(0).validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_parallel() {
        let result = BenchmarkConfig::default().with_max_parallel(0).validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("max_parallel"));
    }

    #[test]
    fn test_validation_invalid_timeout() {
        let result = BenchmarkConfig::default()
            .with_attempt_timeout(Duration::ZERO)
            .validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("attempt_timeout"));
    }

    #[test]
    fn test_validation_empty_dirs() {
        let result = BenchmarkConfig::default().with_report_dir("").validate();
        assert!(result.unwrap_err().to_string().contains("report_dir"));
    }

    #[test]
    fn test_validation_bad_rubric() {
        let mut rubric = ScoringRubric::default();
        rubric.weights.fidelity = 0.9;
        let result = BenchmarkConfig::default().with_rubric(rubric).validate();
        assert!(result.unwrap_err().to_string().contains("rubric"));
    }

    fn lookup_from(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_from_lookup_reads_values() {
        let config = BenchmarkConfig::from_lookup(lookup_from(&[
            ("BENCH_PROMPT_DIR", "/tmp/p"),
            ("BENCH_MAX_RETRIES", "5"),
            ("BENCH_BASELINE_ONLY", "yes"),
            ("BENCH_ATTEMPT_TIMEOUT_SECS", "30"),
            ("BENCH_PROMPT_FILTER", "  "),
        ]))
        .unwrap();

        assert_eq!(config.prompt_dir, PathBuf::from("/tmp/p"));
        assert_eq!(config.max_retries, 5);
        assert!(config.baseline_only);
        assert_eq!(config.attempt_timeout, Duration::from_secs(30));
        assert_eq!(config.prompt_filter, None);
        assert_eq!(config.max_parallel, DEFAULT_MAX_PARALLEL);
    }

    #[test]
    fn test_from_lookup_defers_validation() {
        let config =
            BenchmarkConfig::from_lookup(lookup_from(&[("BENCH_MAX_PARALLEL", "0")])).unwrap();
        assert_eq!(config.max_parallel, 0);
        assert!(config.validate().is_err());
        assert!(config.with_max_parallel(2).validate().is_ok());
    }

    #[test]
    fn test_from_lookup_rejects_unparseable() {
        let err = BenchmarkConfig::from_lookup(lookup_from(&[("BENCH_MAX_PARALLEL", "many")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_parse_env_bool() {
        assert!(parse_env_bool("true", "test").unwrap());
        assert!(parse_env_bool("1", "test").unwrap());
        assert!(parse_env_bool("YES", "test").unwrap());
        assert!(parse_env_bool(" on ", "test").unwrap());

        assert!(!parse_env_bool("false", "test").unwrap());
        assert!(!parse_env_bool("0", "test").unwrap());
        assert!(!parse_env_bool("off", "test").unwrap());

        assert!(parse_env_bool("maybe", "test").is_err());
    }

    #[test]
    fn test_parse_env_value() {
        let n: u32 = parse_env_value(" 7 ", "BENCH_MAX_RETRIES").unwrap();
        assert_eq!(n, 7);
        let err = parse_env_value::<u32>("seven", "BENCH_MAX_RETRIES").unwrap_err();
        assert!(err.to_string().contains("BENCH_MAX_RETRIES"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            key: "KEY".to_string(),
            message: "bad value".to_string(),
        };
        assert!(err.to_string().contains("KEY"));
        assert!(err.to_string().contains("bad value"));

        let err = ConfigError::ValidationFailed("test failure".to_string());
        assert!(err.to_string().contains("test failure"));
    }
}
