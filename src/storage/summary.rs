//! Write-once run summaries.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::BenchError;
use crate::pipeline::BenchmarkRun;

/// Path of the summary file for `run` inside `report_dir`.
pub fn summary_path(report_dir: &Path, run: &BenchmarkRun) -> PathBuf {
    report_dir.join(format!("benchmark-summary-{}.json", run.stamp()))
}

/// Persists `run` as pretty JSON. Never overwrites an existing summary.
///
/// # Errors
///
/// Returns `BenchError::SummaryExists` when the target file is already
/// present, or an I/O / serialization error.
pub async fn save_run(report_dir: &Path, run: &BenchmarkRun) -> Result<PathBuf, BenchError> {
    fs::create_dir_all(report_dir).await?;
    let path = summary_path(report_dir, run);

    let mut file = match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Err(BenchError::SummaryExists(path));
        }
        Err(e) => return Err(e.into()),
    };

    let json = serde_json::to_string_pretty(run)?;
    file.write_all(json.as_bytes()).await?;
    file.sync_all().await?;

    tracing::info!(path = %path.display(), run_id = %run.run_id, "Run summary written");
    Ok(path)
}

/// Loads a persisted run summary.
pub fn load_run(path: &Path) -> Result<BenchmarkRun, BenchError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{BenchmarkConfig, RunConfigSummary};
    use tempfile::TempDir;

    fn run() -> BenchmarkRun {
        let mut run = BenchmarkRun::new(RunConfigSummary::from(&BenchmarkConfig::default()));
        run.prompt_count = 2;
        run.stats.success = 1;
        run.stats.failure = 1;
        run
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let run = run();

        let path = save_run(dir.path(), &run).await.unwrap();
        assert!(path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("benchmark-summary-") && n.ends_with(".json")));

        let loaded = load_run(&path).unwrap();
        assert_eq!(loaded, run);
    }

    #[tokio::test]
    async fn test_save_is_write_once() {
        let dir = TempDir::new().unwrap();
        let run = run();

        let path = save_run(dir.path(), &run).await.unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let err = save_run(dir.path(), &run).await.unwrap_err();
        assert!(matches!(err, BenchError::SummaryExists(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_save_creates_report_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("reports").join("nested");

        let path = save_run(&nested, &run()).await.unwrap();
        assert!(path.starts_with(&nested));
        assert!(path.is_file());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_run(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, BenchError::Io(_)));
    }
}
