//! Per-prompt artifact files.
//!
//! Each prompt owns `<output_dir>/<prompt_id>/`, so concurrent tasks never
//! write to the same file and no locking is needed.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::BenchError;
use crate::pipeline::ArtifactRef;

/// Well-known artifact file names.
pub mod artifact_files {
    pub const PROMPT: &str = "prompt.md";
    pub const BASELINE: &str = "baseline.tsx";
    pub const ENHANCED: &str = "enhanced.tsx";
}

/// Filesystem store for generated artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the base storage path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one prompt's artifacts.
    pub fn prompt_dir(&self, prompt_id: &str) -> PathBuf {
        self.root.join(prompt_id)
    }

    /// Creates the root directory and checks that it is writable.
    pub async fn prepare(&self) -> Result<(), BenchError> {
        ensure_writable_dir(&self.root).await
    }

    /// Writes one artifact and returns its reference.
    pub async fn write(
        &self,
        prompt_id: &str,
        kind: &str,
        file_name: &str,
        content: &str,
    ) -> Result<ArtifactRef, std::io::Error> {
        let dir = self.prompt_dir(prompt_id);
        fs::create_dir_all(&dir).await?;

        let path = dir.join(file_name);
        let mut file = fs::File::create(&path).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;

        Ok(ArtifactRef {
            kind: kind.to_string(),
            path,
            sha256: compute_checksum(content.as_bytes()),
        })
    }
}

/// Hex-encoded SHA-256 of `data`.
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Creates `dir` if needed and probes it with a throwaway file.
///
/// # Errors
///
/// Returns `BenchError::OutputDirUnwritable` when the directory cannot be
/// created or written to.
pub async fn ensure_writable_dir(dir: &Path) -> Result<(), BenchError> {
    let unwritable = |e: std::io::Error| BenchError::OutputDirUnwritable {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    };

    fs::create_dir_all(dir).await.map_err(unwritable)?;

    let probe = dir.join(format!(".write-probe-{}", uuid::Uuid::new_v4().simple()));
    fs::write(&probe, b"ok").await.map_err(unwritable)?;
    fs::remove_file(&probe).await.map_err(unwritable)?;
    Ok(())
}
