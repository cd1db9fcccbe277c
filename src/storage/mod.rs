//! Filesystem persistence for benchmark runs.
//!
//! - **Artifacts**: per-prompt files (prompt text, baseline and enhanced
//!   artifacts) with SHA-256 digests
//! - **Summary**: the write-once JSON run summary, and loading it back for
//!   report re-rendering

pub mod artifacts;
pub mod summary;

pub use artifacts::{artifact_files, compute_checksum, ensure_writable_dir, ArtifactStore};
pub use summary::{load_run, save_run, summary_path};
