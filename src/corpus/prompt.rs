//! Prompt records and prompt-directory discovery.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::BenchError;

use super::requirements::extract_requirements;

static PROMPT_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([a-z0-9][a-z0-9_-]*?)[-_]prompt\.(?:md|txt)$").expect("valid prompt regex")
});

/// An unparsed prompt input: a file name and its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPromptSource {
    /// File name (not the full path) used for the naming convention check.
    pub name: String,
    /// Raw prompt text.
    pub content: String,
}

impl RawPromptSource {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// A parsed prompt. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRecord {
    /// Lowercased component kind, unique within a corpus.
    pub id: String,
    /// Component kind as written in the file name (lowercased).
    pub component_kind: String,
    /// Original prompt text.
    pub raw_text: String,
    /// Extracted requirements, in extraction order, duplicates kept.
    pub requirements: Vec<String>,
}

impl PromptRecord {
    /// Builds a record from a component kind and prompt text.
    pub fn new(component_kind: impl Into<String>, raw_text: impl Into<String>) -> Self {
        let component_kind = component_kind.into().to_lowercase();
        let raw_text = raw_text.into();
        let requirements = extract_requirements(&raw_text);
        Self {
            id: component_kind.clone(),
            component_kind,
            raw_text,
            requirements,
        }
    }

    /// Name the generated component is expected to declare (`data-table` -> `DataTable`).
    pub fn component_name(&self) -> String {
        self.component_kind
            .split(['-', '_'])
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect()
    }
}

/// Returns the component kind encoded in a prompt file name, if it follows
/// the `<kind>-prompt.md` / `<kind>_prompt.txt` convention.
pub fn parse_prompt_name(file_name: &str) -> Option<String> {
    PROMPT_NAME_RE
        .captures(file_name)
        .map(|caps| caps[1].to_lowercase())
}

/// Parses raw prompt sources into records.
///
/// Sources that do not match the naming convention or have blank content are
/// skipped with a warning. The result is sorted by id.
pub fn load(sources: Vec<RawPromptSource>) -> Vec<PromptRecord> {
    let mut records: Vec<PromptRecord> = Vec::with_capacity(sources.len());

    for source in sources {
        let Some(kind) = parse_prompt_name(&source.name) else {
            warn!(file = %source.name, "Skipping file: does not match prompt naming convention");
            continue;
        };

        if source.content.trim().is_empty() {
            warn!(file = %source.name, "Skipping empty prompt file");
            continue;
        }

        if records.iter().any(|r| r.id == kind) {
            warn!(file = %source.name, id = %kind, "Skipping duplicate prompt id");
            continue;
        }

        let record = PromptRecord::new(kind, source.content);
        debug!(
            id = %record.id,
            requirements = record.requirements.len(),
            "Loaded prompt"
        );
        records.push(record);
    }

    records.sort_by(|a, b| a.id.cmp(&b.id));
    records
}

/// Lists regular files directly inside `dir`, sorted by file name.
///
/// # Errors
///
/// Returns `BenchError::PromptDirMissing` or `BenchError::PromptDirUnreadable`
/// when the directory cannot be listed.
pub fn discover_prompt_files(dir: &Path) -> Result<Vec<PathBuf>, BenchError> {
    if !dir.is_dir() {
        return Err(BenchError::PromptDirMissing(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| BenchError::PromptDirUnreadable {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Reads every file in `dir` and parses the matching ones into records.
///
/// # Errors
///
/// Infrastructure errors only: a missing or unreadable directory, or no
/// prompt records after filtering by the naming convention.
pub fn load_dir(dir: &Path) -> Result<Vec<PromptRecord>, BenchError> {
    let mut sources = Vec::new();

    for path in discover_prompt_files(dir)? {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        match std::fs::read_to_string(&path) {
            Ok(content) => sources.push(RawPromptSource::new(name, content)),
            Err(e) => warn!(file = %path.display(), error = %e, "Skipping unreadable prompt file"),
        }
    }

    let records = load(sources);
    if records.is_empty() {
        return Err(BenchError::NoPrompts(dir.to_path_buf()));
    }
    Ok(records)
}

/// Applies the single-prompt filter: exact id match wins, otherwise every
/// record whose id contains the filter is kept.
///
/// # Errors
///
/// Returns `BenchError::FilterMatchedNothing` when no record survives.
pub fn filter_prompts(
    records: Vec<PromptRecord>,
    filter: Option<&str>,
) -> Result<Vec<PromptRecord>, BenchError> {
    let Some(filter) = filter.map(str::trim).filter(|f| !f.is_empty()) else {
        return Ok(records);
    };
    let needle = filter.to_lowercase();

    if let Some(exact) = records.iter().find(|r| r.id == needle) {
        return Ok(vec![exact.clone()]);
    }

    let kept: Vec<PromptRecord> = records
        .into_iter()
        .filter(|r| r.id.contains(&needle))
        .collect();

    if kept.is_empty() {
        return Err(BenchError::FilterMatchedNothing(filter.to_string()));
    }
    Ok(kept)
}
