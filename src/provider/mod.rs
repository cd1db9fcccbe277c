//! Generation provider contract.
//!
//! The pipeline never generates code itself. It asks a [`GenerationProvider`]
//! for a candidate artifact and validates whatever comes back. Providers may
//! fail at any time; the retry controller absorbs those failures.

mod template;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::corpus::PromptRecord;
use crate::error::GenerationError;

pub use template::TemplateProvider;

/// Which pass of the benchmark an artifact belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// First-pass generation from the prompt alone.
    Baseline,
    /// Improvement pass seeded with the baseline artifact.
    Enhanced,
}

impl GenerationMode {
    /// Stable lowercase label, used for file names and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Baseline => "baseline",
            GenerationMode::Enhanced => "enhanced",
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GenerationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "baseline" => Ok(GenerationMode::Baseline),
            "enhanced" | "enhance" => Ok(GenerationMode::Enhanced),
            other => Err(format!(
                "unknown mode '{}': expected 'baseline' or 'enhanced'",
                other
            )),
        }
    }
}

/// Produces candidate UI-component artifacts.
///
/// `seed_code` is `Some(baseline)` only for [`GenerationMode::Enhanced`].
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generates one candidate artifact.
    async fn generate(
        &self,
        prompt: &PromptRecord,
        mode: GenerationMode,
        seed_code: Option<&str>,
    ) -> Result<String, GenerationError>;

    /// Provider name for logs and reports.
    fn name(&self) -> &str {
        "custom"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_display_and_parse() {
        assert_eq!(GenerationMode::Baseline.to_string(), "baseline");
        assert_eq!(GenerationMode::Enhanced.to_string(), "enhanced");
        assert_eq!(
            "Enhance".parse::<GenerationMode>(),
            Ok(GenerationMode::Enhanced)
        );
        assert!("final".parse::<GenerationMode>().is_err());
    }

    #[test]
    fn test_mode_serde() {
        let json = serde_json::to_string(&GenerationMode::Enhanced).expect("serialize");
        assert_eq!(json, "\"enhanced\"");
    }
}
