//! Scoring rubric: per-mode axis floors, marker bonuses and axis weights.
//!
//! The defaults are the reference tuning constants. They carry no deeper
//! meaning and can be replaced wholesale from a YAML file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BenchError;
use crate::provider::GenerationMode;

/// Tolerance for the weight-sum check.
const WEIGHT_EPSILON: f64 = 1e-9;

/// One value per score axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisValues {
    pub fidelity: u32,
    pub code_quality: u32,
    pub accessibility: u32,
    pub ux_polish: u32,
    pub innovation: u32,
}

impl AxisValues {
    fn max(&self) -> u32 {
        self.fidelity
            .max(self.code_quality)
            .max(self.accessibility)
            .max(self.ux_polish)
            .max(self.innovation)
    }
}

/// Additive bonuses, applied on top of the floors when a marker is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerBonuses {
    /// `aria-*` attributes -> accessibility.
    pub aria_attributes: u32,
    /// `role=` -> accessibility.
    pub aria_role: u32,
    /// Label association -> accessibility.
    pub label_association: u32,
    /// Transition or animation classes -> ux polish.
    pub transition: u32,
    /// Responsive breakpoints -> code quality.
    pub responsive_quality: u32,
    /// Responsive breakpoints -> ux polish.
    pub responsive_polish: u32,
    /// Dark mode -> innovation.
    pub dark_mode_innovation: u32,
    /// Dark mode -> ux polish.
    pub dark_mode_polish: u32,
    /// Local state or effect hooks -> code quality.
    pub state_hooks: u32,
    /// Error handling -> innovation.
    pub error_handling: u32,
}

impl Default for MarkerBonuses {
    fn default() -> Self {
        Self {
            aria_attributes: 10,
            aria_role: 5,
            label_association: 5,
            transition: 5,
            responsive_quality: 5,
            responsive_polish: 5,
            dark_mode_innovation: 10,
            dark_mode_polish: 5,
            state_hooks: 5,
            error_handling: 5,
        }
    }
}

impl MarkerBonuses {
    fn max(&self) -> u32 {
        [
            self.aria_attributes,
            self.aria_role,
            self.label_association,
            self.transition,
            self.responsive_quality,
            self.responsive_polish,
            self.dark_mode_innovation,
            self.dark_mode_polish,
            self.state_hooks,
            self.error_handling,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// Axis weights for the total score. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisWeights {
    pub fidelity: f64,
    pub code_quality: f64,
    pub accessibility: f64,
    pub ux_polish: f64,
    pub innovation: f64,
}

impl Default for AxisWeights {
    fn default() -> Self {
        Self {
            fidelity: 0.35,
            code_quality: 0.25,
            accessibility: 0.15,
            ux_polish: 0.15,
            innovation: 0.10,
        }
    }
}

impl AxisWeights {
    pub fn sum(&self) -> f64 {
        self.fidelity + self.code_quality + self.accessibility + self.ux_polish + self.innovation
    }

    fn all(&self) -> [f64; 5] {
        [
            self.fidelity,
            self.code_quality,
            self.accessibility,
            self.ux_polish,
            self.innovation,
        ]
    }
}

/// Complete scoring configuration, fixed for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRubric {
    pub baseline_floors: AxisValues,
    pub enhanced_floors: AxisValues,
    pub bonuses: MarkerBonuses,
    pub weights: AxisWeights,
    /// A requirement is matched when strictly more than this share of its
    /// tokens appears in the artifact.
    pub fidelity_match_ratio: f64,
    /// Tokens must be longer than this many characters to count.
    pub min_token_length: usize,
}

impl Default for ScoringRubric {
    fn default() -> Self {
        Self {
            baseline_floors: AxisValues {
                fidelity: 70,
                code_quality: 65,
                accessibility: 50,
                ux_polish: 55,
                innovation: 40,
            },
            enhanced_floors: AxisValues {
                fidelity: 85,
                code_quality: 80,
                accessibility: 85,
                ux_polish: 85,
                innovation: 75,
            },
            bonuses: MarkerBonuses::default(),
            weights: AxisWeights::default(),
            fidelity_match_ratio: 0.6,
            min_token_length: 3,
        }
    }
}

impl ScoringRubric {
    /// Loads a rubric from YAML. Omitted sections keep their defaults.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, does not parse, or does not pass
    /// [`ScoringRubric::validate`].
    pub fn from_yaml_file(path: &Path) -> Result<Self, BenchError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, BenchError> {
        let rubric: ScoringRubric = serde_yaml::from_str(content)?;
        rubric.validate()?;
        Ok(rubric)
    }

    pub fn floors(&self, mode: GenerationMode) -> &AxisValues {
        match mode {
            GenerationMode::Baseline => &self.baseline_floors,
            GenerationMode::Enhanced => &self.enhanced_floors,
        }
    }

    /// Checks weights, floors, bonuses and the match ratio.
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.weights.all().iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(BenchError::Rubric(
                "weights must be finite and non-negative".to_string(),
            ));
        }

        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_EPSILON {
            return Err(BenchError::Rubric(format!(
                "weights must sum to 1.0, got {}",
                sum
            )));
        }

        for (label, floors) in [
            ("baseline", &self.baseline_floors),
            ("enhanced", &self.enhanced_floors),
        ] {
            if floors.max() > 100 {
                return Err(BenchError::Rubric(format!(
                    "{} floors must be within 0-100",
                    label
                )));
            }
        }

        if self.bonuses.max() > 100 {
            return Err(BenchError::Rubric(
                "bonuses must be within 0-100".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.fidelity_match_ratio) {
            return Err(BenchError::Rubric(format!(
                "fidelity_match_ratio must be within 0.0-1.0, got {}",
                self.fidelity_match_ratio
            )));
        }

        Ok(())
    }
}
