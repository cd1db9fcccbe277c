//! Five-axis artifact scoring.
//!
//! Each axis starts at the mode's floor, gains marker bonuses and is capped
//! at 100. When the prompt has requirements, fidelity is replaced by the
//! share of requirements the artifact covers. The total is the rounded
//! weighted sum of the five axes.
//!
//! Scoring is a pure function of its inputs.

mod markers;
mod rubric;

use serde::{Deserialize, Serialize};

use crate::provider::GenerationMode;

pub use markers::{requirement_matched, significant_tokens, MarkerSet};
pub use rubric::{AxisValues, AxisWeights, MarkerBonuses, ScoringRubric};

/// Upper bound of every axis.
pub const MAX_AXIS_SCORE: u32 = 100;

/// Scores for one artifact. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub prompt_id: String,
    pub mode: GenerationMode,
    pub fidelity: u32,
    pub code_quality: u32,
    pub accessibility: u32,
    pub ux_polish: u32,
    pub innovation: u32,
    pub total: u32,
}

impl ScoreRecord {
    /// Axis values as `(name, value)` pairs, in weight order.
    pub fn axes(&self) -> [(&'static str, u32); 5] {
        [
            ("fidelity", self.fidelity),
            ("code_quality", self.code_quality),
            ("accessibility", self.accessibility),
            ("ux_polish", self.ux_polish),
            ("innovation", self.innovation),
        ]
    }
}

/// Rounded weighted sum of the five axes.
pub fn weighted_total(weights: &AxisWeights, axes: &AxisValues) -> u32 {
    let sum = weights.fidelity * f64::from(axes.fidelity)
        + weights.code_quality * f64::from(axes.code_quality)
        + weights.accessibility * f64::from(axes.accessibility)
        + weights.ux_polish * f64::from(axes.ux_polish)
        + weights.innovation * f64::from(axes.innovation);
    sum.round().clamp(0.0, f64::from(MAX_AXIS_SCORE)) as u32
}

/// Floor plus bonuses, capped at [`MAX_AXIS_SCORE`]. Never wraps.
fn capped_axis(floor: u32, bonuses: &[u32]) -> u32 {
    bonuses
        .iter()
        .fold(floor, |acc, b| acc.saturating_add(*b))
        .min(MAX_AXIS_SCORE)
}

/// Share of requirements covered by `code`, as a 0-100 percentage.
/// Returns `None` for an empty requirement list.
pub fn fidelity_coverage(code: &str, requirements: &[String], rubric: &ScoringRubric) -> Option<u32> {
    if requirements.is_empty() {
        return None;
    }
    let code_lower = code.to_lowercase();
    let matched = requirements
        .iter()
        .filter(|r| {
            requirement_matched(
                r,
                &code_lower,
                rubric.min_token_length,
                rubric.fidelity_match_ratio,
            )
        })
        .count();
    Some((100.0 * matched as f64 / requirements.len() as f64).round() as u32)
}

/// Applies a [`ScoringRubric`] to artifacts.
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    rubric: ScoringRubric,
}

impl Scorer {
    pub fn new(rubric: ScoringRubric) -> Self {
        Self { rubric }
    }

    pub fn rubric(&self) -> &ScoringRubric {
        &self.rubric
    }

    pub fn score(
        &self,
        prompt_id: &str,
        code: &str,
        requirements: &[String],
        mode: GenerationMode,
    ) -> ScoreRecord {
        let floors = self.rubric.floors(mode);
        let bonus = &self.rubric.bonuses;
        let markers = MarkerSet::detect(code);

        let when = |present: bool, value: u32| if present { value } else { 0 };

        let fidelity = fidelity_coverage(code, requirements, &self.rubric)
            .unwrap_or(floors.fidelity);

        let axes = AxisValues {
            fidelity: capped_axis(fidelity, &[]),
            code_quality: capped_axis(
                floors.code_quality,
                &[
                    when(markers.responsive, bonus.responsive_quality),
                    when(markers.state_hooks, bonus.state_hooks),
                ],
            ),
            accessibility: capped_axis(
                floors.accessibility,
                &[
                    when(markers.aria_attributes, bonus.aria_attributes),
                    when(markers.aria_role, bonus.aria_role),
                    when(markers.label_association, bonus.label_association),
                ],
            ),
            ux_polish: capped_axis(
                floors.ux_polish,
                &[
                    when(markers.transition, bonus.transition),
                    when(markers.responsive, bonus.responsive_polish),
                    when(markers.dark_mode, bonus.dark_mode_polish),
                ],
            ),
            innovation: capped_axis(
                floors.innovation,
                &[
                    when(markers.dark_mode, bonus.dark_mode_innovation),
                    when(markers.error_handling, bonus.error_handling),
                ],
            ),
        };

        let total = weighted_total(&self.rubric.weights, &axes);

        tracing::debug!(
            prompt_id = prompt_id,
            mode = %mode,
            total,
            fidelity = axes.fidelity,
            "Scored artifact"
        );

        ScoreRecord {
            prompt_id: prompt_id.to_string(),
            mode,
            fidelity: axes.fidelity,
            code_quality: axes.code_quality,
            accessibility: axes.accessibility,
            ux_polish: axes.ux_polish,
            innovation: axes.innovation,
            total,
        }
    }
}
