//! Structural validation of generated artifacts.
//!
//! The validator does not execute or type-check anything. It applies six
//! independent rules and reports every rule that fails, so a single result
//! explains all of an artifact's problems at once.

mod rules;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use rules::{count_markup_tags, MarkupCounts};

/// Minimum artifact length in characters for the reference rubric.
pub const DEFAULT_MIN_CODE_LENGTH: usize = 200;

/// Identity of a single validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationRule {
    MinimumLength,
    FrameworkImport,
    ComponentDeclaration,
    RenderExpression,
    BalancedMarkup,
    ExportStatement,
}

impl ValidationRule {
    /// All rules in evaluation order.
    pub const ALL: [ValidationRule; 6] = [
        ValidationRule::MinimumLength,
        ValidationRule::FrameworkImport,
        ValidationRule::ComponentDeclaration,
        ValidationRule::RenderExpression,
        ValidationRule::BalancedMarkup,
        ValidationRule::ExportStatement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationRule::MinimumLength => "minimum_length",
            ValidationRule::FrameworkImport => "framework_import",
            ValidationRule::ComponentDeclaration => "component_declaration",
            ValidationRule::RenderExpression => "render_expression",
            ValidationRule::BalancedMarkup => "balanced_markup",
            ValidationRule::ExportStatement => "export_statement",
        }
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of validating one artifact. Consumed immediately by the retry
/// controller and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    /// One human-readable reason per failing rule.
    pub reasons: Vec<String>,
    /// Failing rules, in evaluation order.
    pub failed_rules: Vec<ValidationRule>,
}

impl ValidationResult {
    fn from_failures(failures: Vec<(ValidationRule, String)>) -> Self {
        let (failed_rules, reasons): (Vec<_>, Vec<_>) = failures.into_iter().unzip();
        Self {
            valid: failed_rules.is_empty(),
            reasons,
            failed_rules,
        }
    }

    /// Returns true if `rule` is among the failing rules.
    pub fn failed(&self, rule: ValidationRule) -> bool {
        self.failed_rules.contains(&rule)
    }
}

/// Checks artifacts for structural well-formedness.
#[derive(Debug, Clone)]
pub struct Validator {
    min_length: usize,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CODE_LENGTH)
    }
}

impl Validator {
    /// Creates a validator with the given minimum length. The threshold is
    /// fixed for the lifetime of the validator, and therefore of a run.
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Validates `code`, expecting a function or constant named `expected_name`.
    pub fn validate(&self, code: &str, expected_name: &str) -> ValidationResult {
        let mut failures = Vec::new();

        let length = code.trim().chars().count();
        if length < self.min_length {
            failures.push((
                ValidationRule::MinimumLength,
                format!(
                    "artifact is {} characters, minimum is {}",
                    length, self.min_length
                ),
            ));
        }

        if !rules::has_framework_import(code) {
            failures.push((
                ValidationRule::FrameworkImport,
                "no UI framework import statement found".to_string(),
            ));
        }

        if !rules::has_declaration(code, expected_name) {
            failures.push((
                ValidationRule::ComponentDeclaration,
                format!("no function or constant named '{}' declared", expected_name),
            ));
        }

        if !rules::has_render_expression(code) {
            failures.push((
                ValidationRule::RenderExpression,
                "no return or render expression found".to_string(),
            ));
        }

        let counts = count_markup_tags(code);
        if !counts.is_balanced() {
            failures.push((
                ValidationRule::BalancedMarkup,
                format!(
                    "unbalanced markup: {} opening (excluding {} self-closing) vs {} closing tags",
                    counts.opening - counts.self_closing,
                    counts.self_closing,
                    counts.closing
                ),
            ));
        }

        if !rules::has_export(code) {
            failures.push((
                ValidationRule::ExportStatement,
                "no export statement found".to_string(),
            ));
        }

        ValidationResult::from_failures(failures)
    }
}
