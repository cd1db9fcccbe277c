//! Substring marker detection over artifact text.

/// Markers found in one artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerSet {
    pub aria_attributes: bool,
    pub aria_role: bool,
    pub label_association: bool,
    pub transition: bool,
    pub responsive: bool,
    pub dark_mode: bool,
    pub state_hooks: bool,
    pub error_handling: bool,
}

impl MarkerSet {
    pub fn detect(code: &str) -> Self {
        Self {
            aria_attributes: code.contains("aria-"),
            aria_role: code.contains("role="),
            label_association: ["htmlFor", "<label", "aria-labelledby"]
                .iter()
                .any(|m| code.contains(m)),
            transition: ["transition", "animate"].iter().any(|m| code.contains(m)),
            responsive: ["sm:", "md:", "lg:", "xl:", "@media"]
                .iter()
                .any(|m| code.contains(m)),
            dark_mode: code.contains("dark:") || code.contains("prefers-color-scheme"),
            state_hooks: code.contains("useState") || code.contains("useEffect"),
            error_handling: code.to_lowercase().contains("error"),
        }
    }
}

/// Lowercased alphanumeric tokens of `text` longer than `min_len` characters.
pub fn significant_tokens(text: &str, min_len: usize) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() > min_len)
        .map(|t| t.to_lowercase())
        .collect()
}

/// True when strictly more than `ratio` of the requirement's significant
/// tokens appear in `code_lower`. Requirements without significant tokens
/// never match.
pub fn requirement_matched(requirement: &str, code_lower: &str, min_len: usize, ratio: f64) -> bool {
    let tokens = significant_tokens(requirement, min_len);
    if tokens.is_empty() {
        return false;
    }
    let present = tokens.iter().filter(|t| code_lower.contains(t.as_str())).count();
    present as f64 / tokens.len() as f64 > ratio
}
