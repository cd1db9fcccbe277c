//! Requirement extraction from raw prompt text.

use std::sync::LazyLock;

use regex::Regex;

static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*[-*•][ \t]+(.+)$").expect("valid bullet regex"));

static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\d+[.)][ \t]+(.+)$").expect("valid numbered regex"));

static MUST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bmust[ \t]+(?:have|include)[ \t]+([^.\n]+)").expect("valid must regex")
});

static SHOULD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bshould[ \t]+(?:have|include)[ \t]+([^.\n]+)").expect("valid should regex")
});

/// Extracts requirement clauses from prompt text.
///
/// Four rules run in order (bulleted lines, numbered lines, "must have/include"
/// clauses, "should have/include" clauses) and their matches are concatenated.
/// No deduplication is done: a bullet that also contains a "must include"
/// clause is reported twice, so callers should treat the result as a bag.
pub fn extract_requirements(text: &str) -> Vec<String> {
    let mut requirements = Vec::new();

    for re in [&*BULLET_RE, &*NUMBERED_RE, &*MUST_RE, &*SHOULD_RE] {
        for caps in re.captures_iter(text) {
            let clause = caps[1].trim();
            if !clause.is_empty() {
                requirements.push(clause.to_string());
            }
        }
    }

    requirements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_bullets_in_order() {
        let text = "Build a card.\n- rounded corners\n* drop shadow\n• hover state\n";
        assert_eq!(
            extract_requirements(text),
            vec!["rounded corners", "drop shadow", "hover state"]
        );
    }

    #[test]
    fn test_extracts_numbered_items() {
        let text = "Steps:\n1. sortable columns\n2) pagination controls\n";
        assert_eq!(
            extract_requirements(text),
            vec!["sortable columns", "pagination controls"]
        );
    }

    #[test]
    fn test_rule_order_is_bullets_numbered_must_should() {
        let text = "It should include a search box. It must have a header.\n1. footer links\n- logo\n";
        assert_eq!(
            extract_requirements(text),
            vec!["logo", "footer links", "a header", "a search box"]
        );
    }

    #[test]
    fn test_duplicates_are_kept() {
        let text = "- must include keyboard navigation\n";
        let reqs = extract_requirements(text);
        assert_eq!(
            reqs,
            vec!["must include keyboard navigation", "keyboard navigation"]
        );
    }

    #[test]
    fn test_case_insensitive_clauses() {
        let text = "The modal MUST HAVE a close button. It Should Include focus trapping.";
        assert_eq!(
            extract_requirements(text),
            vec!["a close button", "focus trapping"]
        );
    }

    #[test]
    fn test_no_requirements() {
        assert!(extract_requirements("A plain sentence with nothing to extract.").is_empty());
        assert!(extract_requirements("").is_empty());
    }

    #[test]
    fn test_negative_numbers_and_dashes_inside_lines_ignored() {
        let text = "Use a gap of 8px - not more.\nTemperature 3.5 degrees";
        assert!(extract_requirements(text).is_empty());
    }
}
