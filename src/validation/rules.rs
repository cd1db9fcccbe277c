//! Individual validation rules.

use std::sync::LazyLock;

use regex::Regex;

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)^\s*import\s+(?:[^;'"]*?\s*from\s*)?['"](?:react|react-dom|preact|vue|svelte|solid-js|@angular/core|lit)(?:/[^'"]*)?['"]|\brequire\(\s*['"](?:react|preact|vue)['"]\s*\)"#,
    )
    .expect("valid import regex")
});

static RENDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\breturn\s*\(|\breturn\s*<|\brender\s*\(|=>\s*\(\s*<").expect("valid render regex")
});

static EXPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*export\s+|\bmodule\.exports\b|\bexports\.\w+\s*=").expect("valid export regex")
});

/// One markup tag: optional `/`, name, attributes (quoted strings or brace
/// expressions one level deep), optional self-closing `/`.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<(/)?([A-Za-z][\w.:-]*)((?:\s+(?:\{[^{}]*(?:\{[^{}]*\}[^{}]*)*\}|[^\s>/={}"']+(?:\s*=\s*(?:"[^"]*"|'[^']*'|\{[^{}]*(?:\{[^{}]*\}[^{}]*)*\}))?))*)\s*(/)?>"#,
    )
    .expect("valid tag regex")
});

pub(super) fn has_framework_import(code: &str) -> bool {
    IMPORT_RE.is_match(code)
}

pub(super) fn has_declaration(code: &str, name: &str) -> bool {
    if name.trim().is_empty() {
        return false;
    }
    let pattern = format!(
        r"\b(?:function|const|let|var|class)\s+{}\b",
        regex::escape(name.trim())
    );
    Regex::new(&pattern)
        .map(|re| re.is_match(code))
        .unwrap_or(false)
}

pub(super) fn has_render_expression(code: &str) -> bool {
    RENDER_RE.is_match(code)
}

pub(super) fn has_export(code: &str) -> bool {
    EXPORT_RE.is_match(code)
}

/// Tag counts for the balance check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkupCounts {
    /// Every opening tag, self-closing ones included.
    pub opening: usize,
    pub self_closing: usize,
    pub closing: usize,
}

impl MarkupCounts {
    /// `opening - self_closing == closing`.
    pub fn is_balanced(&self) -> bool {
        self.opening - self.self_closing == self.closing
    }
}

/// Counts markup tags in `code`.
///
/// An opening tag directly preceded by an identifier character and followed
/// by code punctuation is a generic type argument (`useState<string>(`,
/// `FC<Props> =`) and is not counted.
pub fn count_markup_tags(code: &str) -> MarkupCounts {
    let mut counts = MarkupCounts::default();

    for caps in TAG_RE.captures_iter(code) {
        let Some(whole) = caps.get(0) else { continue };

        if caps.get(1).is_some() {
            counts.closing += 1;
            continue;
        }

        if is_type_argument(code, whole.start(), whole.end()) {
            continue;
        }

        counts.opening += 1;
        if caps.get(4).is_some() {
            counts.self_closing += 1;
        }
    }

    counts
}

fn is_type_argument(code: &str, start: usize, end: usize) -> bool {
    let preceded_by_ident = code[..start]
        .chars()
        .next_back()
        .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$');
    if !preceded_by_ident {
        return false;
    }

    match code[end..].trim_start().chars().next() {
        None => true,
        Some(c) => "()[],;=|&>".contains(c),
    }
}
