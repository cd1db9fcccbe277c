//! Deterministic template-based provider.
//!
//! Renders a React function component from the prompt with Tera for the
//! baseline pass, and applies a fixed set of accessibility, theming and
//! robustness transformations to the baseline for the enhanced pass. No model
//! is invoked; this is the provider the CLI uses out of the box.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tera::{Context, Tera};
use tracing::debug;

use crate::corpus::PromptRecord;
use crate::error::GenerationError;

use super::{GenerationMode, GenerationProvider};

const BASELINE_TEMPLATE: &str = r#"import React, { useState } from 'react';

/**
 * {{ name }} component.
 */
export default function {{ name }}({ title = '{{ title }}' }) {
  const [open, setOpen] = useState(false);

  return (
    <section className="{{ kind }} rounded-lg p-4 shadow">
      <h2 className="text-lg font-semibold">{title}</h2>
      <button type="button" className="px-3 py-2 rounded" onClick={() => setOpen(!open)}>
        {open ? 'Hide details' : 'Show details'}
      </button>
      {open && (
        <ul id="{{ kind }}-details" className="mt-2 space-y-1">
{% for item in requirements %}          <li>{{ item }}</li>
{% endfor %}        </ul>
      )}
    </section>
  );
}
"#;

static REACT_NAMED_IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"import\s+React\s*,\s*\{([^}]*)\}\s*from\s*['"]react['"];?"#)
        .expect("valid import regex")
});

static ROOT_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"return\s*\(\s*<([A-Za-z][\w.]*)((?:\s+[^\s>]+="[^"]*")*)\s*>"#)
        .expect("valid root tag regex")
});

static CLASS_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"className="([^"]*)""#).expect("valid class regex"));

/// Heuristic provider that needs no network access.
#[derive(Debug, Clone, Default)]
pub struct TemplateProvider {
    latency: Duration,
}

impl TemplateProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeps for `latency` before returning each artifact, to model the
    /// long-pole generation call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Renders the baseline component for a prompt.
    pub fn render_baseline(&self, prompt: &PromptRecord) -> Result<String, GenerationError> {
        let name = prompt.component_name();
        let items: Vec<String> = prompt
            .requirements
            .iter()
            .map(|r| sanitize_markup_text(r))
            .collect();

        let mut context = Context::new();
        context.insert("name", &name);
        context.insert("title", &name);
        context.insert("kind", &prompt.component_kind);
        context.insert("requirements", &items);

        Tera::one_off(BASELINE_TEMPLATE, &context, false)
            .map_err(|e| GenerationError::Provider(format!("template rendering failed: {}", e)))
    }

    /// Applies the enhancement transformations to a baseline artifact.
    pub fn enhance(&self, prompt: &PromptRecord, seed: &str) -> String {
        let name = prompt.component_name();
        let mut code = ensure_hook_imports(seed);
        code = inject_error_state(&code, &name);
        code = decorate_root(&code, &name, &prompt.component_kind);
        if !code.contains("<button aria-") {
            code = code.replacen(
                "<button ",
                &format!("<button aria-label=\"{} details toggle\" ", name),
                1,
            );
        }
        code
    }
}

#[async_trait]
impl GenerationProvider for TemplateProvider {
    async fn generate(
        &self,
        prompt: &PromptRecord,
        mode: GenerationMode,
        seed_code: Option<&str>,
    ) -> Result<String, GenerationError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        debug!(prompt_id = %prompt.id, mode = %mode, "Template provider generating");
        match mode {
            GenerationMode::Baseline => self.render_baseline(prompt),
            GenerationMode::Enhanced => {
                let seed = seed_code.ok_or(GenerationError::MissingSeed)?;
                Ok(self.enhance(prompt, seed))
            }
        }
    }

    fn name(&self) -> &str {
        "template"
    }
}

/// Keeps requirement text from being read as markup or JSX expressions.
fn sanitize_markup_text(text: &str) -> String {
    text.replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('{', "(")
        .replace('}', ")")
}

fn ensure_hook_imports(code: &str) -> String {
    if code.contains("useEffect") {
        return code.to_string();
    }

    if let Some(caps) = REACT_NAMED_IMPORT_RE.captures(code) {
        let mut names: Vec<String> = caps[1]
            .split(',')
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        for hook in ["useState", "useEffect"] {
            if !names.iter().any(|n| n == hook) {
                names.push(hook.to_string());
            }
        }
        let replacement = format!("import React, {{ {} }} from 'react';", names.join(", "));
        return REACT_NAMED_IMPORT_RE
            .replace(code, replacement.as_str())
            .into_owned();
    }

    format!("import {{ useEffect, useState }} from 'react';\n{}", code)
}

fn inject_error_state(code: &str, name: &str) -> String {
    if code.contains("setError") {
        return code.to_string();
    }

    let pattern = format!(r"function\s+{}\s*\([^)]*\)\s*\{{", regex::escape(name));
    let Ok(decl_re) = Regex::new(&pattern) else {
        return code.to_string();
    };
    let Some(m) = decl_re.find(code) else {
        return code.to_string();
    };

    let hooks = "\n  const [error, setError] = useState(null);\n\n  useEffect(() => {\n    if (typeof window === 'undefined') {\n      setError('Interactive features require a browser');\n    }\n  }, []);\n";
    let mut out = String::with_capacity(code.len() + hooks.len());
    out.push_str(&code[..m.end()]);
    out.push_str(hooks);
    out.push_str(&code[m.end()..]);
    out
}

fn decorate_root(code: &str, name: &str, kind: &str) -> String {
    let Some(caps) = ROOT_TAG_RE.captures(code) else {
        return code.to_string();
    };
    let (Some(whole), Some(tag)) = (caps.get(0), caps.get(1)) else {
        return code.to_string();
    };
    let attrs = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

    let theming = "transition-colors duration-200 md:p-6 dark:bg-gray-900 dark:text-gray-100";
    let attrs = if CLASS_ATTR_RE.is_match(attrs) {
        CLASS_ATTR_RE
            .replace(attrs, |c: &regex::Captures<'_>| {
                format!("className=\"{} {}\"", &c[1], theming)
            })
            .into_owned()
    } else {
        format!("{} className=\"{}\"", attrs, theming)
    };

    let role = if attrs.contains("role=") {
        String::new()
    } else {
        format!(" role=\"region\" aria-label=\"{}\"", name)
    };

    let opening = format!(
        "return (\n    <{tag}{attrs}{role}>\n      {{error && (\n        <p role=\"alert\" className=\"text-red-600 dark:text-red-400\">{{error}}</p>\n      )}}\n      <label htmlFor=\"{kind}-details\" className=\"sr-only\">{name} details</label>",
        tag = tag.as_str(),
        attrs = attrs,
        role = role,
        kind = kind,
        name = name,
    );

    let mut out = String::with_capacity(code.len() + opening.len());
    out.push_str(&code[..whole.start()]);
    out.push_str(&opening);
    out.push_str(&code[whole.end()..]);
    out
}
