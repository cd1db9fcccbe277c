//! Prompt corpus loading and requirement extraction.
//!
//! Prompt files follow the `<kind>-prompt.md` naming convention. Each matching,
//! non-empty file becomes an immutable [`PromptRecord`] whose requirements are
//! extracted once at load time and later drive fidelity scoring.

mod prompt;
mod requirements;

pub use prompt::{
    discover_prompt_files, filter_prompts, load, load_dir, parse_prompt_name, PromptRecord,
    RawPromptSource,
};
pub use requirements::extract_requirements;
