//! Heuristic detection of code that blocks on standard input.
//!
//! This is a shallow pattern match, not a parser. It decides whether a
//! snippet calls the language's input function and, when the first such
//! call has a literal argument, extracts it as the prompt to show.
//!
//! Known blind spots are kept on purpose: the call token is matched as a
//! plain substring (so `raw_input(` counts), indirect calls are missed,
//! and prompts containing escaped quotes are extracted verbatim up to the
//! first closing quote followed by `)`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::language::Language;

/// Literal argument of a Python `input(...)` call at the start of the haystack.
static PYTHON_PROMPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^input\(["'](.+?)["']\)"#).expect("valid prompt pattern"));

/// Literal argument of a JavaScript `prompt(...)` call at the start of the haystack.
static JAVASCRIPT_PROMPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^prompt\(["'](.+?)["']\)"#).expect("valid prompt pattern"));

/// Whether a snippet needs input before it can run, and what to ask.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRequirement {
    /// The source contains a blocking-input call.
    pub needs_input: bool,
    /// Literal prompt of the first input call, or empty.
    pub prompt_text: String,
}

impl InputRequirement {
    /// Requirement for code that reads no input.
    pub fn none() -> Self {
        Self::default()
    }
}

/// Token that marks an input call in the given language.
fn input_token(language: Language) -> &'static str {
    match language {
        Language::Python => "input(",
        Language::JavaScript => "prompt(",
    }
}

fn prompt_pattern(language: Language) -> &'static Regex {
    match language {
        Language::Python => &PYTHON_PROMPT,
        Language::JavaScript => &JAVASCRIPT_PROMPT,
    }
}

/// Detect whether `code` needs interactive input.
pub fn detect(code: &str, language: Language) -> InputRequirement {
    let Some(start) = code.find(input_token(language)) else {
        return InputRequirement::none();
    };

    let prompt_text = prompt_pattern(language)
        .captures(&code[start..])
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    InputRequirement {
        needs_input: true,
        prompt_text,
    }
}

/// Detect using a raw language identifier.
///
/// Unrecognized identifiers never need input.
pub fn detect_by_id(code: &str, language_id: &str) -> InputRequirement {
    match language_id.parse::<Language>() {
        Ok(language) => detect(code, language),
        Err(_) => InputRequirement::none(),
    }
}

/// Whether JavaScript code calls the browser-only `prompt()`.
///
/// The execution runtime has no interactive prompt, so such code is
/// rejected before it is sent.
pub fn uses_browser_prompt(code: &str, language: Language) -> bool {
    language == Language::JavaScript && code.contains(input_token(language))
}
