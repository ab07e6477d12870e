//! JSON recovery from model output
//!
//! Models wrap JSON in prose or markdown fences despite being told not to.
//! [`extract_json`] tries progressively looser readings and never fails:
//! anything unreadable becomes an empty object, which normalizes to nothing.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)```(?:json)?\s*(.*?)```").expect("valid regex"))
}

fn array_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\[.*\]").expect("valid regex"))
}

fn object_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"))
}

/// Best-effort JSON extraction from model output.
///
/// 1. Parse the whole text.
/// 2. Otherwise narrow to the first fenced block, if any.
/// 3. Take the greedy `[...]` span, else the greedy `{...}` span, else the
///    fence body, and parse that.
///
/// The greedy spans run from the first opening bracket to the last closing
/// one, so two separate JSON values in one reply will not parse.
pub fn extract_json(text: &str) -> Value {
    let text = text.trim();
    if text.is_empty() {
        return empty();
    }
    if let Ok(value) = serde_json::from_str(text) {
        return value;
    }

    let fenced = fence_re()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str());
    let haystack = fenced.unwrap_or(text);

    let candidate = array_re()
        .find(haystack)
        .or_else(|| object_re().find(haystack))
        .map(|m| m.as_str())
        .or(fenced);

    candidate
        .and_then(|c| serde_json::from_str(c).ok())
        .unwrap_or_else(empty)
}

fn empty() -> Value {
    Value::Object(Default::default())
}
