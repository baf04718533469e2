//! Lenient parsing of JSON-shaped model output.
//!
//! Small local models reliably emit *almost*-JSON: trailing commas, stray
//! unicode, prose around the object. This module finds the object and makes
//! the minimal repairs worth attempting before giving up.

use std::sync::LazyLock;

use regex::Regex;

static JSON_GREEDY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("greedy json regex is valid"));

static JSON_LAZY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*?\}").expect("lazy json regex is valid"));

static TRAILING_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("trailing comma regex is valid"));

/// Returns the first brace-delimited substring, tolerating surrounding prose.
/// Greedy matching wins (it spans nested objects); the lazy match is the
/// fallback candidate for callers that re-try.
pub fn json_candidates(text: &str) -> Vec<&str> {
    let mut candidates = Vec::new();
    if let Some(m) = JSON_GREEDY_RE.find(text) {
        candidates.push(m.as_str());
    }
    if let Some(m) = JSON_LAZY_RE.find(text)
        && !candidates.contains(&m.as_str())
    {
        candidates.push(m.as_str());
    }
    candidates
}

/// Strips trailing commas before closing braces/brackets and drops non-ASCII
/// characters.
pub fn repair(raw: &str) -> String {
    let without_commas = TRAILING_COMMA_RE.replace_all(raw, "$1");
    without_commas.chars().filter(char::is_ascii).collect()
}

/// Strict parse first, repaired parse second, `None` when both fail.
pub fn parse_lenient(raw: &str) -> Option<serde_json::Value> {
    if let Ok(value) = serde_json::from_str(raw) {
        return Some(value);
    }
    serde_json::from_str(&repair(raw)).ok()
}

/// Finds the JSON object inside free text and parses it leniently.
pub fn extract_object(text: &str) -> Option<serde_json::Value> {
    json_candidates(text)
        .into_iter()
        .find_map(parse_lenient)
        .filter(serde_json::Value::is_object)
}
