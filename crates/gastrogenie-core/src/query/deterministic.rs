//! Regex-based query structuring (no generative model involved).

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

static PROTEIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:g|grams?)\s+protein").expect("protein regex is valid")
});

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)within (\d+) minutes").expect("time regex is valid"));

static REGION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)in (\w+) region").expect("region regex is valid"));

/// Builds the structured retrieval string from explicit patterns in the raw
/// query. Extraction is best-effort: an absent pattern simply omits its
/// segment, and the raw query is always carried through as the final segment.
pub fn structure_query(raw_query: &str) -> String {
    let mut parts = vec!["Recipe search:".to_string()];

    if let Some(caps) = PROTEIN_RE.captures(raw_query) {
        parts.push(format!("{}g protein", &caps[1]));
    }
    if let Some(caps) = TIME_RE.captures(raw_query) {
        parts.push(format!("{} minutes", &caps[1]));
    }
    if let Some(caps) = REGION_RE.captures(raw_query) {
        parts.push(format!("{} cuisine", &caps[1]));
    }

    parts.push(format!("Original query: {}", raw_query));

    let structured = parts.join(" | ");
    debug!(segments = parts.len(), "Structured query (deterministic)");
    structured
}
