//! Parsing of the selector's free-text output.
//!
//! The model is asked for a rigid two-line format but small models drift:
//! brackets around the list, reordered lines, prose, missing lines. The
//! parser stays narrow and forgiving, and every malformed shape has a
//! documented default.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::MAX_SELECTED;

static SELECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)SELECTED_RECIPES:[ \t]*\[?[ \t]*([^\n]+)").expect("selection regex is valid")
});

static EXPLANATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)EXPLANATION:\s*(.+)").expect("explanation regex is valid")
});

/// Extracts 0-based candidate indices from the selection line.
///
/// Tokens are split on commas; non-numeric and out-of-range entries are
/// dropped; at most [`MAX_SELECTED`] survive. An unmatched line or a line
/// with no usable token yields an empty vec (the caller applies the rank
/// default).
pub fn parse_selection(text: &str, candidate_count: usize) -> Vec<usize> {
    let Some(caps) = SELECTION_RE.captures(text) else {
        return Vec::new();
    };

    caps[1]
        .split(',')
        .filter_map(|token| {
            token
                .trim()
                .trim_matches(|c| c == '[' || c == ']')
                .parse::<usize>()
                .ok()
        })
        .filter(|&number| number >= 1 && number <= candidate_count)
        .map(|number| number - 1)
        .take(MAX_SELECTED)
        .collect()
}

/// Extracts the explanation text, `None` when the line is missing.
pub fn parse_explanation(text: &str) -> Option<String> {
    EXPLANATION_RE
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|explanation| !explanation.is_empty())
}

/// First `min(MAX_SELECTED, candidate_count)` ranks, the default when the
/// selection line is unusable.
pub fn fallback_selection(candidate_count: usize) -> Vec<usize> {
    (0..candidate_count.min(MAX_SELECTED)).collect()
}

/// Stand-in output used when the model call itself fails. Deliberately
/// well-formed so the normal parsing path handles the failure case too.
pub fn canned_failure_text(query: &str) -> String {
    format!(
        "SELECTED_RECIPES: 1,2,3,4,5\n\
         EXPLANATION: No detailed explanation is available for \"{}\" right now, \
         but these are the closest matches found.",
        query
    )
}
