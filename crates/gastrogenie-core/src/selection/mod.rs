//! LLM recipe selection with a short natural-language explanation.

pub mod parser;


use tracing::{debug, warn};

use crate::constants::MAX_SELECTED;
use crate::corpus::Recipe;
use crate::generation::TextGenerator;

/// Generic explanation used when the model output has no explanation line.
pub const GENERIC_EXPLANATION: &str =
    "Here are some recipes that match what you are looking for.";

/// Outcome of the selection stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// 0-based indices into the ranked candidate slice, at most
    /// [`MAX_SELECTED`], in the model's stated order.
    pub indices: Vec<usize>,
    pub explanation: String,
    /// True when the model call failed and the canned stand-in was parsed
    /// instead.
    pub degraded: bool,
}

impl Selection {
    /// Selection used when no generative backend is reachable at all:
    /// the canned failure text run through the normal parser.
    pub fn degraded(query: &str, candidate_count: usize) -> Self {
        from_raw_output(&parser::canned_failure_text(query), candidate_count, true)
    }
}

fn candidate_line(index: usize, recipe: &Recipe) -> String {
    let mut line = format!("{}. {}", index + 1, recipe.title);
    if let Some(minutes) = recipe.prep_time_minutes {
        line.push_str(&format!(" ({} min)", minutes));
    }
    if let Some(ref sub_region) = recipe.sub_region {
        line.push_str(&format!(" ({})", sub_region));
    }
    line
}

fn build_prompt(query: &str, candidates: &[Recipe]) -> String {
    let listing: Vec<String> = candidates
        .iter()
        .enumerate()
        .map(|(i, recipe)| candidate_line(i, recipe))
        .collect();

    format!(
        "A user asked for recipes: \"{query}\"\n\n\
         Candidate recipes:\n{}\n\n\
         Pick up to {MAX_SELECTED} recipe numbers that best fit the request and \
         explain your picks in 2-3 sentences.\n\
         Answer in exactly this format:\n\
         SELECTED_RECIPES: comma-separated numbers\n\
         EXPLANATION: your explanation",
        listing.join("\n")
    )
}

fn from_raw_output(raw: &str, candidate_count: usize, degraded: bool) -> Selection {
    let mut indices = parser::parse_selection(raw, candidate_count);
    if indices.is_empty() {
        debug!("Selection line unusable, defaulting to rank order");
        indices = parser::fallback_selection(candidate_count);
    }

    let explanation = parser::parse_explanation(raw)
        .unwrap_or_else(|| GENERIC_EXPLANATION.to_string());

    Selection {
        indices,
        explanation,
        degraded,
    }
}

/// Asks the model to pick a final subset and narrate why.
///
/// Never fails: a model error is converted into a parseable canned response
/// upstream of parsing, so the same defaults apply on every path.
pub async fn select_and_explain(
    generator: &dyn TextGenerator,
    max_tokens: u32,
    query: &str,
    candidates: &[Recipe],
) -> Selection {
    let prompt = build_prompt(query, candidates);

    let (raw, degraded) = match generator.generate(&prompt, max_tokens).await {
        Ok(text) => (text, false),
        Err(e) => {
            warn!(error = %e, "Selection call failed, substituting canned response");
            (parser::canned_failure_text(query), true)
        }
    };

    from_raw_output(&raw, candidates.len(), degraded)
}
