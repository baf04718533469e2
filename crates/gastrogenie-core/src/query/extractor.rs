//! Generative query structuring: ask a model for a JSON token breakdown.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::generation::TextGenerator;
use crate::query::json_repair;
use crate::query::{StructuredOutcome, StructuredQuery};

/// Field shape the model is asked to emit. Everything defaults so a partial
/// object still parses.
#[derive(Debug, Default, Deserialize)]
struct ExtractedFields {
    #[serde(default)]
    ingredients: Vec<String>,
    #[serde(default)]
    cuisine: String,
    #[serde(default)]
    meal_type: String,
    #[serde(default)]
    time_constraint: String,
    #[serde(default)]
    occasion: String,
    #[serde(default)]
    cooking_method: String,
    #[serde(default)]
    dietary: Vec<String>,
}

fn build_prompt(raw_query: &str) -> String {
    format!(
        "You are a recipe search assistant. Extract structured search tokens \
         from the user's request.\n\
         Respond with ONLY a JSON object with exactly these keys:\n\
         - \"ingredients\": list of ingredient strings\n\
         - \"cuisine\": string\n\
         - \"meal_type\": string\n\
         - \"time_constraint\": string\n\
         - \"occasion\": string\n\
         - \"cooking_method\": string\n\
         - \"dietary\": list of dietary restriction strings\n\
         Use \"\" or [] for anything the request does not mention.\n\n\
         Request: {raw_query}\n\n\
         JSON:"
    )
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .filter_map(non_empty)
        .collect()
}

/// Structures a query with one generative-model call.
///
/// Never fails: a model error, a missing JSON object, or an unparseable one
/// all degrade to [`StructuredOutcome::Fallback`]. On success the original
/// query always overwrites whatever the model echoed.
pub async fn extract(
    generator: &dyn TextGenerator,
    max_tokens: u32,
    raw_query: &str,
) -> StructuredOutcome {
    let prompt = build_prompt(raw_query);

    let generated = match generator.generate(&prompt, max_tokens).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Token extraction call failed, using fallback structure");
            return StructuredOutcome::Fallback(StructuredQuery::fallback(raw_query));
        }
    };

    let Some(value) = json_repair::extract_object(&generated) else {
        debug!("No parseable JSON object in extractor output, using fallback structure");
        return StructuredOutcome::Fallback(StructuredQuery::fallback(raw_query));
    };

    let fields: ExtractedFields = match serde_json::from_value(value) {
        Ok(fields) => fields,
        Err(e) => {
            debug!(error = %e, "Extractor JSON had unusable field types, using fallback structure");
            return StructuredOutcome::Fallback(StructuredQuery::fallback(raw_query));
        }
    };

    StructuredOutcome::Extracted(StructuredQuery {
        ingredients: clean_list(fields.ingredients),
        cuisine: non_empty(fields.cuisine),
        meal_type: non_empty(fields.meal_type),
        time_constraint: non_empty(fields.time_constraint),
        occasion: non_empty(fields.occasion),
        cooking_method: non_empty(fields.cooking_method),
        dietary: clean_list(fields.dietary),
        original_query: raw_query.to_string(),
    })
}
