//! Query structuring: raw free text into a retrieval-friendly representation.
//!
//! Two strategies share one contract: they never fail. The deterministic path
//! runs a handful of regex extractions; the generative path asks a model for
//! a JSON token breakdown and repairs/falls back as needed.

pub mod deterministic;
pub mod extractor;
pub mod json_repair;

#[cfg(test)]
mod tests;

pub use deterministic::structure_query;
pub use extractor::extract;

/// Typed structured query derived from raw input.
///
/// `original_query` is always the verbatim user text, regardless of what a
/// model echoed back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredQuery {
    pub ingredients: Vec<String>,
    pub cuisine: Option<String>,
    pub meal_type: Option<String>,
    pub time_constraint: Option<String>,
    pub occasion: Option<String>,
    pub cooking_method: Option<String>,
    pub dietary: Vec<String>,
    pub original_query: String,
}

impl StructuredQuery {
    /// The explicit default: every field empty, original query preserved.
    pub fn fallback(original_query: &str) -> Self {
        Self {
            original_query: original_query.to_string(),
            ..Default::default()
        }
    }

    /// Builds the enhanced retrieval string: non-empty fields as labelled
    /// segments in fixed order, always ending with the original query.
    pub fn enhanced_text(&self) -> String {
        let mut parts = Vec::new();

        if !self.ingredients.is_empty() {
            parts.push(format!("Ingredients: {}", self.ingredients.join(", ")));
        }
        if let Some(ref cuisine) = self.cuisine {
            parts.push(format!("Cuisine: {}", cuisine));
        }
        if !self.dietary.is_empty() {
            parts.push(format!("Dietary: {}", self.dietary.join(", ")));
        }
        if let Some(ref meal_type) = self.meal_type {
            parts.push(format!("Meal type: {}", meal_type));
        }
        if let Some(ref time_constraint) = self.time_constraint {
            parts.push(format!("Time: {}", time_constraint));
        }
        if let Some(ref cooking_method) = self.cooking_method {
            parts.push(format!("Method: {}", cooking_method));
        }

        parts.push(format!("Query: {}", self.original_query));
        parts.join(" | ")
    }
}

/// How a structured query was obtained. Call sites see fallbacks explicitly
/// instead of a silently-defaulted value.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredOutcome {
    /// The generative extractor produced a usable structure.
    Extracted(StructuredQuery),
    /// Extraction failed somewhere; this is the default structure.
    Fallback(StructuredQuery),
}

impl StructuredOutcome {
    pub fn query(&self) -> &StructuredQuery {
        match self {
            Self::Extracted(q) | Self::Fallback(q) => q,
        }
    }

    pub fn into_query(self) -> StructuredQuery {
        match self {
            Self::Extracted(q) | Self::Fallback(q) => q,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}
