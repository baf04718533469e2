//! The recipe corpus: an immutable metadata table loaded once at startup.
//!
//! Records are keyed by their position in the file, which must match the ids
//! used by the ANN index built alongside it. The table is never mutated after
//! load and is safe to share across requests behind an `Arc`.

pub mod error;


pub use error::CorpusError;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

/// One recipe from the precomputed metadata table.
///
/// Only `title` and `description` are guaranteed; the numeric attributes and
/// the cuisine sub-region are best-effort fields from the source corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time_minutes: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein_g: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
}

impl Recipe {
    /// The text a cross-encoder compares against the query.
    pub fn pair_text(&self) -> String {
        format!("{} | {}", self.title, self.description)
    }
}

/// Positionally-indexed, read-only recipe table.
#[derive(Debug)]
pub struct RecipeTable {
    recipes: Vec<Recipe>,
}

impl RecipeTable {
    /// Loads a JSON Lines file, one recipe object per line. Blank lines are
    /// skipped so trailing newlines in generated files are harmless.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let mut recipes = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let recipe: Recipe =
                serde_json::from_str(line).map_err(|e| CorpusError::ParseFailed {
                    line: line_no + 1,
                    reason: e.to_string(),
                })?;
            recipes.push(recipe);
        }

        if recipes.is_empty() {
            return Err(CorpusError::Empty {
                path: path.to_path_buf(),
            });
        }

        info!(
            path = %path.display(),
            recipes = recipes.len(),
            "Recipe table loaded"
        );

        Ok(Self { recipes })
    }

    /// Builds a table from in-memory records.
    pub fn from_recipes(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    /// Positional lookup matching the ANN index's internal ids.
    pub fn get(&self, row: usize) -> Option<&Recipe> {
        self.recipes.get(row)
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}
