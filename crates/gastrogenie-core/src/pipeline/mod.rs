//! The retrieval-and-rerank pipeline, composed per request.
//!
//! Plain mode: deterministic structuring, retrieve, rerank, done.
//! Augmented mode: generative structuring, retrieve, rerank wider, then an
//! LLM picks the final subset and explains it. Every generative stage
//! degrades instead of failing; only index/table inconsistency aborts a
//! request.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::PipelineError;

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::constants::{AUGMENTED_RERANK_COUNT, PLAIN_RESULT_COUNT, RETRIEVE_TOP_N};
use crate::corpus::{Recipe, RecipeTable};
use crate::embedding::{CrossEncoder, MiniLmEmbedder};
use crate::generation::{ModelRegistry, resolve_key, spec_for};
use crate::index::AnnIndex;
use crate::query::{self, StructuredOutcome, StructuredQuery};
use crate::selection::{self, Selection};

/// Maps an ANN distance to a bounded similarity score.
///
/// Strictly decreasing in distance; `(0, 1]` for the non-negative distances
/// the index produces, with `distance = 0` mapping to `1`.
pub fn similarity_from_distance(distance: f32) -> f32 {
    1.0 / (1.0 + distance)
}

/// One scored recipe flowing through the pipeline. Retrieval fills `score`
/// with the similarity mapping; reranking replaces it outright.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub score: f32,
    pub recipe: Recipe,
}

/// Result of the augmented (generative) mode.
#[derive(Debug, Clone)]
pub struct AugmentedResult {
    pub explanation: String,
    pub selected: Vec<Candidate>,
}

/// Per-request orchestrator over the shared, read-only resources.
pub struct RecipePipeline {
    table: Arc<RecipeTable>,
    index: AnnIndex,
    embedder: MiniLmEmbedder,
    reranker: CrossEncoder,
    registry: ModelRegistry,
}

impl std::fmt::Debug for RecipePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipePipeline")
            .field("recipes", &self.table.len())
            .field("index_len", &self.index.len())
            .field("embedder", &self.embedder)
            .field("reranker", &self.reranker)
            .finish()
    }
}

impl RecipePipeline {
    /// Assembles the pipeline, enforcing the positional-alignment invariant:
    /// the table and the index must have been built together, so their row
    /// counts must match.
    pub fn new(
        table: Arc<RecipeTable>,
        index: AnnIndex,
        embedder: MiniLmEmbedder,
        reranker: CrossEncoder,
        registry: ModelRegistry,
    ) -> Result<Self, PipelineError> {
        if table.len() != index.len() {
            return Err(PipelineError::CorpusIndexMismatch {
                recipes: table.len(),
                vectors: index.len(),
            });
        }

        info!(
            recipes = table.len(),
            embedder_stub = embedder.is_stub(),
            reranker_loaded = reranker.is_model_loaded(),
            "Recipe pipeline assembled"
        );

        Ok(Self {
            table,
            index,
            embedder,
            reranker,
            registry,
        })
    }

    /// Plain mode: deterministic structuring, retrieval, rerank to the final
    /// three results.
    #[instrument(skip(self))]
    pub fn search(&self, raw_query: &str) -> Result<Vec<Candidate>, PipelineError> {
        let structured = query::structure_query(raw_query);
        let candidates = self.retrieve(&structured, RETRIEVE_TOP_N)?;
        self.rerank(raw_query, candidates, PLAIN_RESULT_COUNT)
    }

    /// Augmented mode: generative structuring, retrieval, wider rerank, then
    /// LLM selection and explanation.
    #[instrument(skip(self))]
    pub async fn search_augmented(
        &self,
        raw_query: &str,
        model_key: &str,
    ) -> Result<AugmentedResult, PipelineError> {
        let key = resolve_key(model_key);
        // resolve_key only returns catalog keys
        let max_tokens = spec_for(key).map(|spec| spec.max_tokens).unwrap_or(256);

        let generator = match self.registry.get(key) {
            Ok(generator) => Some(generator),
            Err(e) => {
                warn!(key, error = %e, "Generative backend unavailable, degrading");
                None
            }
        };

        let outcome = match &generator {
            Some(generator) => query::extract(generator.as_ref(), max_tokens, raw_query).await,
            None => StructuredOutcome::Fallback(StructuredQuery::fallback(raw_query)),
        };
        if outcome.is_fallback() {
            debug!("Query structuring fell back to the default structure");
        }

        let structured = outcome.query().enhanced_text();
        let candidates = self.retrieve(&structured, RETRIEVE_TOP_N)?;
        let ranked = self.rerank(raw_query, candidates, AUGMENTED_RERANK_COUNT)?;

        let recipes: Vec<Recipe> = ranked.iter().map(|c| c.recipe.clone()).collect();
        let selection = match &generator {
            Some(generator) => {
                selection::select_and_explain(generator.as_ref(), max_tokens, raw_query, &recipes)
                    .await
            }
            None => Selection::degraded(raw_query, recipes.len()),
        };

        let selected = selection
            .indices
            .iter()
            .filter_map(|&i| ranked.get(i).cloned())
            .collect();

        Ok(AugmentedResult {
            explanation: selection.explanation,
            selected,
        })
    }

    /// Embeds the structured query and resolves the nearest rows to scored
    /// candidates, ordered as the index returned them.
    fn retrieve(
        &self,
        structured_query: &str,
        top_n: usize,
    ) -> Result<Vec<Candidate>, PipelineError> {
        let embedding = self.embedder.embed(structured_query)?;
        let neighbours = self.index.search(&embedding, top_n)?;

        debug!(
            requested = top_n,
            returned = neighbours.len(),
            "ANN retrieval complete"
        );

        let mut candidates = Vec::with_capacity(neighbours.len());
        for (row, distance) in neighbours {
            let Some(recipe) = self.table.get(row) else {
                // Startup validates row counts, so this means corrupt artifacts.
                error!(
                    row,
                    table_rows = self.table.len(),
                    "ANN index returned an out-of-range row"
                );
                return Err(PipelineError::IndexMisaligned {
                    row,
                    table_rows: self.table.len(),
                });
            };
            candidates.push(Candidate {
                score: similarity_from_distance(distance),
                recipe: recipe.clone(),
            });
        }

        Ok(candidates)
    }

    /// Replaces retrieval scores with cross-encoder scores (one batched
    /// call), sorts descending keeping retrieval order on ties, truncates.
    fn rerank(
        &self,
        raw_query: &str,
        mut candidates: Vec<Candidate>,
        keep: usize,
    ) -> Result<Vec<Candidate>, PipelineError> {
        if candidates.is_empty() {
            return Ok(candidates);
        }

        let pair_texts: Vec<String> = candidates
            .iter()
            .map(|candidate| candidate.recipe.pair_text())
            .collect();
        let scores = self.reranker.score_batch(raw_query, &pair_texts)?;

        for (candidate, score) in candidates.iter_mut().zip(scores) {
            candidate.score = score;
        }

        // sort_by is stable: equal scores keep retrieval order
        candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        candidates.truncate(keep);

        Ok(candidates)
    }

    pub fn table(&self) -> &RecipeTable {
        &self.table
    }

    pub fn index_len(&self) -> usize {
        self.index.len()
    }

    pub fn embedder(&self) -> &MiniLmEmbedder {
        &self.embedder
    }

    pub fn reranker(&self) -> &CrossEncoder {
        &self.reranker
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }
}
