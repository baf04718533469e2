//! GastroGenie library crate (used by the server and integration tests).
//!
//! Recipe retrieval-and-ranking pipeline: a free-text query is structured
//! (regex extraction or an LLM token extractor), embedded and matched against
//! an ANN index over the recipe corpus, reranked with a cross-encoder, and
//! optionally narrowed down and explained by a generative model.
//!
//! # Public API Surface
//!
//! ## Core Types (Stable)
//! - [`Config`], [`ConfigError`] - Server configuration
//! - [`Recipe`], [`RecipeTable`] - The recipe corpus
//! - [`AnnIndex`], [`EmbeddingMatrix`] - Vector search over the corpus
//! - [`RecipePipeline`], [`Candidate`], [`AugmentedResult`] - Orchestration
//!
//! ## Embedding & Scoring
//! - [`MiniLmEmbedder`], [`MiniLmConfig`] - Sentence embedding generation
//! - [`CrossEncoder`], [`CrossEncoderConfig`] - Pairwise relevance reranking
//!
//! ## Query Understanding & Generation
//! - [`StructuredQuery`], [`StructuredOutcome`] - Typed query structuring
//! - [`TextGenerator`], [`ModelRegistry`], [`ModelSpec`] - Generative backends
//! - [`Selection`] - LLM recipe selection with explanation
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod corpus;
pub mod embedding;
pub mod generation;
pub mod index;
pub mod pipeline;
pub mod query;
pub mod selection;

pub use config::{Config, ConfigError};
pub use constants::{
    AUGMENTED_RERANK_COUNT, DEFAULT_EMBEDDING_DIM, DEFAULT_MODEL_KEY, MAX_SELECTED,
    PLAIN_RESULT_COUNT, RETRIEVE_TOP_N,
};
pub use corpus::{CorpusError, Recipe, RecipeTable};
pub use embedding::{
    CrossEncoder, CrossEncoderConfig, EmbeddingError, MiniLmConfig, MiniLmEmbedder, RerankerError,
};
pub use generation::{
    GenAiGenerator, GenerationError, MODEL_SPECS, ModelRegistry, ModelSpec, TextGenerator,
    resolve_key, spec_for,
};
#[cfg(any(test, feature = "mock"))]
pub use generation::MockTextGenerator;
pub use index::{AnnIndex, EmbeddingMatrix, IndexError};
pub use pipeline::{
    AugmentedResult, Candidate, PipelineError, RecipePipeline, similarity_from_distance,
};
pub use query::{StructuredOutcome, StructuredQuery};
pub use selection::Selection;
