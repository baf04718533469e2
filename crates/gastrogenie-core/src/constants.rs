//! Cross-cutting, shared constants.
//!
//! The stage sizes are the pipeline's contract: retrieval always over-fetches,
//! reranking narrows, and the selector picks the final handful.

/// Embedding dimension of the MiniLM-class sentence encoder.
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Candidates fetched from the ANN index before reranking.
pub const RETRIEVE_TOP_N: usize = 50;

/// Results returned in plain (non-generative) mode.
pub const PLAIN_RESULT_COUNT: usize = 3;

/// Candidates kept after reranking when the selector runs next.
pub const AUGMENTED_RERANK_COUNT: usize = 10;

/// Upper bound on recipes the selector may pick.
pub const MAX_SELECTED: usize = 5;

/// Model key used when a request names no model or an unknown one.
pub const DEFAULT_MODEL_KEY: &str = "tiny_llama";

/// Default bound on a single generative-model call.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;
