//! Local model wrappers: the sentence embedder and the cross-encoder.
//!
//! Both load candle BERT checkpoints (safetensors + tokenizer.json) and both
//! support a deterministic stub mode for tests and model-less deployments.

pub mod bert;
pub mod device;
pub mod error;
pub mod minilm;
pub mod reranker;
pub mod utils;

pub use error::EmbeddingError;
pub use minilm::{MINILM_EMBEDDING_DIM, MINILM_MAX_SEQ_LEN, MiniLmConfig, MiniLmEmbedder};
pub use reranker::{CrossEncoder, CrossEncoderConfig, RerankerError};
