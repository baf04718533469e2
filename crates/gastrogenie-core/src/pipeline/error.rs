use thiserror::Error;

use crate::embedding::{EmbeddingError, RerankerError};
use crate::index::IndexError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("reranking failed: {0}")]
    Reranking(#[from] RerankerError),

    #[error("index search failed: {0}")]
    Index(#[from] IndexError),

    #[error("recipe table holds {recipes} records but the index holds {vectors} vectors")]
    CorpusIndexMismatch { recipes: usize, vectors: usize },

    #[error("index returned row {row} outside the recipe table of {table_rows} rows")]
    IndexMisaligned { row: usize, table_rows: usize },
}
