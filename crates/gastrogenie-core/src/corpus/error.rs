use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read recipe table: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid recipe record on line {line}: {reason}")]
    ParseFailed { line: usize, reason: String },

    #[error("recipe table is empty: {path}")]
    Empty { path: PathBuf },
}
