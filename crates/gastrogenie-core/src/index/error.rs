use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to read embedding matrix: {0}")]
    Io(#[from] std::io::Error),

    #[error("embedding matrix has an invalid header (bad magic)")]
    BadMagic,

    #[error("embedding matrix declares a zero dimension")]
    ZeroDimension,

    #[error("embedding matrix contains no vectors")]
    Empty,

    #[error("query dimension {got} does not match index dimension {expected}")]
    DimensionMismatch { expected: usize, got: usize },
}
