use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("model call failed: {reason}")]
    CallFailed { reason: String },

    #[error("model call timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("failed to load model backend '{key}': {reason}")]
    LoadFailed { key: String, reason: String },
}
