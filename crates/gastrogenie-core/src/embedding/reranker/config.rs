use std::path::PathBuf;

pub const MAX_SEQ_LEN: usize = 512;

/// Cross-encoder configuration.
#[derive(Debug, Clone, Default)]
pub struct CrossEncoderConfig {
    /// Directory holding the BERT classifier checkpoint + tokenizer.
    /// `None` selects the deterministic stub scorer.
    pub model_dir: Option<PathBuf>,
}

impl CrossEncoderConfig {
    pub fn new<P: Into<PathBuf>>(model_dir: P) -> Self {
        Self {
            model_dir: Some(model_dir.into()),
        }
    }

    pub fn stub() -> Self {
        Self { model_dir: None }
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref path) = self.model_dir
            && path.as_os_str().is_empty()
        {
            return Err("model_dir cannot be empty when provided".to_string());
        }
        Ok(())
    }

    pub fn from_env() -> Self {
        let model_dir = std::env::var("GASTRO_RERANKER_PATH")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Self { model_dir }
    }
}
