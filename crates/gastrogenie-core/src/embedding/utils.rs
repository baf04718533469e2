use std::io;
use std::path::Path;

use tokenizers::{PaddingParams, Tokenizer, TruncationParams};

/// Loads `tokenizer.json` from a model directory.
pub fn load_tokenizer(model_dir: &Path) -> io::Result<Tokenizer> {
    let tokenizer_path = if model_dir.is_dir() {
        model_dir.join("tokenizer.json")
    } else {
        model_dir.to_path_buf()
    };

    Tokenizer::from_file(&tokenizer_path).map_err(io::Error::other)
}

/// Loads a tokenizer with truncation at `max_len` and batch-longest padding.
///
/// Truncation matters for fixed-context BERT checkpoints; padding is what
/// makes a batched cross-encoder forward pass possible over mixed-length
/// pairs.
pub fn load_tokenizer_for_pairs(model_dir: &Path, max_len: usize) -> io::Result<Tokenizer> {
    let mut tokenizer = load_tokenizer(model_dir)?;

    let truncation = TruncationParams {
        max_length: max_len,
        ..Default::default()
    };

    tokenizer
        .with_truncation(Some(truncation))
        .map_err(|e| io::Error::other(format!("Failed to configure truncation: {}", e)))?;

    tokenizer.with_padding(Some(PaddingParams::default()));

    Ok(tokenizer)
}
