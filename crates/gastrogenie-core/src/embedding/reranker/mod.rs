//! Cross-encoder relevance scoring for (query, recipe-text) pairs.

pub mod config;
pub mod error;


pub use config::{CrossEncoderConfig, MAX_SEQ_LEN};
pub use error::RerankerError;

use candle_core::Tensor;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::embedding::bert::PairClassifier;
use crate::embedding::device::select_device;
use crate::embedding::utils::load_tokenizer_for_pairs;

pub struct CrossEncoder {
    device: candle_core::Device,
    config: CrossEncoderConfig,
    model: Option<PairClassifier>,
    tokenizer: Option<Tokenizer>,
}

impl std::fmt::Debug for CrossEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossEncoder")
            .field("device", &format!("{:?}", self.device))
            .field("model_loaded", &self.model.is_some())
            .finish()
    }
}

impl CrossEncoder {
    pub fn load(config: CrossEncoderConfig) -> Result<Self, RerankerError> {
        if let Err(msg) = config.validate() {
            return Err(RerankerError::InvalidConfig { reason: msg });
        }

        let device = select_device().map_err(|e| RerankerError::ModelLoadFailed {
            reason: e.to_string(),
        })?;
        debug!(?device, "Selected compute device for cross-encoder");

        let Some(ref model_dir) = config.model_dir else {
            info!("No cross-encoder model configured, operating in stub mode");
            return Ok(Self {
                device,
                config,
                model: None,
                tokenizer: None,
            });
        };

        for required in ["config.json", "model.safetensors", "tokenizer.json"] {
            if !model_dir.join(required).is_file() {
                return Err(RerankerError::ModelLoadFailed {
                    reason: format!("Missing {} in {}", required, model_dir.display()),
                });
            }
        }

        info!(model_dir = %model_dir.display(), "Loading cross-encoder model");

        let model = PairClassifier::load(model_dir, &device).map_err(|e| {
            RerankerError::ModelLoadFailed {
                reason: format!("Failed to load BERT classifier: {}", e),
            }
        })?;

        let tokenizer = load_tokenizer_for_pairs(model_dir, MAX_SEQ_LEN).map_err(|e| {
            RerankerError::ModelLoadFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            }
        })?;

        info!("Cross-encoder model loaded");

        Ok(Self {
            device,
            config,
            model: Some(model),
            tokenizer: Some(tokenizer),
        })
    }

    pub fn stub() -> Result<Self, RerankerError> {
        Self::load(CrossEncoderConfig::stub())
    }

    /// Scores every candidate against the query in one padded batch.
    ///
    /// Scores come back in input order; callers own sorting and truncation.
    pub fn score_batch(
        &self,
        query: &str,
        candidates: &[String],
    ) -> Result<Vec<f32>, RerankerError> {
        if candidates.is_empty() {
            return Ok(vec![]);
        }

        debug!(
            query_len = query.len(),
            num_candidates = candidates.len(),
            model_loaded = self.model.is_some(),
            "Scoring query-candidate pairs"
        );

        if let (Some(model), Some(tokenizer)) = (&self.model, &self.tokenizer) {
            return self.score_batch_with_model(query, candidates, model, tokenizer);
        }

        Ok(candidates
            .iter()
            .map(|candidate| placeholder_score(query, candidate))
            .collect())
    }

    /// Scores a single pair. Equivalent to a one-element [`score_batch`](Self::score_batch).
    pub fn score(&self, query: &str, candidate: &str) -> Result<f32, RerankerError> {
        let scores = self.score_batch(query, std::slice::from_ref(&candidate.to_string()))?;
        Ok(scores[0])
    }

    fn score_batch_with_model(
        &self,
        query: &str,
        candidates: &[String],
        model: &PairClassifier,
        tokenizer: &Tokenizer,
    ) -> Result<Vec<f32>, RerankerError> {
        let pairs: Vec<(String, String)> = candidates
            .iter()
            .map(|candidate| (query.to_string(), candidate.clone()))
            .collect();

        let encodings =
            tokenizer
                .encode_batch(pairs, true)
                .map_err(|e| RerankerError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        let mut id_rows = Vec::with_capacity(encodings.len());
        let mut type_rows = Vec::with_capacity(encodings.len());
        let mut mask_rows = Vec::with_capacity(encodings.len());
        for encoding in &encodings {
            id_rows.push(Tensor::new(encoding.get_ids(), &self.device)?);
            type_rows.push(Tensor::new(encoding.get_type_ids(), &self.device)?);
            mask_rows.push(Tensor::new(encoding.get_attention_mask(), &self.device)?);
        }

        // Padding is configured on the tokenizer, so the rows stack into
        // rectangular [batch, seq_len] tensors.
        let input_ids = Tensor::stack(&id_rows, 0)?;
        let token_type_ids = Tensor::stack(&type_rows, 0)?;
        let attention_mask = Tensor::stack(&mask_rows, 0)?;

        let logits = model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))
            .map_err(|e| RerankerError::InferenceFailed {
                reason: e.to_string(),
            })?;

        let scores = logits.flatten_all()?.to_vec1::<f32>()?;

        debug!(
            top_score = scores.iter().cloned().fold(f32::NEG_INFINITY, f32::max),
            "Cross-encoder batch scored"
        );

        Ok(scores)
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn config(&self) -> &CrossEncoderConfig {
        &self.config
    }
}

/// Deterministic lexical-overlap score used in stub mode. Shares the real
/// model's rough shape (higher = more relevant, roughly 0..1) so ordering
/// behavior stays testable without weights.
fn placeholder_score(query: &str, candidate: &str) -> f32 {
    use std::collections::HashSet;

    let query_lower = query.to_lowercase();
    let query_words: HashSet<&str> = query_lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 2)
        .collect();

    let candidate_lower = candidate.to_lowercase();
    let candidate_words: HashSet<&str> = candidate_lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 2)
        .collect();

    if query_words.is_empty() || candidate_words.is_empty() {
        return 0.0;
    }

    let matches = query_words.intersection(&candidate_words).count() as f32;
    let recall = matches / query_words.len() as f32;
    let jaccard = matches / query_words.union(&candidate_words).count() as f32;

    let base = 0.6 * recall + 0.4 * jaccard;
    (1.0 / (1.0 + (-8.0 * (base - 0.5)).exp())).clamp(0.0, 1.0)
}
