//! Candle BERT backbones shared by the embedder and the cross-encoder.

use std::path::Path;
use std::sync::Arc;

use candle_core::{DType, Device, IndexOp, Result, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config};

fn read_bert_config(model_dir: &Path) -> Result<Config> {
    let config_content = std::fs::read_to_string(model_dir.join("config.json"))?;
    serde_json::from_str(&config_content)
        .map_err(|e| candle_core::Error::Msg(format!("Failed to parse config: {}", e)))
}

fn load_backbone(vb: &VarBuilder, config: &Config) -> Result<BertModel> {
    // Checkpoints differ in whether the encoder weights live under a
    // "bert."/"roberta." prefix (classification exports) or at the root
    // (sentence-transformer exports).
    if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
        BertModel::load(vb.pp("bert"), config)
    } else if vb.contains_tensor("roberta.embeddings.word_embeddings.weight") {
        BertModel::load(vb.pp("roberta"), config)
    } else {
        BertModel::load(vb.clone(), config)
    }
}

/// Sentence-embedding backbone: token-level hidden states, pooled by the
/// caller.
#[derive(Clone)]
pub struct BertEncoder {
    model: Arc<BertModel>,
    hidden_size: usize,
}

impl BertEncoder {
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let config = read_bert_config(model_dir)?;
        let weights_path = model_dir.join("model.safetensors");

        let vb =
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)? };
        let model = load_backbone(&vb, &config)?;

        Ok(Self {
            model: Arc::new(model),
            hidden_size: config.hidden_size,
        })
    }

    /// Hidden states of shape `[batch, seq_len, hidden_size]`.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: Option<&Tensor>,
    ) -> Result<Tensor> {
        self.model.forward(input_ids, token_type_ids, attention_mask)
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }
}

struct PairClassifierImpl {
    bert: BertModel,
    classifier: Linear,
}

impl PairClassifierImpl {
    fn load(vb: VarBuilder, config: &Config) -> Result<Self> {
        let bert = load_backbone(&vb, config)?;
        let classifier = candle_nn::linear(config.hidden_size, 1, vb.pp("classifier"))?;
        Ok(Self { bert, classifier })
    }

    fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: Option<&Tensor>,
    ) -> Result<Tensor> {
        let output = self
            .bert
            .forward(input_ids, token_type_ids, attention_mask)?;
        let cls_token = output.i((.., 0, ..))?;
        self.classifier.forward(&cls_token)
    }
}

/// Cross-encoder backbone: a single relevance logit per (query, text) pair,
/// taken from the CLS position.
#[derive(Clone)]
pub struct PairClassifier(Arc<PairClassifierImpl>);

impl PairClassifier {
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let config = read_bert_config(model_dir)?;
        let weights_path = model_dir.join("model.safetensors");

        let vb =
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)? };
        let model = PairClassifierImpl::load(vb, &config)?;

        Ok(Self(Arc::new(model)))
    }

    /// Logits of shape `[batch, 1]`.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: Option<&Tensor>,
    ) -> Result<Tensor> {
        self.0.forward(input_ids, token_type_ids, attention_mask)
    }
}
