//! Static model catalog and the lazily-populated backend cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use genai::Client;
use parking_lot::Mutex;
use tracing::{debug, info};

use super::error::GenerationError;
use super::provider::{GenAiGenerator, TextGenerator};
use crate::constants::DEFAULT_MODEL_KEY;

/// One entry of the static model catalog.
#[derive(Debug, Clone, Copy)]
pub struct ModelSpec {
    /// Key accepted in API requests.
    pub key: &'static str,
    /// Identifier the backing runtime resolves (Ollama-style ids).
    pub model_id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// One-line description for the model listing.
    pub description: &'static str,
    /// Output-length budget per call.
    pub max_tokens: u32,
}

/// The process-wide model catalog. Static for the process lifetime.
pub const MODEL_SPECS: &[ModelSpec] = &[
    ModelSpec {
        key: "tiny_llama",
        model_id: "tinyllama",
        name: "TinyLlama 1.1B Chat",
        description: "Small, fast chat model for query understanding and recipe picks",
        max_tokens: 256,
    },
    ModelSpec {
        key: "phi3_mini",
        model_id: "phi3:mini",
        name: "Phi-3 Mini",
        description: "Mid-sized model with stronger reasoning for trickier requests",
        max_tokens: 320,
    },
    ModelSpec {
        key: "qwen_small",
        model_id: "qwen2.5:1.5b",
        name: "Qwen2.5 1.5B Instruct",
        description: "Compact multilingual model",
        max_tokens: 256,
    },
];

/// Looks up a catalog entry by key.
pub fn spec_for(key: &str) -> Option<&'static ModelSpec> {
    MODEL_SPECS.iter().find(|spec| spec.key == key)
}

/// Coerces unknown keys to the default. Requests naming an unrecognized
/// model behave exactly like requests naming the default.
pub fn resolve_key(key: &str) -> &'static str {
    match spec_for(key) {
        Some(spec) => spec.key,
        None => {
            debug!(requested = key, default = DEFAULT_MODEL_KEY, "Unknown model key, using default");
            DEFAULT_MODEL_KEY
        }
    }
}

/// Constructs a backend for a catalog entry.
pub type ModelLoader =
    Box<dyn Fn(&'static ModelSpec) -> Result<Arc<dyn TextGenerator>, GenerationError> + Send + Sync>;

/// Lazily-populated cache of generative backends, one per model key.
///
/// Population is serialized behind a mutex: concurrent first use of the same
/// key performs exactly one load, even when backends are multi-GB model
/// processes.
pub struct ModelRegistry {
    loader: ModelLoader,
    cache: Mutex<HashMap<&'static str, Arc<dyn TextGenerator>>>,
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("cached_keys", &self.cache.lock().len())
            .finish()
    }
}

impl ModelRegistry {
    /// Registry with an injected loader (tests use counting/fake loaders).
    pub fn new(loader: ModelLoader) -> Self {
        Self {
            loader,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Production registry: every catalog entry backed by a `genai` chat
    /// model sharing one client, each call bounded by `timeout`.
    pub fn with_genai(timeout: Duration) -> Self {
        let client = Client::default();
        Self::new(Box::new(move |spec| {
            info!(key = spec.key, model_id = spec.model_id, "Initializing generative backend");
            Ok(Arc::new(GenAiGenerator::new(
                client.clone(),
                spec.model_id,
                timeout,
            )) as Arc<dyn TextGenerator>)
        }))
    }

    /// Returns the backend for `key`, loading it on first use. Unknown keys
    /// resolve to the default model first.
    pub fn get(&self, key: &str) -> Result<Arc<dyn TextGenerator>, GenerationError> {
        let key = resolve_key(key);
        let spec = spec_for(key).ok_or_else(|| GenerationError::LoadFailed {
            key: key.to_string(),
            reason: "resolved key missing from catalog".to_string(),
        })?;

        let mut cache = self.cache.lock();
        if let Some(generator) = cache.get(spec.key) {
            return Ok(generator.clone());
        }

        let generator = (self.loader)(spec)?;
        cache.insert(spec.key, generator.clone());
        Ok(generator)
    }

    /// Number of backends loaded so far.
    pub fn loaded_count(&self) -> usize {
        self.cache.lock().len()
    }
}
