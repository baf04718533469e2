//! Generative-model access: the text-generation contract, the static model
//! catalog, and the lazy backend cache.

pub mod error;
pub mod provider;
pub mod registry;


pub use error::GenerationError;
#[cfg(any(test, feature = "mock"))]
pub use provider::MockTextGenerator;
pub use provider::{GenAiGenerator, TextGenerator};
pub use registry::{MODEL_SPECS, ModelLoader, ModelRegistry, ModelSpec, resolve_key, spec_for};
