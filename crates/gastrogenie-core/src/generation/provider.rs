//! Generative-model backends behind the [`TextGenerator`] contract.

use std::time::Duration;

use async_trait::async_trait;
use genai::Client;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest};
use tracing::debug;

use super::error::GenerationError;

/// Narrow text-in/text-out contract over a generative model.
///
/// Implementations are expected to be expensive to construct (weights, warm
/// connections) and cheap to call repeatedly; the registry caches them per
/// model key.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Runs one generation with a bounded output-length budget.
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerationError>;
}

/// [`TextGenerator`] backed by a `genai` chat model.
pub struct GenAiGenerator {
    client: Client,
    model_id: String,
    timeout: Duration,
}

impl GenAiGenerator {
    pub fn new(client: Client, model_id: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            model_id: model_id.into(),
            timeout,
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[async_trait]
impl TextGenerator for GenAiGenerator {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerationError> {
        debug!(
            model = %self.model_id,
            prompt_len = prompt.len(),
            max_tokens,
            "Invoking generative model"
        );

        let request = ChatRequest::new(vec![ChatMessage::user(prompt)]);
        let options = ChatOptions::default().with_max_tokens(max_tokens);

        let response = tokio::time::timeout(
            self.timeout,
            self.client.exec_chat(&self.model_id, request, Some(&options)),
        )
        .await
        .map_err(|_| GenerationError::Timeout {
            secs: self.timeout.as_secs(),
        })?
        .map_err(|e| GenerationError::CallFailed {
            reason: e.to_string(),
        })?;

        let text = response.first_text().unwrap_or_default().trim().to_string();
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        Ok(text)
    }
}

#[cfg(any(test, feature = "mock"))]
mod mock {
    use super::*;
    use parking_lot::Mutex;

    enum MockBehavior {
        Reply(String),
        Fail,
    }

    /// Scripted [`TextGenerator`] for tests: fixed reply or guaranteed
    /// failure, with prompt capture for assertions.
    pub struct MockTextGenerator {
        behavior: MockBehavior,
        prompts: Mutex<Vec<String>>,
    }

    impl MockTextGenerator {
        /// Always returns `reply`.
        pub fn with_reply(reply: &str) -> Self {
            Self {
                behavior: MockBehavior::Reply(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        /// Always fails with a call error.
        pub fn failing() -> Self {
            Self {
                behavior: MockBehavior::Fail,
                prompts: Mutex::new(Vec::new()),
            }
        }

        /// Prompts seen so far, in call order.
        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for MockTextGenerator {
        async fn generate(
            &self,
            prompt: &str,
            _max_tokens: u32,
        ) -> Result<String, GenerationError> {
            self.prompts.lock().push(prompt.to_string());
            match &self.behavior {
                MockBehavior::Reply(reply) => Ok(reply.clone()),
                MockBehavior::Fail => Err(GenerationError::CallFailed {
                    reason: "mock generator configured to fail".to_string(),
                }),
            }
        }
    }
}

#[cfg(any(test, feature = "mock"))]
pub use mock::MockTextGenerator;
