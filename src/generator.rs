//! Text generation providers
//!
//! The pipeline only needs "prompt in, text out"; providers hide which
//! service answers.

use crate::SyncError;
use async_trait::async_trait;
use std::sync::Mutex;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: String) -> Result<String, SyncError>;
}

/// Deterministic generator that answers every prompt with the same text and
/// remembers the prompts it was given.
pub struct MockGenerator {
    response: String,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: String) -> Result<String, SyncError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt);
        }
        Ok(self.response.clone())
    }
}

#[cfg(feature = "llm")]
pub mod openai {
    use super::*;
    use crate::config::GenerationConfig;
    use async_openai::config::OpenAIConfig;
    use async_openai::types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    };
    use async_openai::Client;
    use tracing::debug;

    /// OpenAI chat completion provider
    pub struct OpenAIGenerator {
        client: Client<OpenAIConfig>,
        model: String,
        max_tokens: u16,
    }

    impl OpenAIGenerator {
        pub fn new(api_key: String) -> Self {
            let config = OpenAIConfig::new().with_api_key(api_key);
            Self {
                client: Client::with_config(config),
                model: crate::config::DEFAULT_MODEL.to_string(),
                max_tokens: crate::config::DEFAULT_MAX_TOKENS,
            }
        }

        pub fn from_config(config: &GenerationConfig) -> Self {
            Self::new(config.api_key.clone())
                .with_model(config.model.clone())
                .with_max_tokens(config.max_tokens)
        }

        pub fn with_model(mut self, model: String) -> Self {
            self.model = model;
            self
        }

        pub fn with_max_tokens(mut self, max_tokens: u16) -> Self {
            self.max_tokens = max_tokens;
            self
        }
    }

    fn service_error(e: impl std::fmt::Display) -> SyncError {
        SyncError::ExternalServiceError {
            service: "OpenAI".to_string(),
            message: e.to_string(),
        }
    }

    #[async_trait]
    impl TextGenerator for OpenAIGenerator {
        fn name(&self) -> &str {
            "openai"
        }

        async fn generate(&self, prompt: String) -> Result<String, SyncError> {
            let user_message = ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(service_error)?;

            let request = CreateChatCompletionRequestArgs::default()
                .model(&self.model)
                .messages(vec![ChatCompletionRequestMessage::User(user_message)])
                .max_tokens(self.max_tokens)
                .build()
                .map_err(service_error)?;

            debug!(model = %self.model, max_tokens = self.max_tokens, "Requesting completion");

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(service_error)?;

            response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .ok_or_else(|| service_error("No content in response"))
        }
    }
}
