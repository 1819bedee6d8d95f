//! Single-shot text generation over a [`Provider`].

use std::sync::Arc;
use ironlog_config::AppConfig;
use ironlog_core::error::ProviderError;
use ironlog_core::message::Message;
use ironlog_core::provider::{Provider, ProviderRequest};
use tracing::debug;

/// Sends one system persona plus one user prompt and returns the reply text.
///
/// No retries: a failed call is reported to the user once.
#[derive(Clone)]
pub struct Generator {
    provider: Arc<dyn Provider>,
    model: String,
    max_tokens: Option<u32>,
}

impl Generator {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens: None,
        }
    }

    pub fn from_config(provider: Arc<dyn Provider>, config: &AppConfig) -> Self {
        let generator = Self::new(provider, &config.provider.model);
        match config.provider.max_tokens {
            Some(max) => generator.with_max_tokens(max),
            None => generator,
        }
    }

    /// Set the max tokens per reply.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn generate(
        &self,
        system: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, ProviderError> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: vec![Message::system(system), Message::user(prompt)],
            temperature,
            max_tokens: self.max_tokens,
        };

        let response = self.provider.complete(request).await?;
        if let Some(usage) = &response.usage {
            debug!(
                model = %response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Generation complete"
            );
        }
        Ok(response.message.content)
    }
}
