use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Chat;
use rig::providers::openai;

use super::{to_chat_request, GenerationParams};
use crate::domain::{ports::AnswerGenerator, DomainError, Message};

pub struct OpenAiGenerator {
    client: openai::Client,
    model: String,
    params: GenerationParams,
}

impl OpenAiGenerator {
    /// Requires `OPENAI_API_KEY` in the environment.
    pub fn from_env(model: impl Into<String>, params: GenerationParams) -> Result<Self, DomainError> {
        if std::env::var("OPENAI_API_KEY").is_err() {
            return Err(DomainError::validation("OPENAI_API_KEY is not set"));
        }

        Ok(Self {
            client: openai::Client::from_env(),
            model: model.into(),
            params,
        })
    }
}

#[async_trait]
impl AnswerGenerator for OpenAiGenerator {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, turns: &[Message]) -> Result<String, DomainError> {
        let request = to_chat_request(turns)?;
        let agent = self
            .client
            .agent(&self.model)
            .preamble(&request.preamble)
            .temperature(self.params.temperature)
            .max_tokens(self.params.max_tokens)
            .build();

        agent
            .chat(request.prompt, request.history)
            .await
            .map_err(|e| DomainError::generation(format!("openai: {e}")))
    }
}
