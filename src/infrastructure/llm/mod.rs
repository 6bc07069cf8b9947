mod anthropic;
mod failover;
mod openai;

pub use anthropic::AnthropicGenerator;
pub use failover::FailoverGenerator;
pub use openai::OpenAiGenerator;

use rig::completion::Message as RigMessage;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{ports::AnswerGenerator, DomainError, Message, MessageRole};
use crate::infrastructure::config::LlmConfig;

/// Sampling settings shared by every provider.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    pub temperature: f64,
    pub max_tokens: u64,
}

impl From<&LlmConfig> for GenerationParams {
    fn from(config: &LlmConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Turns reshaped for rig's chat API.
#[derive(Debug)]
pub(crate) struct ChatRequest {
    pub preamble: String,
    pub history: Vec<RigMessage>,
    pub prompt: String,
}

/// System turns become the preamble, the final user turn the prompt, and
/// everything in between the chat history.
pub(crate) fn to_chat_request(turns: &[Message]) -> Result<ChatRequest, DomainError> {
    let (last, rest) = turns
        .split_last()
        .ok_or_else(|| DomainError::validation("no turns to generate from"))?;
    if last.role != MessageRole::User {
        return Err(DomainError::validation("the final turn must come from the user"));
    }

    let preamble = rest
        .iter()
        .filter(|m| m.role == MessageRole::System)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let history = rest
        .iter()
        .filter_map(|m| match m.role {
            MessageRole::System => None,
            MessageRole::User => Some(RigMessage::user(m.content.clone())),
            MessageRole::Assistant => Some(RigMessage::assistant(m.content.clone())),
        })
        .collect();

    Ok(ChatRequest {
        preamble,
        history,
        prompt: last.content.clone(),
    })
}

/// Builds the configured providers in order, skipping those without
/// credentials. Fails when none remain.
pub fn build_generator(config: &LlmConfig) -> Result<Arc<dyn AnswerGenerator>, DomainError> {
    let params = GenerationParams::from(config);
    let mut providers: Vec<Arc<dyn AnswerGenerator>> = Vec::new();

    for entry in &config.providers {
        let provider: Result<Arc<dyn AnswerGenerator>, DomainError> =
            match entry.provider.to_ascii_lowercase().as_str() {
                "openai" => OpenAiGenerator::from_env(&entry.model, params)
                    .map(|g| Arc::new(g) as Arc<dyn AnswerGenerator>),
                "anthropic" => AnthropicGenerator::from_env(&entry.model, params)
                    .map(|g| Arc::new(g) as Arc<dyn AnswerGenerator>),
                other => Err(DomainError::validation(format!("unknown llm provider '{other}'"))),
            };

        match provider {
            Ok(provider) => providers.push(provider),
            Err(e) => tracing::warn!(provider = %entry.provider, error = %e, "skipping llm provider"),
        }
    }

    if providers.is_empty() {
        return Err(DomainError::validation("no usable llm provider configured"));
    }

    let chain = FailoverGenerator::new(providers)
        .with_timeout(Duration::from_secs(config.timeout_seconds));
    tracing::info!(providers = chain.chain_len(), "answer generator ready");
    Ok(Arc::new(chain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_chat_request_splits_turns() {
        let turns = vec![
            Message::system("answer in English"),
            Message::user("where do you live?"),
            Message::assistant("San José"),
            Message::user("since when?"),
        ];
        let request = to_chat_request(&turns).unwrap();

        assert_eq!(request.preamble, "answer in English");
        assert_eq!(request.history.len(), 2);
        assert_eq!(request.prompt, "since when?");
    }

    #[test]
    fn test_to_chat_request_rejects_trailing_assistant_turn() {
        let turns = vec![Message::user("hi"), Message::assistant("hello")];
        assert!(matches!(
            to_chat_request(&turns),
            Err(DomainError::Validation(_))
        ));
        assert!(to_chat_request(&[]).is_err());
    }
}
