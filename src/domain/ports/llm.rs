use crate::domain::{errors::DomainError, Message};
use async_trait::async_trait;

/// Produces an answer from an ordered sequence of system/user/assistant turns.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    fn name(&self) -> &str;
    async fn generate(&self, turns: &[Message]) -> Result<String, DomainError>;
}
