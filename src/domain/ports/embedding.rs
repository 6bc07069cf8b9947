use crate::domain::{errors::DomainError, Embedding};
use async_trait::async_trait;

/// Text to vector. Questions and knowledge chunks must go through the same
/// model so their distances are comparable.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError>;
    /// Output is index-aligned with `texts`.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError>;
    fn dimension(&self) -> usize;
}
