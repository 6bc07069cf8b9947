use crate::domain::{errors::DomainError, DocumentChunk, Embedding, SearchResult};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// A handle on one named collection.
///
/// `search` returns hits ordered by ascending distance; adapters whose
/// backend reports similarity must convert it.
#[async_trait]
pub trait VectorStore: Send + Sync {
    fn collection(&self) -> &str;
    async fn count(&self) -> Result<u64, DomainError>;
    async fn upsert(
        &self,
        chunks: &[DocumentChunk],
        embeddings: &[Embedding],
    ) -> Result<(), DomainError>;
    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError>;
    /// Deletes every point whose id is not in `keep`.
    async fn retain_only(&self, keep: &[Uuid]) -> Result<(), DomainError>;
}

/// Opens collection handles, creating the collection if the backend needs it.
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    async fn open(&self, collection: &str) -> Result<Arc<dyn VectorStore>, DomainError>;
}
