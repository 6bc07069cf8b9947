use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::domain::{
    ports::{VectorStore, VectorStoreProvider},
    DocumentChunk, DomainError, Embedding, SearchResult,
};

/// Process-local collections, kept for the lifetime of the provider.
#[derive(Default)]
pub struct InMemoryVectorStoreProvider {
    stores: RwLock<HashMap<String, Arc<InMemoryVectorStore>>>,
}

impl InMemoryVectorStoreProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStoreProvider for InMemoryVectorStoreProvider {
    async fn open(&self, collection: &str) -> Result<Arc<dyn VectorStore>, DomainError> {
        let mut stores = self
            .stores
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let store = stores
            .entry(collection.to_string())
            .or_insert_with(|| Arc::new(InMemoryVectorStore::new(collection)))
            .clone();
        Ok(store)
    }
}

pub struct InMemoryVectorStore {
    collection: String,
    points: RwLock<Vec<(DocumentChunk, Embedding)>>,
}

impl InMemoryVectorStore {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            points: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let points = self
            .points
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(points.len() as u64)
    }

    async fn upsert(
        &self,
        chunks: &[DocumentChunk],
        embeddings: &[Embedding],
    ) -> Result<(), DomainError> {
        if chunks.len() != embeddings.len() {
            return Err(DomainError::internal(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let mut points = self
            .points
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            points.retain(|(c, _)| c.id != chunk.id);
            points.push((chunk.clone(), embedding.clone()));
        }
        Ok(())
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let points = self
            .points
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let mut results: Vec<SearchResult> = points
            .iter()
            .map(|(chunk, embedding)| SearchResult {
                chunk: chunk.clone(),
                distance: query.cosine_distance(embedding),
            })
            .collect();

        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results.truncate(top_k);
        Ok(results)
    }

    async fn retain_only(&self, keep: &[Uuid]) -> Result<(), DomainError> {
        self.points
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?
            .retain(|(chunk, _)| keep.contains(&chunk.id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str, index: usize) -> DocumentChunk {
        DocumentChunk::new("cv_en_embeddings", "Skills", text, index)
    }

    #[tokio::test]
    async fn test_upsert_and_search_by_distance() {
        let store = InMemoryVectorStore::new("cv_en_embeddings");
        store
            .upsert(
                &[chunk("rust", 0), chunk("python", 1)],
                &[
                    Embedding::new(vec![1.0, 0.0, 0.0]),
                    Embedding::new(vec![0.0, 1.0, 0.0]),
                ],
            )
            .await
            .unwrap();

        let results = store
            .search(&Embedding::new(vec![1.0, 0.1, 0.0]), 1)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.text, "rust");
        assert!(results[0].distance < 0.01);
    }

    #[tokio::test]
    async fn test_upsert_same_chunk_overwrites() {
        let store = InMemoryVectorStore::new("cv_en_embeddings");
        let embedding = Embedding::new(vec![1.0, 0.0]);

        store.upsert(&[chunk("rust", 0)], &[embedding.clone()]).await.unwrap();
        store.upsert(&[chunk("rust", 0)], &[embedding]).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_retain_only_and_provider_reopen() {
        let provider = InMemoryVectorStoreProvider::new();
        let store = provider.open("faq_en_embeddings").await.unwrap();
        let (remote, onsite) = (chunk("remote", 0), chunk("onsite", 1));
        store
            .upsert(
                &[remote.clone(), onsite],
                &[Embedding::new(vec![1.0]), Embedding::new(vec![0.5])],
            )
            .await
            .unwrap();

        let reopened = provider.open("faq_en_embeddings").await.unwrap();
        assert_eq!(reopened.count().await.unwrap(), 2);

        reopened.retain_only(&[remote.id]).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);

        reopened.retain_only(&[]).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
