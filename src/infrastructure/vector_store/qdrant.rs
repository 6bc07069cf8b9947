use async_trait::async_trait;
use qdrant_client::qdrant::{
    Condition, CountPointsBuilder, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter,
    PointStruct, ScoredPoint, SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    ports::{VectorStore, VectorStoreProvider},
    similarity_to_distance, DocumentChunk, DomainError, Embedding, SearchResult,
};

/// Opens per-collection handles sharing one Qdrant client.
pub struct QdrantVectorStoreProvider {
    client: Arc<Qdrant>,
    dimension: usize,
}

impl QdrantVectorStoreProvider {
    pub fn new(url: &str, api_key: Option<String>, dimension: usize) -> Result<Self, DomainError> {
        let client = Qdrant::from_url(url)
            .api_key(api_key)
            .build()
            .map_err(|e| DomainError::store_unavailable(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
            dimension,
        })
    }
}

#[async_trait]
impl VectorStoreProvider for QdrantVectorStoreProvider {
    async fn open(&self, collection: &str) -> Result<Arc<dyn VectorStore>, DomainError> {
        let store = QdrantVectorStore {
            client: self.client.clone(),
            collection: collection.to_string(),
            dimension: self.dimension,
        };
        store.ensure_collection().await?;
        Ok(Arc::new(store))
    }
}

/// Cosine collection. Qdrant reports similarity; results are converted to
/// distance before leaving this adapter.
pub struct QdrantVectorStore {
    client: Arc<Qdrant>,
    collection: String,
    dimension: usize,
}

impl QdrantVectorStore {
    async fn ensure_collection(&self) -> Result<(), DomainError> {
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| DomainError::store_unavailable(e.to_string()))?;

        let exists = collections
            .collections
            .iter()
            .any(|c| c.name == self.collection);

        if exists {
            return Ok(());
        }

        let created = self
            .client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection).vectors_config(
                    VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine),
                ),
            )
            .await;

        match created {
            Ok(_) => {
                tracing::info!(collection = %self.collection, "created qdrant collection");
                Ok(())
            }
            // Another instance created it after our listing.
            Err(e) if already_exists(&e.to_string()) => {
                tracing::debug!(collection = %self.collection, "qdrant collection created concurrently");
                Ok(())
            }
            Err(e) => Err(DomainError::store_unavailable(e.to_string())),
        }
    }
}

fn already_exists(message: &str) -> bool {
    message.to_ascii_lowercase().contains("already exists")
}

/// Converts scored points to hits in ascending distance. Points whose payload
/// does not describe a chunk are dropped.
fn into_hits(points: Vec<ScoredPoint>) -> Vec<SearchResult> {
    let mut hits: Vec<SearchResult> = points.into_iter().filter_map(to_search_result).collect();
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

fn to_search_result(point: ScoredPoint) -> Option<SearchResult> {
    let payload = point.payload;

    let id: Uuid = payload.get("chunk_id")?.as_str()?.parse().ok()?;
    let text = payload.get("text")?.as_str()?.to_string();
    let title = payload
        .get("title")
        .and_then(|v| v.as_str())
        .cloned()
        .unwrap_or_default();
    let source_collection = payload.get("source_collection")?.as_str()?.to_string();
    let chunk_index = payload.get("chunk_index")?.as_integer()? as usize;

    Some(SearchResult {
        chunk: DocumentChunk {
            id,
            text,
            title,
            source_collection,
            chunk_index,
        },
        distance: similarity_to_distance(point.score),
    })
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let response = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await
            .map_err(|e| DomainError::store_unavailable(e.to_string()))?;

        Ok(response.result.map(|r| r.count).unwrap_or(0))
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
        if chunks.is_empty() {
            return Ok(());
        }

        let mut points = Vec::with_capacity(chunks.len());
        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            let payload: Payload = serde_json::json!({
                "chunk_id": chunk.id.to_string(),
                "text": chunk.text,
                "title": chunk.title,
                "source_collection": chunk.source_collection,
                "chunk_index": chunk.chunk_index,
            })
            .try_into()
            .map_err(|_| DomainError::internal("Failed to create payload"))?;

            points.push(PointStruct::new(
                chunk.id.to_string(),
                embedding.as_slice().to_vec(),
                payload,
            ));
        }

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(|e| DomainError::store_unavailable(e.to_string()))?;

        Ok(())
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let results = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, query.as_slice().to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| DomainError::store_unavailable(e.to_string()))?;

        Ok(into_hits(results.result))
    }

    async fn retain_only(&self, keep: &[Uuid]) -> Result<(), DomainError> {
        let ids: Vec<String> = keep.iter().map(Uuid::to_string).collect();
        let stale = Filter::must_not([Condition::has_id(ids)]);

        self.client
            .delete_points(DeletePointsBuilder::new(&self.collection).points(stale).wait(true))
            .await
            .map_err(|e| DomainError::store_unavailable(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qdrant_client::qdrant::Value;
    use std::collections::HashMap;

    fn point(score: f32, text: &str, index: i64) -> ScoredPoint {
        let payload = HashMap::from([
            ("chunk_id".to_string(), Value::from(Uuid::new_v4().to_string())),
            ("text".to_string(), Value::from(text.to_string())),
            ("title".to_string(), Value::from("Experience".to_string())),
            ("source_collection".to_string(), Value::from("cv_en_embeddings".to_string())),
            ("chunk_index".to_string(), Value::from(index)),
        ]);
        ScoredPoint {
            score,
            payload,
            ..Default::default()
        }
    }

    #[test]
    fn test_hits_are_distances_in_ascending_order() {
        let hits = into_hits(vec![point(0.2, "far", 1), point(0.9, "near", 0)]);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk.text, "near");
        assert!((hits[0].distance - 0.1).abs() < 1e-6);
        assert_eq!(hits[1].chunk.text, "far");
        assert!((hits[1].distance - 0.8).abs() < 1e-6);
        assert_eq!(hits[1].chunk.chunk_index, 1);
        assert_eq!(hits[1].chunk.source_collection, "cv_en_embeddings");
    }

    #[test]
    fn test_malformed_payload_is_dropped() {
        let mut bad_id = point(0.95, "bad id", 0);
        bad_id
            .payload
            .insert("chunk_id".to_string(), Value::from("not-a-uuid".to_string()));
        let mut no_text = point(0.99, "gone", 1);
        no_text.payload.remove("text");

        let hits = into_hits(vec![bad_id, no_text, point(0.5, "kept", 2)]);

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk.text, "kept");
        assert!((hits[0].distance - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_missing_title_defaults_to_empty() {
        let mut untitled = point(0.7, "body", 0);
        untitled.payload.remove("title");

        let hits = into_hits(vec![untitled]);
        assert_eq!(hits[0].chunk.title, "");
    }

    #[test]
    fn test_already_exists_error_is_recognized() {
        assert!(already_exists(
            "Error in the response: Wrong input Collection `cv_en_embeddings` already exists!"
        ));
        assert!(already_exists("status: AlreadyExists, message: \"Collection already exists\""));
        assert!(!already_exists("transport error: connection refused"));
    }
}
