use async_trait::async_trait;
use rig::client::{EmbeddingsClient, ProviderClient};
use rig::embeddings::EmbeddingModel;
use rig::providers::openai;

use crate::domain::{ports::EmbeddingService, DomainError, Embedding};
use crate::infrastructure::config::EmbeddingConfig;

/// Inputs per embeddings request.
const BATCH_SIZE: usize = 256;

/// OpenAI text embeddings through rig.
pub struct TextEmbedding {
    client: openai::Client,
    model: String,
    dimension: usize,
}

impl TextEmbedding {
    /// Requires `OPENAI_API_KEY` in the environment.
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, DomainError> {
        if std::env::var("OPENAI_API_KEY").is_err() {
            return Err(DomainError::external(
                "OPENAI_API_KEY is not set; embeddings are unavailable",
            ));
        }

        Ok(Self {
            client: openai::Client::from_env(),
            model: config.model.clone(),
            dimension: config.dimension,
        })
    }

    fn to_embedding(embedding: rig::embeddings::Embedding) -> Embedding {
        Embedding::new(embedding.vec.into_iter().map(|x| x as f32).collect())
    }
}

#[async_trait]
impl EmbeddingService for TextEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        let model = self.client.embedding_model(&self.model);
        model
            .embed_text(text)
            .await
            .map(Self::to_embedding)
            .map_err(|e| DomainError::external(format!("embedding failed: {e}")))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.client.embedding_model(&self.model);
        let mut embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(BATCH_SIZE) {
            let owned: Vec<String> = batch.iter().map(|t| t.to_string()).collect();
            let vectors = model
                .embed_texts(owned)
                .await
                .map_err(|e| DomainError::external(format!("embedding failed: {e}")))?;

            if vectors.len() != batch.len() {
                return Err(DomainError::external(format!(
                    "embedding provider returned {} vectors for {} inputs",
                    vectors.len(),
                    batch.len()
                )));
            }
            embeddings.extend(vectors.into_iter().map(Self::to_embedding));
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
