use std::sync::Arc;

use super::{
    config::{AppConfig, Backend},
    embedding::TextEmbedding,
    history::{InMemorySessionHistory, RedisSessionHistory},
    llm::build_generator,
    redis::create_pool,
    seed_lock::{InMemorySeedLock, RedisSeedLock},
    vector_store::{InMemoryVectorStoreProvider, QdrantVectorStoreProvider},
};
use crate::domain::{
    ports::{AnswerGenerator, EmbeddingService, SeedLock, SessionHistory, VectorStoreProvider},
    DomainError,
};

/// Backends the services need, chosen by configuration. The vector store
/// provider is built separately so its failure can degrade instead of abort.
pub struct Adapters {
    pub seed_lock: Arc<dyn SeedLock>,
    pub history: Arc<dyn SessionHistory>,
    pub embedding: Arc<dyn EmbeddingService>,
    pub generator: Arc<dyn AnswerGenerator>,
}

impl Adapters {
    pub fn from_config(config: &AppConfig) -> Result<Self, DomainError> {
        let (history, seed_lock) = storage_backends(config)?;

        Ok(Self {
            seed_lock,
            history,
            embedding: Arc::new(TextEmbedding::from_config(&config.embedding)?),
            generator: build_generator(&config.llm)?,
        })
    }
}

pub fn vector_store_provider(config: &AppConfig) -> Result<Arc<dyn VectorStoreProvider>, DomainError> {
    match config.vector_store.backend {
        Backend::Memory => Ok(Arc::new(InMemoryVectorStoreProvider::new())),
        _ => Ok(Arc::new(QdrantVectorStoreProvider::new(
            &config.vector_store.url,
            config.vector_store.api_key.clone(),
            config.embedding.dimension,
        )?)),
    }
}

/// History store and seed claim marker. Claims go through Redis whenever a
/// shared vector backend and a Redis connection are both configured.
pub fn storage_backends(
    config: &AppConfig,
) -> Result<(Arc<dyn SessionHistory>, Arc<dyn SeedLock>), DomainError> {
    if !config.uses_redis() {
        if config.vector_store.backend == Backend::Qdrant {
            tracing::warn!("no redis configured, seeding claims are process-local");
        }
        return Ok((
            Arc::new(InMemorySessionHistory::new()),
            Arc::new(InMemorySeedLock::new()),
        ));
    }

    let pool = create_pool(&config.history.redis_url)?;
    let seed_lock: Arc<dyn SeedLock> = match config.vector_store.backend {
        Backend::Memory => Arc::new(InMemorySeedLock::new()),
        _ => Arc::new(RedisSeedLock::new(pool.clone(), config.seeding.claim_ttl_seconds)),
    };
    Ok((Arc::new(RedisSessionHistory::new(pool)), seed_lock))
}
