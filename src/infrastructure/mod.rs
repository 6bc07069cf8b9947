pub mod bootstrap;
pub mod config;
pub mod embedding;
pub mod history;
pub mod llm;
pub mod redis;
pub mod seed_lock;
pub mod vector_store;

pub use bootstrap::Adapters;
pub use config::{AppConfig, Backend, ConfigError, DEFAULT_CONFIG_PATH};
pub use embedding::TextEmbedding;
pub use history::{InMemorySessionHistory, RedisSessionHistory};
pub use llm::{build_generator, AnthropicGenerator, FailoverGenerator, OpenAiGenerator};
pub use redis::{create_pool, keys, RedisPool};
pub use seed_lock::{InMemorySeedLock, RedisSeedLock};
pub use vector_store::{
    InMemoryVectorStore, InMemoryVectorStoreProvider, QdrantVectorStore, QdrantVectorStoreProvider,
};
