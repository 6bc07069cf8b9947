mod in_memory;
mod qdrant;

pub use in_memory::{InMemoryVectorStore, InMemoryVectorStoreProvider};
pub use qdrant::{QdrantVectorStore, QdrantVectorStoreProvider};
