mod embedding;
mod llm;
mod seed_lock;
mod session_history;
mod vector_store;

pub use embedding::EmbeddingService;
pub use llm::AnswerGenerator;
pub use seed_lock::SeedLock;
pub use session_history::SessionHistory;
pub use vector_store::{VectorStore, VectorStoreProvider};
