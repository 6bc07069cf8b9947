pub mod ask;
pub mod context;
pub mod history;
pub mod knowledge_base;
pub mod retrieval;
pub mod vector_store_manager;

#[cfg(test)]
pub(crate) mod testing;

pub use ask::{AskOutcome, AskRequest, AskService};
pub use context::ContextAssembler;
pub use history::SessionHistoryService;
pub use knowledge_base::{chunk_source, load_collection};
pub use retrieval::{select_best, RetrievalRouter, DEFAULT_TOP_K};
pub use vector_store_manager::{SeedReport, StoreRegistry, VectorStoreManager};
