//! Application layer - Use cases and orchestration.
//!
//! Services depend on domain ports (traits) rather than concrete
//! infrastructure, so every backend can be swapped for an in-memory one.

pub mod services;

pub use services::{
    AskOutcome, AskRequest, AskService, ContextAssembler, RetrievalRouter, SeedReport,
    SessionHistoryService, StoreRegistry, VectorStoreManager,
};
