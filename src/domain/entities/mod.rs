mod collection;
mod conversation;
mod document;
mod embedding;

pub use collection::{collection_name, Collection, DocType, Language};
pub use conversation::{
    InteractionLog, Message, MessageRole, NewInteraction, DEFAULT_WINDOW, FALLBACK_ANSWER,
};
pub use document::{
    chunk_sections, parse_sections, split_window, DocumentChunk, EvidenceSet, SearchResult,
    Section, CHUNK_OVERLAP, CHUNK_SIZE,
};
pub use embedding::{similarity_to_distance, Embedding};
