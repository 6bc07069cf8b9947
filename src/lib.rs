//! Retrieval-augmented question answering over a personal knowledge base
//! (CV and FAQ sources per language).

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
