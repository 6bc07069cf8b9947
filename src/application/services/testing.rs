//! Scripted collaborators for service tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::domain::{
    ports::{AnswerGenerator, EmbeddingService, SessionHistory, VectorStore, VectorStoreProvider},
    DocumentChunk, DomainError, Embedding, InteractionLog, Message, NewInteraction, SearchResult,
};

/// Letter-frequency vectors: cheap, deterministic, and similar texts land
/// close together.
pub struct LetterEmbedding;

impl LetterEmbedding {
    fn vectorize(text: &str) -> Embedding {
        let mut vec = vec![0.0f32; 27];
        vec[26] = 1.0;
        for c in text.chars().filter(|c| c.is_ascii_alphabetic()) {
            vec[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
        }
        Embedding::new(vec)
    }
}

#[async_trait]
impl EmbeddingService for LetterEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        Ok(Self::vectorize(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        Ok(texts.iter().map(|t| Self::vectorize(t)).collect())
    }

    fn dimension(&self) -> usize {
        27
    }
}

/// Embedding backend that is down.
pub struct FailingEmbedding;

#[async_trait]
impl EmbeddingService for FailingEmbedding {
    async fn embed(&self, _: &str) -> Result<Embedding, DomainError> {
        Err(DomainError::external("embedding provider returned 503"))
    }

    async fn embed_batch(&self, _: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        Err(DomainError::external("embedding provider returned 503"))
    }

    fn dimension(&self) -> usize {
        27
    }
}

/// A collection that answers every search with fixed distances, or fails.
pub struct ScriptedStore {
    name: String,
    distances: Option<Vec<f32>>,
    pub searches: AtomicUsize,
}

impl ScriptedStore {
    pub fn hits(name: &str, distances: &[f32]) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            distances: Some(distances.to_vec()),
            searches: AtomicUsize::new(0),
        })
    }

    pub fn unavailable(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            distances: None,
            searches: AtomicUsize::new(0),
        })
    }

    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorStore for ScriptedStore {
    fn collection(&self) -> &str {
        &self.name
    }

    async fn count(&self) -> Result<u64, DomainError> {
        match &self.distances {
            Some(d) => Ok(d.len() as u64),
            None => Err(DomainError::store_unavailable("connection refused")),
        }
    }

    async fn upsert(&self, _: &[DocumentChunk], _: &[Embedding]) -> Result<(), DomainError> {
        Err(DomainError::store_unavailable("read only"))
    }

    async fn search(&self, _: &Embedding, top_k: usize) -> Result<Vec<SearchResult>, DomainError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        let distances = self
            .distances
            .as_ref()
            .ok_or_else(|| DomainError::store_unavailable("connection refused"))?;

        Ok(distances
            .iter()
            .take(top_k)
            .enumerate()
            .map(|(i, d)| SearchResult {
                chunk: DocumentChunk::new(&self.name, "", format!("{} evidence {i}", self.name), i),
                distance: *d,
            })
            .collect())
    }

    async fn retain_only(&self, _: &[Uuid]) -> Result<(), DomainError> {
        Ok(())
    }
}

/// Wraps a real provider and refuses to open the listed collections.
pub struct FlakyProvider<P> {
    pub inner: P,
    pub broken: Vec<String>,
}

#[async_trait]
impl<P: VectorStoreProvider> VectorStoreProvider for FlakyProvider<P> {
    async fn open(&self, collection: &str) -> Result<Arc<dyn VectorStore>, DomainError> {
        if self.broken.iter().any(|b| b == collection) {
            return Err(DomainError::store_unavailable(format!("{collection} unreachable")));
        }
        self.inner.open(collection).await
    }
}

/// Records every turn sequence it is asked to answer.
pub struct RecordingGenerator {
    answer: Result<String, String>,
    pub calls: Mutex<Vec<Vec<Message>>>,
}

impl RecordingGenerator {
    pub fn answering(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(answer.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Err(reason.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_turns(&self) -> Vec<Message> {
        self.calls.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl AnswerGenerator for RecordingGenerator {
    fn name(&self) -> &str {
        "recording"
    }

    async fn generate(&self, turns: &[Message]) -> Result<String, DomainError> {
        self.calls.lock().unwrap().push(turns.to_vec());
        self.answer.clone().map_err(DomainError::generation)
    }
}

/// History backend whose reads and/or writes fail.
#[derive(Default)]
pub struct BrokenHistory {
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub logs: Mutex<HashMap<String, Vec<InteractionLog>>>,
}

#[async_trait]
impl SessionHistory for BrokenHistory {
    async fn append(&self, interaction: NewInteraction) -> Result<InteractionLog, DomainError> {
        if self.fail_writes {
            return Err(DomainError::history_write("replica is read-only"));
        }
        let log = interaction.into_log(1, chrono::Utc::now());
        self.logs
            .lock()
            .unwrap()
            .entry(log.session_id.clone())
            .or_default()
            .push(log.clone());
        Ok(log)
    }

    async fn last_messages(&self, _: &str, _: usize) -> Result<Vec<InteractionLog>, DomainError> {
        if self.fail_reads {
            return Err(DomainError::history_read("timeout"));
        }
        Ok(Vec::new())
    }

    async fn recent(&self, _: usize) -> Result<Vec<InteractionLog>, DomainError> {
        Err(DomainError::history_read("timeout"))
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Err(DomainError::history_read("timeout"))
    }
}
