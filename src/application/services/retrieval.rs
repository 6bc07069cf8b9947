use futures::future::join_all;
use std::sync::Arc;
use tracing::instrument;

use super::vector_store_manager::StoreRegistry;
use crate::domain::{
    collection_name, ports::EmbeddingService, DocType, Embedding, EvidenceSet, Language,
};

pub const DEFAULT_TOP_K: usize = 4;

/// Picks the single collection whose hits sit closest to the question.
pub struct RetrievalRouter {
    registry: Arc<StoreRegistry>,
    embedding: Arc<dyn EmbeddingService>,
    top_k: usize,
}

impl RetrievalRouter {
    pub fn new(
        registry: Arc<StoreRegistry>,
        embedding: Arc<dyn EmbeddingService>,
        top_k: usize,
    ) -> Self {
        Self {
            registry,
            embedding,
            top_k,
        }
    }

    /// Collection names for a language, in name order.
    pub fn candidates(language: Language) -> Vec<String> {
        let mut names: Vec<String> = DocType::ALL
            .iter()
            .map(|doc_type| collection_name(*doc_type, language.code()))
            .collect();
        names.sort();
        names
    }

    /// Best evidence for the question, falling back to English collections
    /// when the requested language has none. `None` means nothing relevant
    /// was found anywhere, including when every store was unreachable.
    #[instrument(skip(self, question, language), fields(language = %language))]
    pub async fn retrieve(&self, question: &str, language: Language) -> Option<EvidenceSet> {
        let mut passes = vec![language];
        if language != Language::En {
            passes.push(Language::En);
        }

        let loaded = passes
            .iter()
            .flat_map(|l| Self::candidates(*l))
            .any(|name| self.registry.get(&name).is_some());
        if !loaded {
            tracing::debug!("no searchable collection for this language");
            return None;
        }

        let query = match self.embedding.embed(question).await {
            Ok(query) => query,
            Err(e) => {
                tracing::warn!(error = %e, "query embedding failed, treating stores as unavailable");
                return None;
            }
        };

        for pass in passes {
            if let Some(best) = self.best_for(&query, pass).await {
                if pass != language {
                    tracing::info!(source = %best.source_collection, "answered from english fallback");
                }
                return Some(best);
            }
        }
        None
    }

    /// Searches every loaded candidate of one language and keeps the winner.
    pub async fn best_for(&self, query: &Embedding, language: Language) -> Option<EvidenceSet> {
        let stores: Vec<_> = Self::candidates(language)
            .into_iter()
            .filter_map(|name| self.registry.get(&name).cloned())
            .collect();

        let searches = stores.iter().map(|store| async move {
            match store.search(query, self.top_k).await {
                Ok(results) => EvidenceSet::from_results(store.collection(), results),
                Err(e) => {
                    tracing::warn!(collection = store.collection(), error = %e, "search failed, skipping");
                    None
                }
            }
        });

        select_best(join_all(searches).await.into_iter().flatten())
    }
}

/// Lowest mean distance wins. Input order is the enumeration order, so on a
/// tie the earlier candidate stays. Non-finite scores never win.
pub fn select_best(candidates: impl IntoIterator<Item = EvidenceSet>) -> Option<EvidenceSet> {
    candidates
        .into_iter()
        .filter(|c| c.score.is_finite())
        .fold(None, |best: Option<EvidenceSet>, candidate| match best {
            Some(current) if current.score <= candidate.score => Some(current),
            _ => Some(candidate),
        })
}
