use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    ports::SessionHistory, DomainError, InteractionLog, NewInteraction, DEFAULT_WINDOW,
};

/// Conversation memory over a [`SessionHistory`] backend.
///
/// Reads degrade to an empty window; writes always surface their errors.
pub struct SessionHistoryService {
    store: Arc<dyn SessionHistory>,
    window: usize,
}

impl SessionHistoryService {
    pub fn new(store: Arc<dyn SessionHistory>, window: usize) -> Self {
        Self { store, window }
    }

    pub fn with_default_window(store: Arc<dyn SessionHistory>) -> Self {
        Self::new(store, DEFAULT_WINDOW)
    }

    /// The configured window for a session.
    pub async fn conversation_window(&self, session_id: &str) -> Vec<InteractionLog> {
        self.last_messages(session_id, self.window).await
    }

    /// At most `limit` interactions, oldest first. Backend errors yield an
    /// empty window.
    #[instrument(skip(self))]
    pub async fn last_messages(&self, session_id: &str, limit: usize) -> Vec<InteractionLog> {
        match self.store.last_messages(session_id, limit).await {
            Ok(mut logs) => {
                if logs.len() > limit {
                    logs.drain(..logs.len() - limit);
                }
                logs
            }
            Err(e) => {
                tracing::warn!(error = %e, "history read failed, continuing without memory");
                Vec::new()
            }
        }
    }

    #[instrument(skip(self, question, answer))]
    pub async fn append_interaction(
        &self,
        session_id: &str,
        question: &str,
        answer: &str,
        client_ip: &str,
    ) -> Result<InteractionLog, DomainError> {
        self.store
            .append(NewInteraction::new(session_id, question, answer, client_ip))
            .await
            .inspect_err(|e| tracing::error!(error = %e, "failed to persist interaction"))
    }

    /// Newest first across all sessions.
    pub async fn recent(&self, limit: usize) -> Result<Vec<InteractionLog>, DomainError> {
        self.store.recent(limit).await
    }

    pub async fn ping(&self) -> Result<(), DomainError> {
        self.store.ping().await
    }
}
