use crate::domain::{errors::DomainError, InteractionLog, NewInteraction};
use async_trait::async_trait;

/// Append-only log of interactions, keyed by session.
#[async_trait]
pub trait SessionHistory: Send + Sync {
    /// Stores the interaction with a server-assigned id and UTC timestamp.
    async fn append(&self, interaction: NewInteraction) -> Result<InteractionLog, DomainError>;
    /// The `limit` most recent interactions of a session, oldest first.
    async fn last_messages(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<InteractionLog>, DomainError>;
    /// The `limit` most recent interactions across all sessions, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<InteractionLog>, DomainError>;
    async fn ping(&self) -> Result<(), DomainError>;
}
