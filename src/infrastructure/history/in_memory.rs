use async_trait::async_trait;
use chrono::Utc;
use std::sync::RwLock;

use crate::domain::{ports::SessionHistory, DomainError, InteractionLog, NewInteraction};

/// Process-local interaction log in insertion order.
#[derive(Default)]
pub struct InMemorySessionHistory {
    logs: RwLock<Vec<InteractionLog>>,
}

impl InMemorySessionHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionHistory for InMemorySessionHistory {
    async fn append(&self, interaction: NewInteraction) -> Result<InteractionLog, DomainError> {
        let mut logs = self
            .logs
            .write()
            .map_err(|e| DomainError::history_write(e.to_string()))?;

        let log = interaction.into_log(logs.len() as i64 + 1, Utc::now());
        logs.push(log.clone());
        Ok(log)
    }

    async fn last_messages(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<InteractionLog>, DomainError> {
        let logs = self
            .logs
            .read()
            .map_err(|e| DomainError::history_read(e.to_string()))?;

        let mut window: Vec<InteractionLog> = logs
            .iter()
            .rev()
            .filter(|log| log.session_id == session_id)
            .take(limit)
            .cloned()
            .collect();
        window.reverse();
        Ok(window)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<InteractionLog>, DomainError> {
        let logs = self
            .logs
            .read()
            .map_err(|e| DomainError::history_read(e.to_string()))?;
        Ok(logs.iter().rev().take(limit).cloned().collect())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
