use async_trait::async_trait;
use chrono::Utc;
use deadpool_redis::redis::{self, AsyncCommands};

use crate::domain::{ports::SessionHistory, DomainError, InteractionLog, NewInteraction};
use crate::infrastructure::redis::{keys, RedisPool};

/// Interaction log kept in Redis lists.
///
/// Each interaction is appended to its session list (chronological) and
/// pushed onto a global list (newest first). Ids come from an `INCR` counter.
#[derive(Clone)]
pub struct RedisSessionHistory {
    pool: RedisPool,
}

impl RedisSessionHistory {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    async fn conn(
        &self,
        to_err: fn(String) -> DomainError,
    ) -> Result<deadpool_redis::Connection, DomainError> {
        self.pool
            .get()
            .await
            .map_err(|e| to_err(format!("Redis pool error: {e}")))
    }

    fn decode(
        raw: Vec<String>,
        to_err: fn(String) -> DomainError,
    ) -> Result<Vec<InteractionLog>, DomainError> {
        raw.iter()
            .map(|json| serde_json::from_str(json).map_err(|e| to_err(e.to_string())))
            .collect()
    }
}

#[async_trait]
impl SessionHistory for RedisSessionHistory {
    async fn append(&self, interaction: NewInteraction) -> Result<InteractionLog, DomainError> {
        let mut conn = self.conn(DomainError::HistoryWrite).await?;

        let id: i64 = conn
            .incr(keys::INTERACTION_SEQ, 1)
            .await
            .map_err(|e| DomainError::history_write(e.to_string()))?;

        let log = interaction.into_log(id, Utc::now());
        let json =
            serde_json::to_string(&log).map_err(|e| DomainError::history_write(e.to_string()))?;

        redis::pipe()
            .atomic()
            .rpush(keys::session(&log.session_id), &json)
            .ignore()
            .lpush(keys::INTERACTION_LOG, &json)
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| DomainError::history_write(e.to_string()))?;

        tracing::debug!(id, session_id = %log.session_id, "interaction stored");
        Ok(log)
    }

    async fn last_messages(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<InteractionLog>, DomainError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut conn = self.conn(DomainError::HistoryRead).await?;
        let start = -(limit as isize);
        let raw: Vec<String> = conn
            .lrange(keys::session(session_id), start, -1)
            .await
            .map_err(|e| DomainError::history_read(e.to_string()))?;

        Self::decode(raw, DomainError::HistoryRead)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<InteractionLog>, DomainError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut conn = self.conn(DomainError::HistoryRead).await?;
        let raw: Vec<String> = conn
            .lrange(keys::INTERACTION_LOG, 0, limit as isize - 1)
            .await
            .map_err(|e| DomainError::history_read(e.to_string()))?;

        Self::decode(raw, DomainError::HistoryRead)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        let mut conn = self.conn(DomainError::HistoryRead).await?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| DomainError::history_read(e.to_string()))
    }
}
