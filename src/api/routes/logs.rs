use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{
    error::ApiError,
    response::{success, Success},
    state::AppState,
};
use crate::domain::{DomainError, InteractionLog};

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LogEntry {
    pub id: i64,
    pub session_id: String,
    pub question: String,
    pub answer: String,
    pub ip_address: String,
    pub created_at: DateTime<Utc>,
}

impl From<InteractionLog> for LogEntry {
    fn from(log: InteractionLog) -> Self {
        Self {
            id: log.id,
            session_id: log.session_id,
            question: log.question,
            answer: log.answer,
            ip_address: log.client_ip,
            created_at: log.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LogsData {
    pub logs: Vec<LogEntry>,
}

/// Newest first across every session.
pub async fn list_logs(
    State(state): State<AppState>,
    query: Result<Query<LogsQuery>, QueryRejection>,
) -> Result<Json<Success<LogsData>>, ApiError> {
    let Query(query) = query.map_err(|e| DomainError::validation(e.body_text()))?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(DomainError::validation(format!("limit must be between 1 and {MAX_LIMIT}")).into());
    }

    let logs = state.history.recent(limit).await?;
    Ok(success(LogsData {
        logs: logs.into_iter().map(LogEntry::from).collect(),
    }))
}
