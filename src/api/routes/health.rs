use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use serde_json::json;

use crate::api::{
    response::{success, Success},
    state::AppState,
};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub collections: Vec<String>,
    pub history: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Ready once at least one collection is searchable and history answers.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let history_status = match state.history.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "history backend unreachable");
            "disconnected"
        }
    };

    let collections = state.registry.names();
    let is_ready = !collections.is_empty() && history_status == "connected";

    let response = ReadinessResponse {
        status: if is_ready { "ready" } else { "not_ready" }.into(),
        collections,
        history: history_status.into(),
    };

    let code = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(response))
}

pub async fn status() -> Json<Success<serde_json::Value>> {
    success(json!({ "status": "ok" }))
}
