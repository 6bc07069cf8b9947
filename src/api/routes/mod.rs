pub mod ask;
pub mod health;
pub mod logs;

use axum::http::{header, Method};
use axum::{middleware, routing::get, routing::post, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{error::ApiError, middleware::request_logger, state::AppState};

pub fn create_router(state: AppState) -> Router {
    let cors = build_cors(&state.config.cors.allowed_origins);
    let expose_logs = state.config.api.expose_logs;

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api/v1", api_v1_routes(expose_logs))
        .fallback(|| async { ApiError::RouteNotFound })
        .layer(middleware::from_fn(request_logger))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}

fn api_v1_routes(expose_logs: bool) -> Router<AppState> {
    let router = Router::new()
        .route("/ask", post(ask::ask_handler))
        .route("/status", get(health::status));

    if expose_logs {
        router.route("/logs", get(logs::list_logs))
    } else {
        router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::testing::{LetterEmbedding, RecordingGenerator, ScriptedStore};
    use crate::application::StoreRegistry;
    use crate::domain::{ports::VectorStore, FALLBACK_ANSWER};
    use crate::infrastructure::{AppConfig, InMemorySessionHistory};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(stores: Vec<Arc<ScriptedStore>>, expose_logs: bool) -> Router {
        let mut config = AppConfig::default();
        config.api.expose_logs = expose_logs;
        let registry = StoreRegistry::new(stores.into_iter().map(|s| s as Arc<dyn VectorStore>));

        create_router(AppState::new(
            config,
            registry,
            Arc::new(InMemorySessionHistory::new()),
            Arc::new(LetterEmbedding),
            RecordingGenerator::answering("Ten years of distributed systems."),
        ))
    }

    fn post_ask(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/ask")
            .header("content-type", "application/json")
            .header("x-forwarded-for", "198.51.100.7, 10.0.0.1")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ask_returns_answer_envelope() {
        let app = app(vec![ScriptedStore::hits("cv_en_embeddings", &[0.2])], false);

        let response = app
            .oneshot(post_ask(json!({"question": "Experience?", "session_id": "abc", "language": "en"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["answer"], "Ten years of distributed systems.");
        assert_eq!(body["data"]["session_id"], "abc");
        assert_eq!(body["data"]["language"], "en");
        assert_eq!(body["data"]["source"], "cv_en_embeddings");
    }

    #[tokio::test]
    async fn test_ask_without_evidence_uses_fallback() {
        let app = app(Vec::new(), false);

        let response = app.oneshot(post_ask(json!({"question": "Hobbies?"}))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["answer"], FALLBACK_ANSWER);
        assert_eq!(body["data"]["source"], Value::Null);
        assert!(body["data"]["session_id"].as_str().is_some_and(|s| !s.is_empty()));
    }

    #[tokio::test]
    async fn test_blank_question_is_422() {
        let app = app(Vec::new(), false);

        let response = app.oneshot(post_ask(json!({"question": "  "}))).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"]["code"], 422);
    }

    #[tokio::test]
    async fn test_malformed_body_is_422_envelope() {
        let app = app(Vec::new(), false);

        let response = app.oneshot(post_ask(json!({"prompt": "missing question"}))).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(response).await["status"], "error");
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let response = app(Vec::new(), false).oneshot(get("/api/v1/status")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"status": "success", "data": {"status": "ok"}}));
    }

    #[tokio::test]
    async fn test_logs_hidden_unless_exposed() {
        let response = app(Vec::new(), false).oneshot(get("/api/v1/logs")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"]["message"], "Endpoint not found");
    }

    #[tokio::test]
    async fn test_logs_list_newest_first_with_client_ip() {
        let app = app(Vec::new(), true);

        for q in ["first?", "second?"] {
            let response = app.clone().oneshot(post_ask(json!({"question": q}))).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app.oneshot(get("/api/v1/logs?limit=10")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let logs = body["data"]["logs"].as_array().unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0]["question"], "second?");
        assert_eq!(logs[0]["ip_address"], "198.51.100.7");
    }

    #[tokio::test]
    async fn test_logs_limit_out_of_range() {
        let response = app(Vec::new(), true).oneshot(get("/api/v1/logs?limit=500")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_ready_requires_collections() {
        let response = app(Vec::new(), false).oneshot(get("/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app(vec![ScriptedStore::hits("faq_en_embeddings", &[0.3])], false)
            .oneshot(get("/ready"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["collections"], json!(["faq_en_embeddings"]));
    }
}
