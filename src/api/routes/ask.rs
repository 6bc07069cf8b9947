use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, FromRequestParts, State},
    http::request::Parts,
    Json,
};
use serde::Deserialize;
use std::convert::Infallible;
use std::net::SocketAddr;

use crate::api::{
    error::ApiError,
    response::{success, Success},
    state::AppState,
};
use crate::application::{AskOutcome, AskRequest};

#[derive(Debug, Deserialize)]
pub struct AskBody {
    pub question: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Caller address: first `X-Forwarded-For` entry, else the socket peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty());

        if let Some(ip) = forwarded {
            return Ok(Self(ip.to_string()));
        }

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Ok(Self(peer.unwrap_or_else(|| "unknown".to_string())))
    }
}

pub async fn ask_handler(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    body: Result<Json<AskBody>, JsonRejection>,
) -> Result<Json<Success<AskOutcome>>, ApiError> {
    let Json(body) = body?;

    let outcome = state
        .ask
        .ask(AskRequest {
            question: body.question,
            session_id: body.session_id,
            language: body.language,
            client_ip,
        })
        .await?;

    Ok(success(outcome))
}
