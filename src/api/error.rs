use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::domain::DomainError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Validation failed: {0}")]
    InvalidBody(String),

    #[error("Endpoint not found")]
    RouteNotFound,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::Domain(err) => match err {
                DomainError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                DomainError::NotFound(_) => StatusCode::NOT_FOUND,
                DomainError::Generation(_) | DomainError::ExternalService(_) => {
                    StatusCode::BAD_GATEWAY
                }
                DomainError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                DomainError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Domain(DomainError::Internal(_)) | Self::Domain(DomainError::HistoryRead(_)) => {
                "An unexpected error occurred. Please try again later.".to_string()
            }
            Self::Domain(DomainError::HistoryWrite(_)) => {
                "The interaction could not be saved. Please try again later.".to_string()
            }
            other => other.to_string(),
        }
    }
}

#[derive(Serialize, Debug)]
struct ErrorBody {
    code: u16,
    message: String,
}

#[derive(Serialize, Debug)]
struct ErrorResponse {
    status: &'static str,
    error: ErrorBody,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        }

        let body = ErrorResponse {
            status: "error",
            error: ErrorBody {
                code: status.as_u16(),
                message: self.public_message(),
            },
        };
        (status, Json(body)).into_response()
    }
}
