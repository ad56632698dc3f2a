//! The API error taxonomy and its mapping onto HTTP responses.
//!
//! Every rejection produces a structured `{"error": ...}` payload. Business
//! failures keep their message; `Internal` always renders a generic message,
//! with diagnostic detail attached only in non-production (debug) builds.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use facture_auth::AuthError;
use facture_policy::PolicyError;
use facture_storage::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{} not found", what))
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => Self::NotFound("Not found".into()),
            StoreError::AlreadyExists => Self::Conflict("Already exists".into()),
            StoreError::Backend(detail) => Self::Internal(detail),
        }
    }
}

impl From<PolicyError> for ApiError {
    fn from(e: PolicyError) -> Self {
        match e {
            PolicyError::Forbidden(msg) => Self::Forbidden(msg.into()),
            PolicyError::Validation(msg) => Self::Validation(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                json!({"error": "Not authenticated"}),
            ),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({"error": msg})),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, json!({"error": msg})),
            // Conflicts surface as rejected input, like the rest of the
            // malformed-request family.
            Self::Validation(msg) | Self::Conflict(msg) => {
                (StatusCode::BAD_REQUEST, json!({"error": msg}))
            }
            Self::Internal(detail) => {
                tracing::error!(%detail, "internal server error");
                let body = if cfg!(debug_assertions) {
                    json!({"error": "Internal server error", "detail": detail})
                } else {
                    json!({"error": "Internal server error"})
                };
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        };
        (status, Json(body)).into_response()
    }
}
