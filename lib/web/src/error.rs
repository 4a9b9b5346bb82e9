use crate::backend::BackendError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use graphdesk_prefixes::PrefixStoreError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    AlreadyExists(String),
    #[error("storage failure: {0}")]
    Storage(String),
    #[error("{0}")]
    Upstream(String),
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::AlreadyExists(_) => StatusCode::CONFLICT,
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        // Every failure surfaces as a structured payload.
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<PrefixStoreError> for ApiError {
    fn from(error: PrefixStoreError) -> Self {
        match error {
            error @ PrefixStoreError::AlreadyExists(_) => Self::AlreadyExists(error.to_string()),
            error @ PrefixStoreError::NotFound(_) => Self::NotFound(error.to_string()),
            error => Self::Storage(error.to_string()),
        }
    }
}

impl From<BackendError> for ApiError {
    fn from(error: BackendError) -> Self {
        match error {
            error @ BackendError::GraphNotFound(_) => Self::NotFound(error.to_string()),
            // Engine failures are passed through verbatim.
            BackendError::Upstream(message) => Self::Upstream(message),
        }
    }
}
