use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::warn;

use crate::observability::REJECTED_BODIES_TOTAL;

/// Client errors raised before the store is touched.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid JSON document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
    #[error("expected a JSON object of key -> document, got {0}")]
    NotAnObject(&'static str),
    #[error("document keys must not be empty")]
    EmptyKey,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidDocument(_) | ApiError::NotAnObject(_) | ApiError::EmptyKey => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = self.to_string();
        REJECTED_BODIES_TOTAL.inc();
        warn!(status = status.as_u16(), error = %msg, "request body rejected");
        (status, Json(serde_json::json!({"error": msg}))).into_response()
    }
}
