use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use common::types::ErrorBody;
use service::ServiceError;

/// Error answered as `{"error": ..., "message": ...}` with the given status.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &str, message: Option<String>) -> Self {
        Self { status, body: ErrorBody { error: error.to_string(), message } }
    }

    pub fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", Some(format!("{what} not found")))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(r: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_body", Some(r.body_text()))
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(_) | ServiceError::Model(_) => {
                Self::new(StatusCode::BAD_REQUEST, "validation", Some(e.to_string()))
            }
            ServiceError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "not_found", Some(e.to_string())),
            ServiceError::Conflict(_) => Self::new(StatusCode::CONFLICT, "conflict", Some(e.to_string())),
            other => {
                error!(err = %other, "store operation failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", Some(other.to_string()))
            }
        }
    }
}
