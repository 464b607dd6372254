//! services/api/src/web/error.rs
//!
//! Translates the core error taxonomy into HTTP responses, 1:1.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use docuflow_core::ports::ServiceError;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// The JSON body every error response carries.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// The error type handlers return. Wraps a domain error, plus the one
/// transport-only case (401) the core has no notion of.
#[derive(Debug)]
pub enum WebError {
    Service(ServiceError),
    Unauthorized(String),
}

impl From<ServiceError> for WebError {
    fn from(e: ServiceError) -> Self {
        WebError::Service(e)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            WebError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            WebError::Service(e) => match e {
                ServiceError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
                ServiceError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
                ServiceError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
                ServiceError::Conflict(msg) => (StatusCode::CONFLICT, msg),
                // Processor errors surface to the caller as bad requests so
                // it can re-initiate; they are never retried server-side.
                ServiceError::Processor(msg) => (
                    StatusCode::BAD_REQUEST,
                    format!("payment processor error: {}", msg),
                ),
                ServiceError::Unexpected(msg) => {
                    error!("unexpected service error: {}", msg);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error".to_string(),
                    )
                }
            },
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
