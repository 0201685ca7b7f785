//! API error type and status mapping.
//!
//! Every failure leaves the service as `{"error": "<message>"}`. Partial
//! upstream data is not an error; it is handled in the weather handler.

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use weathergate_core::error::AggregateError;

/// JSON error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Structured API error returned by handlers.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: message.into(),
            },
        }
    }

    /// 400 for missing or malformed input.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 405, kept JSON-shaped like every other error.
    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "invalid request method")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<AggregateError> for ApiError {
    fn from(err: AggregateError) -> Self {
        match &err {
            AggregateError::EmptyCity => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
            AggregateError::LocationNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, err.to_string())
            }
            AggregateError::LocationService(_) | AggregateError::Unavailable => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, err.to_string())
            }
            AggregateError::Internal(source) => {
                // Log the details server-side, return a generic message.
                tracing::error!(error = ?source, "unexpected aggregation failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        }
    }
}
