//! HTTP API handlers.

pub mod error;
pub mod weather;

use axum::Json;
use serde::Serialize;

use error::ApiError;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

/// Liveness probe.
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ok" })
}

/// JSON-shaped 405 for anything but POST on the weather route.
pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}
