//! The weather aggregation endpoint.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use weathergate_core::aggregator::Completeness;

use crate::api::error::ApiError;
use crate::app::AppState;

/// Request body for `POST /weather`.
#[derive(Debug, Deserialize)]
pub struct CityQuery {
    pub city: Option<String>,
}

/// Handle `POST /weather`.
///
/// 200 when both upstream sources answered, 206 when exactly one did.
/// Everything else maps through [`ApiError`].
pub async fn get_weather(
    State(state): State<AppState>,
    payload: Result<Json<CityQuery>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(query) = payload.map_err(|rejection| {
        tracing::debug!(%rejection, "rejected weather request body");
        ApiError::validation("invalid JSON body")
    })?;

    let city = query
        .city
        .ok_or_else(|| ApiError::validation("city is required"))?;

    let outcome = state.aggregator.assemble(&city).await?;

    let status = match outcome.completeness {
        Completeness::Full => StatusCode::OK,
        Completeness::Partial => StatusCode::PARTIAL_CONTENT,
    };

    Ok((status, Json(outcome.payload)).into_response())
}
