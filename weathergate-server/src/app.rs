//! HTTP application wiring.
//!
//! Builds the axum router and defines the shared state injected into
//! handlers. Route composition lives here to keep `main` small and testable.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use weathergate_core::aggregator::WeatherAggregator;

use crate::api;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<WeatherAggregator>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route(
            "/weather",
            post(api::weather::get_weather).fallback(api::method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
