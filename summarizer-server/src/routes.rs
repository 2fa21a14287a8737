pub mod paths;

use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    handlers::{health, summarization},
    openapi,
    server::AppState,
};

/// Create health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route(paths::health::HEALTH, get(health::health_check))
}

/// Create summarization routes
pub fn summarization_routes() -> Router<AppState> {
    Router::new().route(
        paths::summarization::SUMMARIZE,
        post(summarization::summarize_case),
    )
}

/// API v1 routes
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .merge(summarization_routes())
}

/// Create all routes
pub fn create_routes() -> Router<AppState> {
    Router::new()
        // API documentation routes
        .merge(openapi::create_docs_routes())
        .nest(paths::API_V1, api_v1_routes())
}
