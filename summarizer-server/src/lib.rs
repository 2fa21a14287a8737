//! Clinical Summarizer Server - HTTP API over the clinical NLP core
//!
//! This library provides the axum router, handlers and error mapping of the
//! summarizer HTTP server. All classification happens in `clinical-nlp`.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod server;

// Re-export commonly used types
pub use error::*;
pub use server::{AppState, ServerConfig, DEFAULT_ALLOWED_ORIGINS};

use axum::{middleware::from_fn, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the main application router with all routes and middleware
pub fn create_app(state: AppState, config: &ServerConfig) -> Router {
    routes::create_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::create_cors_layer(&config.allowed_origins))
                .layer(from_fn(middleware::request_timing_middleware)),
        )
        .with_state(state)
}
