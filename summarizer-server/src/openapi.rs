use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

use crate::routes::paths;
use crate::server::AppState;

/// Main OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::summarization::summarize_case,
    ),
    components(
        schemas(
            crate::handlers::health::HealthResponse,
            crate::handlers::summarization::SummarizeRequest,
            crate::handlers::summarization::SummarizeResponse,
            crate::handlers::summarization::SummaryBody,
            crate::handlers::summarization::SummaryMetadata,
            crate::handlers::summarization::TierCountsBody,
            crate::error::ApiErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Service health endpoints"),
        (name = "summarization", description = "Clinical note risk classification and summarization"),
    ),
    info(
        title = "Clinical Summarizer API",
        version = "1.0.0",
        description = "Classifies risk terms in free-text clinical notes and derives a structured case summary.",
    ),
)]
pub struct ApiDoc;

/// Create OpenAPI documentation routes
pub fn create_docs_routes() -> Router<AppState> {
    Router::new().route(
        paths::OPENAPI_JSON,
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}
