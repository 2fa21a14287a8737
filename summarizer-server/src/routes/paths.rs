//! API route path constants
//!
//! utoipa `#[path(...)]` attributes need string literals, so the paths in
//! handler attributes must match these constants exactly.

/// API base paths
pub const API_V1: &str = "/api/v1";

/// OpenAPI document
pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";

/// Health check endpoints
pub mod health {
    pub const HEALTH: &str = "/health";
}

/// Summarization endpoints
pub mod summarization {
    pub const SUMMARIZE: &str = "/summarize";
}
