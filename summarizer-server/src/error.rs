use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use error_common::SummarizerError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Standard API error response structure
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Error type/code
    pub error_type: String,
    /// Human-readable error message
    pub message: String,
    /// Case the failure belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_id: Option<String>,
    /// Field-specific validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<HashMap<String, Vec<String>>>,
    /// Timestamp when error occurred
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Suggested actions for resolving the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

/// Main API error enum
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field_errors: Option<HashMap<String, Vec<String>>>,
    },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Unprocessable entity: {message}")]
    UnprocessableEntity { message: String },

    #[error("Failed to summarize case: {message}")]
    Summarization { case_id: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl ApiError {
    /// Create a simple validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    pub fn summarization(case_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Summarization {
            case_id: case_id.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Summarization { .. }
            | ApiError::Configuration { .. }
            | ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation_error",
            ApiError::BadRequest { .. } => "bad_request",
            ApiError::UnprocessableEntity { .. } => "unprocessable_entity",
            ApiError::Summarization { .. } => "summarization_failed",
            ApiError::Configuration { .. } => "configuration_error",
            ApiError::Internal { .. } => "internal_error",
        }
    }

    /// Get suggested actions for resolving the error
    pub fn suggestions(&self) -> Option<Vec<String>> {
        match self {
            ApiError::Validation { .. } | ApiError::UnprocessableEntity { .. } => Some(vec![
                "Ensure caseId, clinicalNotes, patientAge and gender are all provided".to_string(),
                "Send every field as a JSON string".to_string(),
            ]),
            ApiError::BadRequest { .. } => Some(vec![
                "Check that the request body is valid JSON".to_string(),
                "Set the Content-Type header to application/json".to_string(),
            ]),
            ApiError::Summarization { .. } => Some(vec![
                "Retry the request".to_string(),
                "Contact support if the issue persists".to_string(),
            ]),
            _ => None,
        }
    }

    fn case_id(&self) -> Option<String> {
        match self {
            ApiError::Summarization { case_id, .. } => Some(case_id.clone()),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();
        let status_code = self.status_code();

        // Log the error with correlation ID
        error!(
            error_id = %error_id,
            error_type = %self.error_type(),
            status_code = %status_code.as_u16(),
            case_id = self.case_id().as_deref().unwrap_or("-"),
            error = %self,
            "API error occurred"
        );

        let field_errors = match &self {
            ApiError::Validation { field_errors, .. } => field_errors.clone(),
            _ => None,
        };

        let error_response = ApiErrorResponse {
            error_id,
            error_type: self.error_type().to_string(),
            message: self.to_string(),
            case_id: self.case_id(),
            field_errors,
            timestamp: chrono::Utc::now(),
            suggestions: self.suggestions(),
        };

        (status_code, Json(error_response)).into_response()
    }
}

/// Convert core errors to API errors
impl From<SummarizerError> for ApiError {
    fn from(error: SummarizerError) -> Self {
        match error {
            SummarizerError::CaseFailed { case_id, message } => {
                ApiError::Summarization { case_id, message }
            }
            SummarizerError::ValidationError(message) => ApiError::validation(message),
            SummarizerError::ConfigError(message) | SummarizerError::CatalogError(message) => {
                ApiError::Configuration { message }
            }
            other => ApiError::internal(other.to_string()),
        }
    }
}

/// Convert body extraction failures to API errors
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        match rejection {
            JsonRejection::JsonDataError(_) => ApiError::UnprocessableEntity { message },
            _ => ApiError::BadRequest { message },
        }
    }
}

/// Convert anyhow errors to API errors
impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        ApiError::Internal {
            message: error.to_string(),
        }
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_failure_maps_to_server_error() {
        let err: ApiError = SummarizerError::case_failed("case-3", "task panicked").into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to summarize case: task panicked");
        assert_eq!(err.case_id().as_deref(), Some("case-3"));
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err: ApiError = SummarizerError::ValidationError("empty".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_type(), "validation_error");
        assert!(err.suggestions().is_some());
    }

    #[test]
    fn test_catalog_failure_is_configuration_error() {
        let err: ApiError = SummarizerError::CatalogError("bad yaml".to_string()).into();
        assert_eq!(err.error_type(), "configuration_error");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
