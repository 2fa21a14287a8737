use crate::codes;
use crate::context::ErrorContext;
use thiserror::Error;

/// Workspace-wide error enum
#[derive(Error, Debug)]
pub enum SummarizerError {
    /// Request failed validation before reaching the core
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Keyword or diagnostic-code catalog could not be built
    #[error("Catalog error: {0}")]
    CatalogError(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Summarization of one case failed as a whole
    #[error("Failed to summarize case {case_id}: {message}")]
    CaseFailed { case_id: String, message: String },

    /// Server lifecycle errors
    #[error("Server error: {0}")]
    ServerError(String),

    /// Network communication errors
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Internal system errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for summarizer operations
pub type Result<T> = std::result::Result<T, SummarizerError>;

impl SummarizerError {
    pub fn case_failed(case_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CaseFailed {
            case_id: case_id.into(),
            message: message.into(),
        }
    }

    /// Case identifier, when the error belongs to a single request
    pub fn case_id(&self) -> Option<&str> {
        match self {
            Self::CaseFailed { case_id, .. } => Some(case_id),
            _ => None,
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::ValidationError(_) => codes::validation::INVALID_INPUT,
            Self::CatalogError(_) => codes::catalog::LOAD_FAILED,
            Self::ConfigError(_) => codes::configuration::INVALID_SETTING,
            Self::CaseFailed { .. } => codes::processing::CASE_FAILED,
            Self::ServerError(_) => codes::transport::SERVER,
            Self::NetworkError(_) => codes::transport::NETWORK,
            Self::InternalError(_) | Self::Other(_) => codes::processing::INTERNAL,
        }
    }

    /// Short machine-readable category
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::ValidationError(_) => "validation_error",
            Self::CatalogError(_) => "catalog_error",
            Self::ConfigError(_) => "configuration_error",
            Self::CaseFailed { .. } => "case_failed",
            Self::ServerError(_) => "server_error",
            Self::NetworkError(_) => "network_error",
            Self::InternalError(_) | Self::Other(_) => "internal_error",
        }
    }
}

/// Log an error with its code and category
pub fn log_error(context: &str, error: &SummarizerError) {
    tracing::error!(
        context = context,
        error_code = error.code(),
        error_type = error.error_type(),
        case_id = error.case_id().unwrap_or("-"),
        error = %error,
        "Summarizer error occurred"
    );
}

/// Log an error together with its request context
pub fn log_error_with_context(error: &SummarizerError, context: &ErrorContext) {
    let case_id = context
        .case_id
        .as_deref()
        .or_else(|| error.case_id())
        .unwrap_or("-");
    tracing::error!(
        case_id = case_id,
        request_id = context.request_id.as_deref().unwrap_or("-"),
        additional = ?context.additional,
        error_code = error.code(),
        error_type = error.error_type(),
        error = %error,
        "Summarizer error occurred"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_failed_carries_case_id() {
        let err = SummarizerError::case_failed("case-1", "boom");
        assert_eq!(err.case_id(), Some("case-1"));
        assert_eq!(err.to_string(), "Failed to summarize case case-1: boom");
        assert_eq!(err.error_type(), "case_failed");
    }

    #[test]
    fn test_other_errors_have_no_case_id() {
        let err = SummarizerError::ConfigError("bad port".to_string());
        assert_eq!(err.case_id(), None);
        assert_eq!(err.code(), codes::configuration::INVALID_SETTING);
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: SummarizerError = anyhow::anyhow!("socket closed").into();
        assert_eq!(err.code(), codes::processing::INTERNAL);
        assert_eq!(err.to_string(), "socket closed");
    }
}
