//! Logging for the clinical summarizer with PHI/PII redaction
//!
//! Clinical notes are protected health information. This crate installs the
//! process-wide `tracing` subscriber and provides [`RedactedLogger`], which
//! callers use to build short, redacted previews of note text before quoting
//! it in a log line.
//!
//! # Detected Data Types
//!
//! - **Email Addresses**: `jane@example.com` → `***@***`
//! - **Phone Numbers**: `(555) 123-4567` → `(***) ***-****`
//! - **SSN**: `123-45-6789` → `***-**-****`
//! - **Medical Record Numbers**: `MRN 123456` → `MRN[REDACTED]`
//! - **Dates**: `04/12/1951` → `**/**/****`
//!
//! # Example
//!
//! ```rust,no_run
//! use logger_redacted::{LoggerConfig, RedactedLogger};
//!
//! let logger = RedactedLogger::init(&LoggerConfig::default().with_level("debug"))?;
//! tracing::info!(note = %logger.preview("Pt MRN 448812 reports chest pain"), "Note received");
//! // note="Pt MRN[REDACTED] reports chest pain"
//! # Ok::<(), logger_redacted::LoggerError>(())
//! ```

pub mod config;
pub mod redactor;

pub use config::*;
pub use redactor::*;

use thiserror::Error;
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log filter '{directive}': {message}")]
    InvalidFilter { directive: String, message: String },

    #[error("Tracing subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

/// Redacting front-end for log lines that quote note text
#[derive(Debug, Clone)]
pub struct RedactedLogger {
    redactor: PiiRedactor,
    preview_chars: usize,
}

impl RedactedLogger {
    /// Build without touching the global subscriber
    pub fn new(config: &LoggerConfig) -> Self {
        let enabled = config.redaction_enabled;
        Self {
            redactor: PiiRedactor::new(RedactionConfig {
                redact_emails: enabled,
                redact_phones: enabled,
                redact_ssn: enabled,
                redact_mrn: enabled,
                redact_dates: enabled,
                hash_for_correlation: config.hash_for_correlation,
            }),
            preview_chars: config.preview_chars,
        }
    }

    /// Install the global subscriber and return the logger
    ///
    /// `RUST_LOG` wins over `config.log_level` when set.
    pub fn init(config: &LoggerConfig) -> Result<Self, LoggerError> {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(&config.log_level).map_err(|e| {
                LoggerError::InvalidFilter {
                    directive: config.log_level.clone(),
                    message: e.to_string(),
                }
            })?,
        };

        let installed = if config.json {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_ansi(false)
                        .json(),
                )
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_names(true)
                        .with_timer(ChronoUtc::rfc_3339()),
                )
                .try_init()
        };
        installed.map_err(|e| LoggerError::AlreadyInitialized(e.to_string()))?;

        Ok(Self::new(config))
    }

    /// Redacted, truncated view of `text` safe to put in a log field
    pub fn preview(&self, text: &str) -> String {
        self.redactor.preview(text, self.preview_chars)
    }
}
