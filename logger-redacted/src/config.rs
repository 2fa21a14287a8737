// Logger configuration
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Redact identifiers from note previews
    pub redaction_enabled: bool,
    /// Hash redacted values so repeated occurrences can be correlated
    pub hash_for_correlation: bool,
    /// Maximum characters of note text quoted in a log line
    pub preview_chars: usize,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
            redaction_enabled: true,
            hash_for_correlation: false,
            preview_chars: 80,
        }
    }
}

impl LoggerConfig {
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}
