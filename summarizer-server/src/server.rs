use clinical_nlp::{EngineConfig, NlpResult, SummarizationService};
use logger_redacted::{LoggerConfig, RedactedLogger};
use std::sync::Arc;

/// Origins allowed to call the API when none are configured
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:8080"];

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    /// Summarization pipeline, built once at startup
    pub service: Arc<SummarizationService>,
    /// Redacts note text quoted in request logs
    pub logger: RedactedLogger,
}

impl AppState {
    pub fn new(service: SummarizationService, logger: RedactedLogger) -> Self {
        Self {
            service: Arc::new(service),
            logger,
        }
    }

    /// State for an engine configuration, without installing a subscriber
    pub fn from_config(engine: &EngineConfig, logging: &LoggerConfig) -> NlpResult<Self> {
        Ok(Self::new(
            SummarizationService::from_config(engine)?,
            RedactedLogger::new(logging),
        ))
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    pub port: u16,
    /// Origins allowed by the CORS layer
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.map(String::from).to_vec(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
