use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use clinical_nlp::EngineConfig;
use error_common::{log_error, Result, SummarizerError};
use logger_redacted::{LoggerConfig, RedactedLogger};
use summarizer_server::{create_app, AppState, ServerConfig, DEFAULT_ALLOWED_ORIGINS};

/// Clinical Summarizer HTTP Server
#[derive(Parser, Debug)]
#[command(name = "summarizer-server")]
#[command(about = "Risk-term classification and summarization API for clinical notes")]
struct Args {
    /// Server bind address
    #[arg(long, env = "SUMMARIZER_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(short, long, env = "SUMMARIZER_PORT", default_value = "8000")]
    port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON log lines
    #[arg(long, env = "SUMMARIZER_JSON_LOGS")]
    json_logs: bool,

    /// Comma-separated origins allowed by CORS
    #[arg(
        long,
        env = "SUMMARIZER_ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_values_t = DEFAULT_ALLOWED_ORIGINS.map(String::from)
    )]
    allowed_origins: Vec<String>,
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            allowed_origins: self.allowed_origins.clone(),
        }
    }

    fn logger_config(&self) -> LoggerConfig {
        let level = if self.verbose {
            "summarizer_server=debug,clinical_nlp=debug,tower_http=debug"
        } else {
            "summarizer_server=info,clinical_nlp=info,tower_http=info"
        };
        LoggerConfig::default()
            .with_level(level)
            .with_json(self.json_logs)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is not an error
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let logging = args.logger_config();
    let logger = RedactedLogger::init(&logging).context("Failed to initialise logging")?;

    run(&args, logger).await.inspect_err(|err| log_error("server", err))
}

async fn run(args: &Args, logger: RedactedLogger) -> Result<()> {
    let config = args.server_config();
    info!(version = env!("CARGO_PKG_VERSION"), "Starting Clinical Summarizer server");
    info!(bind = %config.bind_address(), "Bind address");

    let engine = EngineConfig::from_env()?;
    let state = AppState::new(
        clinical_nlp::SummarizationService::from_config(&engine)?,
        logger,
    );
    let app = create_app(state, &config);

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .map_err(|e| {
            SummarizerError::NetworkError(format!(
                "Failed to bind to {}: {}",
                config.bind_address(),
                e
            ))
        })?;

    info!(
        "Clinical NLP Service started on http://{}",
        config.bind_address()
    );
    info!(
        "Health check available at: http://{}/api/v1/health",
        config.bind_address()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| SummarizerError::ServerError(format!("HTTP server error: {}", e)))?;

    info!("Clinical NLP Service shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
