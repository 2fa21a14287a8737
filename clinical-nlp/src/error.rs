use error_common::SummarizerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NlpError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Catalog file {path}: {source}")]
    CatalogIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog parse error: {0}")]
    CatalogParse(#[from] serde_yaml::Error),

    #[error("Invalid match pattern for '{phrase}': {source}")]
    Pattern {
        phrase: String,
        #[source]
        source: regex::Error,
    },

    #[error("Normalizer error: {0}")]
    Normalizer(String),

    #[error("Similarity error: {0}")]
    Similarity(String),
}

pub type NlpResult<T> = Result<T, NlpError>;

impl From<NlpError> for SummarizerError {
    fn from(error: NlpError) -> Self {
        match error {
            NlpError::Config(message) => SummarizerError::ConfigError(message),
            NlpError::Catalog(_)
            | NlpError::CatalogIo { .. }
            | NlpError::CatalogParse(_)
            | NlpError::Pattern { .. } => SummarizerError::CatalogError(error.to_string()),
            NlpError::Normalizer(_) | NlpError::Similarity(_) => {
                SummarizerError::InternalError(error.to_string())
            }
        }
    }
}
