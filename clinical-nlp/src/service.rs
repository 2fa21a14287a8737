use error_common::{log_error_with_context, ErrorContext, SummarizerError};
use std::sync::Arc;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::NlpResult;
use crate::summary::{ClinicalNote, ClinicalSummarizer, SummaryReport};

/// Async front-end for the summarizer
///
/// Summaries are CPU-bound, so each one runs on the blocking pool. A case
/// either completes or fails as a whole with
/// [`SummarizerError::CaseFailed`].
#[derive(Debug, Clone)]
pub struct SummarizationService {
    summarizer: Arc<ClinicalSummarizer>,
}

impl SummarizationService {
    pub fn new(summarizer: ClinicalSummarizer) -> Self {
        Self {
            summarizer: Arc::new(summarizer),
        }
    }

    pub fn from_config(config: &EngineConfig) -> NlpResult<Self> {
        Ok(Self::new(ClinicalSummarizer::from_config(config)?))
    }

    pub fn summarizer(&self) -> &ClinicalSummarizer {
        &self.summarizer
    }

    /// Summarize one note
    pub async fn summarize(&self, note: ClinicalNote) -> Result<SummaryReport, SummarizerError> {
        let case_id = note.case_id.clone();
        let summarizer = Arc::clone(&self.summarizer);

        debug!(case_id = %case_id, "Dispatching case to blocking pool");
        let outcome = tokio::task::spawn_blocking(move || summarizer.summarize(&note)).await;

        outcome.map_err(|join_error| {
            let message = if join_error.is_panic() {
                "summarization task panicked".to_string()
            } else {
                join_error.to_string()
            };
            let context = ErrorContext::for_case(&case_id)
                .add_context("operation", "summarize")
                .add_context("panicked", join_error.is_panic().to_string());
            let err = SummarizerError::case_failed(&case_id, message);
            log_error_with_context(&err, &context);
            err
        })
    }
}
