pub mod tfidf;

use std::sync::Arc;

use crate::config::{SimilarityConfig, SimilarityKind, DEFAULT_SIMILARITY_THRESHOLD};
use crate::error::NlpResult;

pub use tfidf::TfidfSimilarity;

/// Statistical text-similarity scorer backing Tier 3
pub trait SimilarityMatcher: Send + Sync {
    fn name(&self) -> &'static str;

    /// Candidates whose score against `text` is strictly above `threshold`,
    /// in candidate order
    fn find_similar(&self, text: &str, candidates: &[&str], threshold: f64)
        -> NlpResult<Vec<String>>;

    /// Threshold for general lookups
    fn default_threshold(&self) -> f64 {
        DEFAULT_SIMILARITY_THRESHOLD
    }

    fn find_similar_default(&self, text: &str, candidates: &[&str]) -> NlpResult<Vec<String>> {
        self.find_similar(text, candidates, self.default_threshold())
    }
}

/// Matcher that never reports a match
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSimilarity;

impl SimilarityMatcher for DisabledSimilarity {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn find_similar(
        &self,
        _text: &str,
        _candidates: &[&str],
        _threshold: f64,
    ) -> NlpResult<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Create a similarity matcher based on configuration
pub fn create_similarity(config: &SimilarityConfig) -> Arc<dyn SimilarityMatcher> {
    match config.kind {
        SimilarityKind::Tfidf => Arc::new(
            TfidfSimilarity::new(config.max_sentences).with_default_threshold(config.default_threshold),
        ),
        SimilarityKind::Disabled => Arc::new(DisabledSimilarity),
    }
}
