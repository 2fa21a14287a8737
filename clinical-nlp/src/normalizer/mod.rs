pub mod lexicon;
pub mod rule_based;

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::NormalizerKind;
use crate::error::NlpResult;

pub use lexicon::Lexicon;
pub use rule_based::{Entity, EntityLabel, RuleBasedNormalizer};

/// Source of normalized term candidates for Tier 2
///
/// Implementations return lowercase candidates: non-excluded entities,
/// content-word lemmas and short noun phrases. Errors are soft-failed by the
/// cascade, so an implementation may fail freely.
pub trait LinguisticNormalizer: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract_terms(&self, text: &str) -> NlpResult<BTreeSet<String>>;

    /// Load any model state ahead of the first request
    fn warm_up(&self) -> NlpResult<()> {
        Ok(())
    }
}

/// Normalizer for deployments without a language model
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNormalizer;

impl LinguisticNormalizer for DisabledNormalizer {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn extract_terms(&self, _text: &str) -> NlpResult<BTreeSet<String>> {
        Ok(BTreeSet::new())
    }
}

/// Create a normalizer instance based on configuration
pub fn create_normalizer(kind: NormalizerKind) -> Arc<dyn LinguisticNormalizer> {
    match kind {
        NormalizerKind::RuleBased => Arc::new(RuleBasedNormalizer::new()),
        NormalizerKind::Disabled => Arc::new(DisabledNormalizer),
    }
}
