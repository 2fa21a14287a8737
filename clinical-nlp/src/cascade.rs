//! Risk detection cascade
//!
//! Three tiers run in order, each only while the tiers before it found too few
//! matches:
//!
//! 1. **Lexical**: whole-word match of every catalog phrase. Always runs.
//! 2. **Normalized**: normalizer candidates matched against catalog phrases in
//!    either direction. Runs while fewer than `normalized_tier_below` matches.
//! 3. **Similarity**: TF-IDF scoring of every catalog phrase against the note
//!    at the last-resort threshold. Runs while fewer than
//!    `similarity_tier_below` matches.
//!
//! Later tiers only add phrases. A failing normalizer or similarity matcher
//! contributes nothing and is logged; it never fails the cascade.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::catalog::RiskTermCatalog;
use crate::config::CascadePolicy;
use crate::lexical::contains_whole_word;
use crate::normalizer::LinguisticNormalizer;
use crate::similarity::SimilarityMatcher;

/// Stage of the cascade that first reported a phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Lexical,
    Normalized,
    Similarity,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Lexical => "lexical",
            Tier::Normalized => "normalized",
            Tier::Similarity => "similarity",
        };
        f.write_str(name)
    }
}

/// Number of phrases each tier contributed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierCounts {
    pub lexical: usize,
    pub normalized: usize,
    pub similarity: usize,
}

/// Matched catalog phrases, each tagged with the tier that found it
///
/// Iteration is in sorted phrase order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    matches: BTreeMap<String, Tier>,
}

impl MatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a phrase; a phrase keeps the tier that found it first
    pub fn insert(&mut self, phrase: &str, tier: Tier) -> bool {
        if self.matches.contains_key(phrase) {
            return false;
        }
        debug!(phrase, %tier, "Risk term matched");
        self.matches.insert(phrase.to_string(), tier);
        true
    }

    pub fn contains(&self, phrase: &str) -> bool {
        self.matches.contains_key(phrase)
    }

    pub fn tier_of(&self, phrase: &str) -> Option<Tier> {
        self.matches.get(phrase).copied()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn phrases(&self) -> impl Iterator<Item = &str> + '_ {
        self.matches.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Tier)> + '_ {
        self.matches.iter().map(|(phrase, tier)| (phrase.as_str(), *tier))
    }

    /// Phrases in sorted order
    pub fn to_vec(&self) -> Vec<String> {
        self.matches.keys().cloned().collect()
    }

    pub fn to_set(&self) -> BTreeSet<String> {
        self.matches.keys().cloned().collect()
    }

    pub fn tier_counts(&self) -> TierCounts {
        self.matches
            .values()
            .fold(TierCounts::default(), |mut counts, tier| {
                match tier {
                    Tier::Lexical => counts.lexical += 1,
                    Tier::Normalized => counts.normalized += 1,
                    Tier::Similarity => counts.similarity += 1,
                }
                counts
            })
    }
}

/// Three-tier risk term detector over a shared catalog
#[derive(Clone)]
pub struct RiskDetectionCascade {
    catalog: Arc<RiskTermCatalog>,
    normalizer: Arc<dyn LinguisticNormalizer>,
    similarity: Arc<dyn SimilarityMatcher>,
    policy: CascadePolicy,
}

impl fmt::Debug for RiskDetectionCascade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RiskDetectionCascade")
            .field("catalog_terms", &self.catalog.len())
            .field("normalizer", &self.normalizer.name())
            .field("similarity", &self.similarity.name())
            .field("policy", &self.policy)
            .finish()
    }
}

impl RiskDetectionCascade {
    pub fn new(
        catalog: Arc<RiskTermCatalog>,
        normalizer: Arc<dyn LinguisticNormalizer>,
        similarity: Arc<dyn SimilarityMatcher>,
        policy: CascadePolicy,
    ) -> Self {
        Self {
            catalog,
            normalizer,
            similarity,
            policy,
        }
    }

    pub fn catalog(&self) -> &RiskTermCatalog {
        &self.catalog
    }

    pub fn policy(&self) -> &CascadePolicy {
        &self.policy
    }

    /// Tier 1 alone
    pub fn lexical_tier(&self, text: &str) -> MatchResult {
        let mut result = MatchResult::new();
        self.run_lexical(text, &mut result);
        result
    }

    /// Full cascade
    pub fn detect(&self, text: &str) -> MatchResult {
        info!(chars = text.chars().count(), "Starting risk word detection");

        let mut result = MatchResult::new();
        let found = self.run_lexical(text, &mut result);
        info!(tier = %Tier::Lexical, matches = found, "Tier complete");

        if result.len() < self.policy.normalized_tier_below {
            let found = self.run_normalized(text, &mut result);
            info!(tier = %Tier::Normalized, matches = found, "Tier complete");
        }

        if result.len() < self.policy.similarity_tier_below {
            let found = self.run_similarity(text, &mut result);
            info!(tier = %Tier::Similarity, matches = found, "Tier complete");
        }

        info!(total = result.len(), "Risk word detection complete");
        result
    }

    fn run_lexical(&self, text: &str, result: &mut MatchResult) -> usize {
        let terms: Vec<_> = self.catalog.terms().collect();
        let matched: Vec<&str> = terms
            .par_iter()
            .filter(|(pattern, _)| pattern.is_match(text))
            .map(|&(pattern, _)| pattern.phrase())
            .collect();
        record(result, matched, Tier::Lexical)
    }

    fn run_normalized(&self, text: &str, result: &mut MatchResult) -> usize {
        let extracted = match self.normalizer.extract_terms(&text.to_lowercase()) {
            Ok(terms) => terms,
            Err(e) => {
                warn!(
                    capability = self.normalizer.name(),
                    error = %e,
                    "Normalizer failed; skipping normalized tier"
                );
                return 0;
            }
        };
        info!(candidates = extracted.len(), "Extracted normalized terms");

        let candidates: Vec<String> = extracted
            .iter()
            .map(|candidate| candidate.trim().to_lowercase())
            .filter(|candidate| !candidate.is_empty())
            .collect();

        let phrases: Vec<&str> = self.catalog.phrases().collect();
        let matched: Vec<&str> = phrases
            .par_iter()
            .copied()
            .filter(|phrase| {
                candidates.iter().any(|candidate| {
                    contains_whole_word(candidate, phrase) || contains_whole_word(phrase, candidate)
                })
            })
            .collect();
        record(result, matched, Tier::Normalized)
    }

    fn run_similarity(&self, text: &str, result: &mut MatchResult) -> usize {
        let phrases: Vec<&str> = self.catalog.phrases().collect();
        match self
            .similarity
            .find_similar(text, &phrases, self.policy.similarity_threshold)
        {
            Ok(matched) => record(
                result,
                matched
                    .iter()
                    .map(String::as_str)
                    .filter(|phrase| self.catalog.contains(phrase)),
                Tier::Similarity,
            ),
            Err(e) => {
                warn!(
                    capability = self.similarity.name(),
                    error = %e,
                    "Similarity matcher failed; skipping similarity tier"
                );
                0
            }
        }
    }
}

/// Insert phrases and count how many were new
fn record<'a, I>(result: &mut MatchResult, phrases: I, tier: Tier) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    phrases
        .into_iter()
        .filter(|phrase| result.insert(phrase, tier))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Severity;
    use crate::error::{NlpError, NlpResult};
    use crate::normalizer::DisabledNormalizer;
    use crate::config::EngineConfig;
    use crate::normalizer::RuleBasedNormalizer;
    use crate::similarity::DisabledSimilarity;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedNormalizer(Vec<&'static str>);

    impl LinguisticNormalizer for FixedNormalizer {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn extract_terms(&self, _text: &str) -> NlpResult<BTreeSet<String>> {
            Ok(self.0.iter().map(|s| (*s).to_string()).collect())
        }
    }

    struct FailingNormalizer;

    impl LinguisticNormalizer for FailingNormalizer {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn extract_terms(&self, _text: &str) -> NlpResult<BTreeSet<String>> {
            Err(NlpError::Normalizer("model missing".to_string()))
        }
    }

    #[derive(Default)]
    struct CountingNormalizer {
        calls: AtomicUsize,
    }

    impl LinguisticNormalizer for CountingNormalizer {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn extract_terms(&self, _text: &str) -> NlpResult<BTreeSet<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(BTreeSet::new())
        }
    }

    /// Emits every word and word pair of the text as a candidate
    struct NgramNormalizer;

    impl LinguisticNormalizer for NgramNormalizer {
        fn name(&self) -> &'static str {
            "ngram"
        }

        fn extract_terms(&self, text: &str) -> NlpResult<BTreeSet<String>> {
            let words: Vec<&str> = text.split_whitespace().collect();
            let mut terms: BTreeSet<String> = words.iter().map(|w| (*w).to_string()).collect();
            terms.extend(words.windows(2).map(|pair| pair.join(" ")));
            Ok(terms)
        }
    }

    struct FailingSimilarity;

    impl SimilarityMatcher for FailingSimilarity {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn find_similar(&self, _: &str, _: &[&str], _: f64) -> NlpResult<Vec<String>> {
            Err(NlpError::Similarity("model missing".to_string()))
        }
    }

    struct EchoSimilarity(&'static str);

    impl SimilarityMatcher for EchoSimilarity {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn find_similar(&self, _: &str, _: &[&str], _: f64) -> NlpResult<Vec<String>> {
            Ok(vec![self.0.to_string()])
        }
    }

    fn catalog() -> Arc<RiskTermCatalog> {
        Arc::new(
            RiskTermCatalog::from_entries([
                ("chest pain", Severity::Critical),
                ("seizure", Severity::Critical),
                ("shortness of breath", Severity::Critical),
                ("tremors", Severity::High),
            ])
            .unwrap(),
        )
    }

    fn cascade(
        normalizer: Arc<dyn LinguisticNormalizer>,
        similarity: Arc<dyn SimilarityMatcher>,
    ) -> RiskDetectionCascade {
        RiskDetectionCascade::new(catalog(), normalizer, similarity, CascadePolicy::default())
    }

    #[test]
    fn test_lexical_tier_respects_word_boundaries() {
        let cascade = cascade(Arc::new(DisabledNormalizer), Arc::new(DisabledSimilarity));
        let result = cascade.lexical_tier("Seizure-like activity, no chest painful areas");
        assert_eq!(result.to_vec(), vec!["seizure".to_string()]);
        assert_eq!(result.tier_of("seizure"), Some(Tier::Lexical));
    }

    #[test]
    fn test_normalized_tier_matches_in_both_directions() {
        let cascade = cascade(
            Arc::new(FixedNormalizer(vec!["seizure activity", "tremors", "  "])),
            Arc::new(DisabledSimilarity),
        );
        let result = cascade.detect("Patient was seizing with tremor");
        assert_eq!(result.tier_of("seizure"), Some(Tier::Normalized));
        assert_eq!(result.tier_of("tremors"), Some(Tier::Normalized));
        assert_eq!(result.tier_counts().normalized, 2);
    }

    #[test]
    fn test_similarity_tier_is_gated_by_match_count() {
        let policy = CascadePolicy {
            similarity_tier_below: 1,
            ..CascadePolicy::default()
        };
        let cascade = RiskDetectionCascade::new(
            catalog(),
            Arc::new(DisabledNormalizer),
            Arc::new(EchoSimilarity("tremors")),
            policy,
        );
        assert!(!cascade.detect("chest pain").contains("tremors"));
        assert_eq!(
            cascade.detect("nothing here").tier_of("tremors"),
            Some(Tier::Similarity)
        );
    }

    #[test]
    fn test_failing_similarity_degrades_to_no_matches() {
        let cascade = cascade(Arc::new(DisabledNormalizer), Arc::new(FailingSimilarity));
        let result = cascade.detect("Complains of chest pain");
        assert_eq!(result.to_vec(), vec!["chest pain".to_string()]);
    }

    #[test]
    fn test_similarity_results_outside_catalog_are_dropped() {
        let cascade = cascade(Arc::new(DisabledNormalizer), Arc::new(EchoSimilarity("hiccups")));
        assert!(cascade.detect("persistent hiccups").is_empty());
    }

    #[test]
    fn test_first_tier_wins_attribution() {
        let cascade = cascade(
            Arc::new(FixedNormalizer(vec!["chest pain"])),
            Arc::new(EchoSimilarity("chest pain")),
        );
        let result = cascade.detect("chest pain");
        assert_eq!(result.len(), 1);
        assert_eq!(result.tier_of("chest pain"), Some(Tier::Lexical));
        assert_eq!(
            result.tier_counts(),
            TierCounts {
                lexical: 1,
                normalized: 0,
                similarity: 0
            }
        );
    }

    #[test]
    fn test_failing_normalizer_degrades_to_no_matches() {
        let cascade = cascade(Arc::new(FailingNormalizer), Arc::new(DisabledSimilarity));
        let result = cascade.detect("Complains of chest pain, seizing overnight");
        assert_eq!(result.to_vec(), vec!["chest pain".to_string()]);
        assert_eq!(result.tier_counts().normalized, 0);
    }

    #[test]
    fn test_normalized_tier_skipped_once_lexical_reaches_gate() {
        let config = EngineConfig::from_lookup(|key| {
            (key == "NLP_NORMALIZED_TIER_BELOW").then(|| "2".to_string())
        })
        .unwrap();
        let normalizer = Arc::new(CountingNormalizer::default());
        let cascade = RiskDetectionCascade::new(
            catalog(),
            normalizer.clone(),
            Arc::new(DisabledSimilarity),
            config.policy,
        );

        cascade.detect("chest pain and a seizure");
        assert_eq!(normalizer.calls.load(Ordering::SeqCst), 0);

        cascade.detect("chest pain only");
        assert_eq!(normalizer.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_default_gate_skips_normalizer_for_busy_notes() {
        let normalizer = Arc::new(CountingNormalizer::default());
        let cascade = RiskDetectionCascade::new(
            Arc::new(RiskTermCatalog::builtin().unwrap()),
            normalizer.clone(),
            Arc::new(DisabledSimilarity),
            CascadePolicy::default(),
        );
        let note = "Chest pain, dyspnea, stridor, apnea, hypoxemia, anaphylaxis, stroke, \
                    tremors, brain fog, heart attack and cardiogenic shock.";

        let result = cascade.detect(note);
        assert!(result.len() >= cascade.policy().normalized_tier_below);
        assert_eq!(result.tier_counts().lexical, result.len());
        assert_eq!(normalizer.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_normalized_tier_handles_many_candidates() {
        let filler = (0..2000)
            .map(|i| format!("reading{i} stable. "))
            .collect::<Vec<_>>()
            .concat();
        let note = format!("{filler}apneic episode noted, tremors and fibrillation {filler}");
        let cascade = RiskDetectionCascade::new(
            Arc::new(RiskTermCatalog::builtin().unwrap()),
            Arc::new(NgramNormalizer),
            Arc::new(DisabledSimilarity),
            CascadePolicy::default(),
        );

        let result = cascade.detect(&note);
        assert_eq!(result.tier_of("tremors"), Some(Tier::Lexical));
        assert!(!result.contains("apnea"));
        assert_eq!(
            result.tier_of("ventricular fibrillation"),
            Some(Tier::Normalized)
        );
        assert!(!result.contains("chest pain"));

        let rule_based = RiskDetectionCascade::new(
            Arc::new(RiskTermCatalog::builtin().unwrap()),
            Arc::new(RuleBasedNormalizer::new()),
            Arc::new(DisabledSimilarity),
            CascadePolicy::default(),
        );
        assert_eq!(rule_based.detect(&note).tier_of("tremors"), Some(Tier::Lexical));
    }
}
