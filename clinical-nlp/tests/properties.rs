//! Property tests for matching, cascade and scoring invariants

use clinical_nlp::{
    calculate_confidence, ClinicalNote, ClinicalSummarizer, EngineConfig, RiskTermCatalog,
    BASE_SCORE, MAX_SCORE,
};
use proptest::prelude::*;
use proptest::sample::select;
use std::sync::OnceLock;

fn summarizer() -> &'static ClinicalSummarizer {
    static SUMMARIZER: OnceLock<ClinicalSummarizer> = OnceLock::new();
    SUMMARIZER.get_or_init(|| ClinicalSummarizer::from_config(&EngineConfig::default()).unwrap())
}

fn catalog_phrases() -> Vec<String> {
    RiskTermCatalog::builtin()
        .unwrap()
        .phrases()
        .map(str::to_string)
        .collect()
}

fn punctuation() -> impl Strategy<Value = &'static str> {
    select(vec!["", " ", ".", ",", "(", ")", "!", "; ", "\n", "- "])
}

/// Notes mixing catalog phrases with filler words
fn note_text() -> impl Strategy<Value = String> {
    let word = prop_oneof![
        select(catalog_phrases()),
        "[a-z]{1,10}",
        select(vec!["denies".to_string(), "no history of".to_string(), ".".to_string()]),
    ];
    prop::collection::vec(word, 0..16).prop_map(|words| words.join(" "))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_phrase_between_punctuation_matches(
        phrase in select(catalog_phrases()),
        before in punctuation(),
        after in punctuation(),
    ) {
        let text = format!("{before}{phrase}{after}");
        prop_assert!(summarizer().cascade().lexical_tier(&text).contains(&phrase));
    }

    #[test]
    fn prop_phrase_inside_longer_word_does_not_match(
        phrase in select(catalog_phrases()),
        prefix in "[a-z0-9]",
        suffix in "[a-z0-9]",
    ) {
        let cascade = summarizer().cascade();
        let prefixed = format!("{prefix}{phrase}");
        let suffixed = format!("{phrase}{suffix}");
        prop_assert!(!cascade.lexical_tier(&prefixed).contains(&phrase));
        prop_assert!(!cascade.lexical_tier(&suffixed).contains(&phrase));
    }

    #[test]
    fn prop_cascade_is_superset_of_lexical_tier(text in note_text()) {
        let cascade = summarizer().cascade();
        let lexical = cascade.lexical_tier(&text).to_set();
        let full = cascade.detect(&text).to_set();
        prop_assert!(full.is_superset(&lexical));
    }

    #[test]
    fn prop_pipeline_is_idempotent(
        text in note_text(),
        age in "[0-9]{0,3}|[a-z]{0,4}",
        gender in select(vec!["female", "Female", "male", "", "other"]),
    ) {
        let note = ClinicalNote::new("case-prop", text, age, gender);
        let first = summarizer().summarize(&note);
        let second = summarizer().summarize(&note);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_confidence_stays_within_bounds(note in ".{0,800}", risk_words in 0usize..500) {
        let score = calculate_confidence(&note, risk_words);
        prop_assert!((BASE_SCORE..=MAX_SCORE).contains(&score));
    }

    #[test]
    fn prop_summary_fields_are_never_empty(text in note_text()) {
        let report = summarizer().summarize(&ClinicalNote::new("case-prop", text, "40", "male"));
        prop_assert!(!report.summary.icd_codes.is_empty());
        prop_assert!(!report.summary.key_findings.is_empty());
        prop_assert!(report.summary.recommendations.len() >= 3);
        prop_assert_eq!(
            report.summary.recommendations.len() == 4,
            !report.risk_words().is_empty()
        );
    }
}
