//! Summarization pipeline
//!
//! [`ClinicalSummarizer`] owns the catalogs and capabilities, built once at
//! startup, and turns a [`ClinicalNote`] into a [`SummaryReport`]. It keeps no
//! per-request state, so one instance serves any number of concurrent callers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::cascade::{MatchResult, RiskDetectionCascade, TierCounts};
use crate::catalog::{DiagnosticCodeCatalog, RiskTermCatalog, Severity};
use crate::confidence::calculate_confidence;
use crate::config::EngineConfig;
use crate::deriver::{generate_diagnostic_codes, identify_risk_factors};
use crate::error::NlpResult;
use crate::extractor::ClinicalFieldExtractor;
use crate::normalizer::create_normalizer;
use crate::similarity::create_similarity;

/// Version reported alongside every summary
pub const MODEL_VERSION: &str = "1.0.0";

pub const BASELINE_RECOMMENDATIONS: [&str; 3] = [
    "Continue monitoring vital signs",
    "Follow-up in 24-48 hours",
    "Consider specialist consultation if symptoms persist",
];

/// Note text plus demographics, as received
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalNote {
    pub case_id: String,
    pub text: String,
    pub patient_age: String,
    pub gender: String,
}

impl ClinicalNote {
    pub fn new(
        case_id: impl Into<String>,
        text: impl Into<String>,
        patient_age: impl Into<String>,
        gender: impl Into<String>,
    ) -> Self {
        Self {
            case_id: case_id.into(),
            text: text.into(),
            patient_age: patient_age.into(),
            gender: gender.into(),
        }
    }
}

/// Matched risk phrases and the severity tiers they span
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskProfile {
    /// Matched phrases in sorted order
    pub words: Vec<String>,
    pub severities: BTreeSet<Severity>,
}

impl RiskProfile {
    pub fn from_matches(matches: &MatchResult, catalog: &RiskTermCatalog) -> Self {
        Self {
            words: matches.to_vec(),
            severities: matches
                .phrases()
                .filter_map(|phrase| catalog.severity(phrase))
                .collect(),
        }
    }

    /// Most severe tier present
    pub fn highest_severity(&self) -> Option<Severity> {
        self.severities.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Text fields derived from one note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedSummary {
    pub chief_complaint: String,
    pub key_findings: String,
    pub assessment: String,
    pub recommendations: Vec<String>,
    pub icd_codes: String,
    pub confidence_score: u32,
}

/// Complete result for one note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub case_id: String,
    pub summary: DerivedSummary,
    pub risk_factors: Vec<String>,
    pub risk_profile: RiskProfile,
    pub tier_counts: TierCounts,
}

impl SummaryReport {
    pub fn risk_words(&self) -> &[String] {
        &self.risk_profile.words
    }
}

/// Baseline recommendations, led by a priority line when risks were found
pub fn build_recommendations(risk_words: &[String]) -> Vec<String> {
    let mut recommendations = Vec::with_capacity(BASELINE_RECOMMENDATIONS.len() + 1);
    if !risk_words.is_empty() {
        recommendations.push(format!(
            "HIGH PRIORITY: Risk factors detected: {}",
            risk_words.join(", ")
        ));
    }
    recommendations.extend(BASELINE_RECOMMENDATIONS.iter().map(|r| (*r).to_string()));
    recommendations
}

pub fn build_assessment(chief_complaint: &str, key_findings: &str) -> String {
    format!(
        "Patient presents with {}. Key findings include: {key_findings}.",
        chief_complaint.to_lowercase()
    )
}

/// Stateless note summarizer
#[derive(Debug, Clone)]
pub struct ClinicalSummarizer {
    cascade: RiskDetectionCascade,
    extractor: ClinicalFieldExtractor,
    codes: Arc<DiagnosticCodeCatalog>,
}

impl ClinicalSummarizer {
    pub fn new(
        cascade: RiskDetectionCascade,
        codes: Arc<DiagnosticCodeCatalog>,
    ) -> NlpResult<Self> {
        Ok(Self {
            cascade,
            extractor: ClinicalFieldExtractor::new()?,
            codes,
        })
    }

    /// Load catalogs and capabilities as configured
    pub fn from_config(config: &EngineConfig) -> NlpResult<Self> {
        config.validate()?;

        let risk_terms = match &config.risk_catalog_path {
            Some(path) => RiskTermCatalog::from_path(path)?,
            None => RiskTermCatalog::builtin()?,
        };
        let codes = match &config.code_catalog_path {
            Some(path) => DiagnosticCodeCatalog::from_path(path)?,
            None => DiagnosticCodeCatalog::builtin()?,
        };

        let normalizer = create_normalizer(config.normalizer);
        if let Err(e) = normalizer.warm_up() {
            warn!(
                capability = normalizer.name(),
                error = %e,
                "Normalizer failed to load; normalized tier will contribute nothing"
            );
        }
        let similarity = create_similarity(&config.similarity);

        info!(
            risk_terms = risk_terms.len(),
            diagnostic_codes = codes.len(),
            normalizer = normalizer.name(),
            similarity = similarity.name(),
            "Clinical summarizer ready"
        );

        let cascade = RiskDetectionCascade::new(
            Arc::new(risk_terms),
            normalizer,
            similarity,
            config.policy,
        );
        Self::new(cascade, Arc::new(codes))
    }

    pub fn cascade(&self) -> &RiskDetectionCascade {
        &self.cascade
    }

    pub fn diagnostic_codes(&self) -> &DiagnosticCodeCatalog {
        &self.codes
    }

    pub fn summarize(&self, note: &ClinicalNote) -> SummaryReport {
        info!(case_id = %note.case_id, "Processing case");

        let chief_complaint = self.extractor.chief_complaint(&note.text);
        let key_findings = self.extractor.key_findings(&note.text);
        let matches = self.cascade.detect(&note.text);
        let risk_profile = RiskProfile::from_matches(&matches, self.cascade.catalog());
        let risk_factors = identify_risk_factors(&note.text, &note.patient_age, &note.gender);
        let icd_codes = generate_diagnostic_codes(&note.text, &self.codes);
        let confidence_score = calculate_confidence(&note.text, risk_profile.words.len());

        let summary = DerivedSummary {
            assessment: build_assessment(&chief_complaint, &key_findings),
            recommendations: build_recommendations(&risk_profile.words),
            chief_complaint,
            key_findings,
            icd_codes,
            confidence_score,
        };

        info!(
            case_id = %note.case_id,
            risk_words = risk_profile.words.len(),
            risk_factors = risk_factors.len(),
            confidence = confidence_score,
            "Case processed successfully"
        );

        SummaryReport {
            case_id: note.case_id.clone(),
            summary,
            risk_factors,
            risk_profile,
            tier_counts: matches.tier_counts(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendations_without_risks() {
        let recommendations = build_recommendations(&[]);
        assert_eq!(recommendations, BASELINE_RECOMMENDATIONS.map(String::from).to_vec());
    }

    #[test]
    fn test_priority_line_leads_when_risks_found() {
        let words = vec!["chest pain".to_string(), "sepsis".to_string()];
        let recommendations = build_recommendations(&words);
        assert_eq!(recommendations.len(), 4);
        assert_eq!(
            recommendations.first().map(String::as_str),
            Some("HIGH PRIORITY: Risk factors detected: chest pain, sepsis")
        );
    }

    #[test]
    fn test_assessment_lowercases_the_complaint() {
        assert_eq!(
            build_assessment("Severe Headache", "No specific findings documented"),
            "Patient presents with severe headache. Key findings include: No specific findings documented."
        );
    }

    #[test]
    fn test_highest_severity() {
        let catalog = RiskTermCatalog::builtin().unwrap();
        let mut matches = MatchResult::new();
        matches.insert("obesity", crate::cascade::Tier::Lexical);
        matches.insert("tremors", crate::cascade::Tier::Lexical);
        let profile = RiskProfile::from_matches(&matches, &catalog);
        assert_eq!(profile.highest_severity(), Some(Severity::High));
        assert_eq!(profile.words, vec!["obesity".to_string(), "tremors".to_string()]);
        assert!(RiskProfile::default().highest_severity().is_none());
    }
}
