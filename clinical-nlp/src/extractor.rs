//! Chief complaint and key findings extraction
//!
//! Works on the raw note with its own phrase lists; it never consults the risk
//! catalog or the cascade.

use itertools::Itertools;
use regex::Regex;
use tracing::debug;

use crate::error::{NlpError, NlpResult};

pub const CHIEF_COMPLAINT_FALLBACK: &str = "Not specified";
pub const KEY_FINDINGS_FALLBACK: &str = "No specific findings documented";
pub const MAX_KEY_FINDINGS: usize = 5;

/// A line without a marker qualifies when its trimmed length exceeds this
const MIN_COMPLAINT_LINE_CHARS: usize = 10;

const CHIEF_COMPLAINT_MARKERS: &[&str] = &["chief complaint", "cc:"];

const FINDING_INDICATORS: &[&str] = &[
    "tremor",
    "tremors",
    "elevated",
    "nfm",
    "neuroflux marker",
    "reflex",
    "examination shows",
    "shows",
    "present",
    "brain fog",
    "muscle heaviness",
    "weakness",
    "fatigue",
    "pallor",
    "cyanosis",
    "edema",
    "rash",
    "fever",
    "heart rate",
    "blood pressure",
    "respiratory rate",
    "oxygen saturation",
    "temperature",
    "turgor",
    "decreased",
    "increased",
    "abnormal",
    "delayed",
    "absent",
    "positive",
    "negative",
];

const NEGATION_INDICATORS: &[&str] = &[
    "no history",
    "denies",
    "negative for",
    "ruled out",
    "never",
];

const BIOMARKER_MENTIONS: &[&str] = &["nfm", "neuroflux"];
const BIOMARKER_LEVEL_PATTERN: &str = r"nfm.*?(\d+\.?\d*)\s*units?";

/// Derives chief complaint and key findings text from a note
#[derive(Debug, Clone)]
pub struct ClinicalFieldExtractor {
    biomarker_level: Regex,
}

impl ClinicalFieldExtractor {
    pub fn new() -> NlpResult<Self> {
        let biomarker_level = Regex::new(BIOMARKER_LEVEL_PATTERN).map_err(|source| {
            NlpError::Pattern {
                phrase: BIOMARKER_LEVEL_PATTERN.to_string(),
                source,
            }
        })?;
        Ok(Self { biomarker_level })
    }

    /// Text after the first colon of the first marker line, else the first
    /// substantial line, else [`CHIEF_COMPLAINT_FALLBACK`]
    pub fn chief_complaint(&self, note: &str) -> String {
        for line in note.split('\n') {
            let lowered = line.to_lowercase();
            if CHIEF_COMPLAINT_MARKERS
                .iter()
                .any(|marker| lowered.contains(marker))
            {
                let complaint = line.split_once(':').map_or(line, |(_, rest)| rest);
                return complaint.trim().to_string();
            }
        }

        note.split('\n')
            .map(str::trim)
            .find(|line| line.chars().count() > MIN_COMPLAINT_LINE_CHARS)
            .map_or_else(|| CHIEF_COMPLAINT_FALLBACK.to_string(), str::to_string)
    }

    /// Up to five non-negated finding sentences joined by spaces
    pub fn key_findings(&self, note: &str) -> String {
        let findings = self.findings(note);
        if findings.is_empty() {
            KEY_FINDINGS_FALLBACK.to_string()
        } else {
            findings.join(" ")
        }
    }

    /// Finding sentences in note order, deduplicated and capped
    pub fn findings(&self, note: &str) -> Vec<String> {
        let mut findings: Vec<String> = Vec::new();

        for sentence in note.split(". ") {
            let lowered = sentence.to_lowercase();
            let indicated = FINDING_INDICATORS.iter().any(|k| lowered.contains(k));
            let negated = NEGATION_INDICATORS.iter().any(|n| lowered.contains(n));
            if indicated && !negated {
                findings.push(sentence.trim().to_string());
            } else if indicated {
                debug!("Skipping negated finding sentence");
            }
        }

        if let Some(level) = self.biomarker_level(note) {
            findings.push(format!(
                "Serum Neuroflux Marker (NFM) elevated at {level} units"
            ));
        }

        findings.into_iter().unique().take(MAX_KEY_FINDINGS).collect()
    }

    /// Numeric biomarker level following an NFM mention, as written
    pub fn biomarker_level(&self, note: &str) -> Option<String> {
        let lowered = note.to_lowercase();
        if !BIOMARKER_MENTIONS.iter().any(|m| lowered.contains(m)) {
            return None;
        }
        self.biomarker_level
            .captures(&lowered)
            .and_then(|caps| caps.get(1))
            .map(|level| level.as_str().to_string())
    }
}
