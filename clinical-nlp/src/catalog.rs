//! Keyword and diagnostic-code catalogs
//!
//! Both catalogs are data: YAML lists compiled into the binary (or supplied as
//! a file) and parsed once at startup. Entries are applied in order and a
//! repeated phrase takes the value of its last entry, keeping the position of
//! its first. Every phrase is normalized to trimmed lowercase and paired with a
//! precompiled [`WordPattern`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{NlpError, NlpResult};
use crate::lexical::WordPattern;

const BUILTIN_RISK_TERMS: &str = include_str!("../data/risk_terms.yaml");
const BUILTIN_DIAGNOSTIC_CODES: &str = include_str!("../data/diagnostic_codes.yaml");

/// Severity tier attached to a risk phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    High,
    Moderate,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Moderate => "MODERATE",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct RiskTermFile {
    terms: Vec<RiskTermEntry>,
}

#[derive(Debug, Deserialize)]
struct RiskTermEntry {
    phrase: String,
    severity: Severity,
}

#[derive(Debug, Deserialize)]
struct DiagnosticCodeFile {
    conditions: Vec<DiagnosticCodeEntry>,
}

#[derive(Debug, Deserialize)]
struct DiagnosticCodeEntry {
    condition: String,
    code: String,
}

/// Ordered phrase table with last-entry-wins semantics
#[derive(Debug, Clone)]
struct PhraseTable<V> {
    entries: Vec<(WordPattern, V)>,
    index: HashMap<String, usize>,
}

impl<V: fmt::Debug> PhraseTable<V> {
    fn build<I>(kind: &str, rows: I) -> NlpResult<Self>
    where
        I: IntoIterator<Item = (String, V)>,
    {
        let mut table = Self {
            entries: Vec::new(),
            index: HashMap::new(),
        };
        for (raw, value) in rows {
            let phrase = raw.trim().to_lowercase();
            if phrase.is_empty() {
                return Err(NlpError::Catalog(format!("{kind} catalog has an empty phrase")));
            }
            match table.index.get(&phrase) {
                Some(&slot) => {
                    if let Some(existing) = table.entries.get_mut(slot) {
                        debug!(
                            kind,
                            phrase = %phrase,
                            old = ?existing.1,
                            new = ?value,
                            "Catalog entry overridden"
                        );
                        existing.1 = value;
                    }
                }
                None => {
                    table.index.insert(phrase.clone(), table.entries.len());
                    table.entries.push((WordPattern::new(&phrase)?, value));
                }
            }
        }
        if table.entries.is_empty() {
            return Err(NlpError::Catalog(format!("{kind} catalog is empty")));
        }
        Ok(table)
    }

    fn get(&self, phrase: &str) -> Option<&V> {
        self.index
            .get(&phrase.trim().to_lowercase())
            .and_then(|&slot| self.entries.get(slot))
            .map(|(_, value)| value)
    }
}

/// Risk phrase → severity tier
#[derive(Debug, Clone)]
pub struct RiskTermCatalog {
    table: PhraseTable<Severity>,
}

impl RiskTermCatalog {
    /// Catalog shipped with the crate
    pub fn builtin() -> NlpResult<Self> {
        Self::from_yaml_str(BUILTIN_RISK_TERMS)
    }

    pub fn from_yaml_str(yaml: &str) -> NlpResult<Self> {
        let file: RiskTermFile = serde_yaml::from_str(yaml)?;
        Self::from_entries(file.terms.into_iter().map(|t| (t.phrase, t.severity)))
    }

    pub fn from_path(path: impl AsRef<Path>) -> NlpResult<Self> {
        let path = path.as_ref();
        let yaml = read_catalog(path)?;
        let catalog = Self::from_yaml_str(&yaml)?;
        info!(path = %path.display(), terms = catalog.len(), "Loaded risk term catalog");
        Ok(catalog)
    }

    pub fn from_entries<I, S>(entries: I) -> NlpResult<Self>
    where
        I: IntoIterator<Item = (S, Severity)>,
        S: Into<String>,
    {
        let table = PhraseTable::build(
            "risk term",
            entries
                .into_iter()
                .map(|(phrase, severity)| (Into::<String>::into(phrase), severity)),
        )?;
        Ok(Self { table })
    }

    pub fn severity(&self, phrase: &str) -> Option<Severity> {
        self.table.get(phrase).copied()
    }

    pub fn contains(&self, phrase: &str) -> bool {
        self.table.get(phrase).is_some()
    }

    /// Phrases with their compiled patterns, in catalog order
    pub fn terms(&self) -> impl Iterator<Item = (&WordPattern, Severity)> + '_ {
        self.table.entries.iter().map(|(pattern, severity)| (pattern, *severity))
    }

    pub fn phrases(&self) -> impl Iterator<Item = &str> + '_ {
        self.table.entries.iter().map(|(pattern, _)| pattern.phrase())
    }

    pub fn len(&self) -> usize {
        self.table.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.entries.is_empty()
    }
}

/// Condition phrase → diagnostic code
#[derive(Debug, Clone)]
pub struct DiagnosticCodeCatalog {
    table: PhraseTable<String>,
}

impl DiagnosticCodeCatalog {
    /// Catalog shipped with the crate
    pub fn builtin() -> NlpResult<Self> {
        Self::from_yaml_str(BUILTIN_DIAGNOSTIC_CODES)
    }

    pub fn from_yaml_str(yaml: &str) -> NlpResult<Self> {
        let file: DiagnosticCodeFile = serde_yaml::from_str(yaml)?;
        Self::from_entries(file.conditions.into_iter().map(|c| (c.condition, c.code)))
    }

    pub fn from_path(path: impl AsRef<Path>) -> NlpResult<Self> {
        let path = path.as_ref();
        let yaml = read_catalog(path)?;
        let catalog = Self::from_yaml_str(&yaml)?;
        info!(path = %path.display(), conditions = catalog.len(), "Loaded diagnostic code catalog");
        Ok(catalog)
    }

    pub fn from_entries<I, S, C>(entries: I) -> NlpResult<Self>
    where
        I: IntoIterator<Item = (S, C)>,
        S: Into<String>,
        C: Into<String>,
    {
        let mut rows = Vec::new();
        for (condition, code) in entries {
            let condition: String = condition.into();
            let code: String = code.into();
            let code = code.trim().to_string();
            if code.is_empty() {
                return Err(NlpError::Catalog(format!(
                    "diagnostic code catalog has no code for '{condition}'"
                )));
            }
            rows.push((condition, code));
        }
        let table = PhraseTable::build("diagnostic code", rows)?;
        Ok(Self { table })
    }

    pub fn code(&self, condition: &str) -> Option<&str> {
        self.table.get(condition).map(String::as_str)
    }

    /// Conditions with their compiled patterns and codes, in catalog order
    pub fn conditions(&self) -> impl Iterator<Item = (&WordPattern, &str)> + '_ {
        self.table
            .entries
            .iter()
            .map(|(pattern, code)| (pattern, code.as_str()))
    }

    pub fn len(&self) -> usize {
        self.table.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.entries.is_empty()
    }
}

fn read_catalog(path: &Path) -> NlpResult<String> {
    std::fs::read_to_string(path).map_err(|source| NlpError::CatalogIo {
        path: path.display().to_string(),
        source,
    })
}
