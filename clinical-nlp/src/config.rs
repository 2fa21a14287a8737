use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{NlpError, NlpResult};

/// Tier 2 runs while Tier 1 found fewer matches than this
pub const DEFAULT_NORMALIZED_TIER_BELOW: usize = 10;
/// Tier 3 runs while Tiers 1-2 found fewer matches than this
pub const DEFAULT_SIMILARITY_TIER_BELOW: usize = 5;
/// Score a phrase must exceed to be reported by the last-resort tier
pub const LAST_RESORT_SIMILARITY_THRESHOLD: f64 = 0.65;
/// Score threshold for general similarity lookups
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.3;
/// Sentences of a note the similarity matcher looks at
pub const DEFAULT_MAX_SENTENCES: usize = 15;

/// Linguistic normalizer backing Tier 2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NormalizerKind {
    /// Built-in lemmatizer, chunker and entity recognizer
    RuleBased,
    /// Always yields no candidates
    Disabled,
}

/// Similarity matcher backing Tier 3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimilarityKind {
    /// Character n-gram TF-IDF cosine similarity
    Tfidf,
    /// Always yields no matches
    Disabled,
}

/// Gating thresholds of the risk detection cascade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CascadePolicy {
    pub normalized_tier_below: usize,
    pub similarity_tier_below: usize,
    pub similarity_threshold: f64,
}

impl Default for CascadePolicy {
    fn default() -> Self {
        Self {
            normalized_tier_below: DEFAULT_NORMALIZED_TIER_BELOW,
            similarity_tier_below: DEFAULT_SIMILARITY_TIER_BELOW,
            similarity_threshold: LAST_RESORT_SIMILARITY_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityConfig {
    pub kind: SimilarityKind,
    pub default_threshold: f64,
    pub max_sentences: usize,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            kind: SimilarityKind::Tfidf,
            default_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_sentences: DEFAULT_MAX_SENTENCES,
        }
    }
}

/// Clinical NLP engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub policy: CascadePolicy,
    pub normalizer: NormalizerKind,
    pub similarity: SimilarityConfig,
    /// YAML file replacing the built-in risk term catalog
    pub risk_catalog_path: Option<PathBuf>,
    /// YAML file replacing the built-in diagnostic code catalog
    pub code_catalog_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            policy: CascadePolicy::default(),
            normalizer: NormalizerKind::RuleBased,
            similarity: SimilarityConfig::default(),
            risk_catalog_path: None,
            code_catalog_path: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> NlpResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> NlpResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let policy = CascadePolicy {
            normalized_tier_below: parse_or(
                &lookup,
                "NLP_NORMALIZED_TIER_BELOW",
                DEFAULT_NORMALIZED_TIER_BELOW,
            ),
            similarity_tier_below: parse_or(
                &lookup,
                "NLP_SIMILARITY_TIER_BELOW",
                DEFAULT_SIMILARITY_TIER_BELOW,
            ),
            similarity_threshold: parse_or(
                &lookup,
                "NLP_SIMILARITY_THRESHOLD",
                LAST_RESORT_SIMILARITY_THRESHOLD,
            ),
        };

        let normalizer = match lookup("NLP_NORMALIZER") {
            Some(kind) => match kind.trim().to_lowercase().as_str() {
                "rule-based" | "rule_based" | "rules" => NormalizerKind::RuleBased,
                "disabled" | "none" | "off" => NormalizerKind::Disabled,
                other => {
                    return Err(NlpError::Config(format!("Unknown normalizer: {other}")));
                }
            },
            None => NormalizerKind::RuleBased,
        };

        let similarity_kind = match lookup("NLP_SIMILARITY") {
            Some(kind) => match kind.trim().to_lowercase().as_str() {
                "tfidf" | "tf-idf" => SimilarityKind::Tfidf,
                "disabled" | "none" | "off" => SimilarityKind::Disabled,
                other => {
                    return Err(NlpError::Config(format!(
                        "Unknown similarity matcher: {other}"
                    )));
                }
            },
            None => SimilarityKind::Tfidf,
        };

        let similarity = SimilarityConfig {
            kind: similarity_kind,
            default_threshold: parse_or(
                &lookup,
                "NLP_SIMILARITY_DEFAULT_THRESHOLD",
                DEFAULT_SIMILARITY_THRESHOLD,
            ),
            max_sentences: parse_or(
                &lookup,
                "NLP_SIMILARITY_MAX_SENTENCES",
                DEFAULT_MAX_SENTENCES,
            ),
        };

        let config = Self {
            policy,
            normalizer,
            similarity,
            risk_catalog_path: lookup("NLP_RISK_CATALOG_PATH").map(PathBuf::from),
            code_catalog_path: lookup("NLP_CODE_CATALOG_PATH").map(PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> NlpResult<()> {
        for (name, value) in [
            ("NLP_SIMILARITY_THRESHOLD", self.policy.similarity_threshold),
            (
                "NLP_SIMILARITY_DEFAULT_THRESHOLD",
                self.similarity.default_threshold,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(NlpError::Config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.similarity.max_sentences == 0 {
            return Err(NlpError::Config(
                "NLP_SIMILARITY_MAX_SENTENCES must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
