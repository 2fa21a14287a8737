//! Clinical note risk-term classification and summary derivation
//!
//! Matches free-text notes against a curated catalog of risk phrases and
//! derives a structured summary from the same text.
//!
//! # Risk Detection Cascade
//!
//! 1. **Lexical**: whole-word, case-insensitive match of every catalog phrase
//! 2. **Normalized**: lemmas, entities and short phrases from a
//!    [`LinguisticNormalizer`], matched against the catalog in both directions
//! 3. **Similarity**: character n-gram TF-IDF scoring through a
//!    [`SimilarityMatcher`] at a high last-resort threshold
//!
//! Tiers 2 and 3 only run while earlier tiers found few matches, and a failing
//! capability degrades to "no extra matches" instead of failing the note.
//!
//! # Derived Fields
//!
//! - Chief complaint and key findings ([`ClinicalFieldExtractor`])
//! - Age and obstetric risk factors, ICD-10 codes ([`deriver`])
//! - A confidence score in `[50, 95]` ([`calculate_confidence`])
//! - Assessment text and recommendations ([`summary`])
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use clinical_nlp::{ClinicalNote, EngineConfig, SummarizationService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EngineConfig::from_env()?;
//! let service = SummarizationService::from_config(&config)?;
//!
//! let note = ClinicalNote::new(
//!     "case-001",
//!     "CC: chest pain radiating to left arm. Vital signs stable.",
//!     "72",
//!     "male",
//! );
//! let report = service.summarize(note).await?;
//!
//! println!("Risk words: {:?}", report.risk_words());
//! println!("ICD codes: {}", report.summary.icd_codes);
//! # Ok(())
//! # }
//! ```

pub mod cascade;
pub mod catalog;
pub mod confidence;
pub mod config;
pub mod deriver;
pub mod error;
pub mod extractor;
pub mod lexical;
pub mod normalizer;
pub mod service;
pub mod similarity;
pub mod summary;

pub use cascade::*;
pub use catalog::*;
pub use confidence::*;
pub use config::*;
pub use deriver::*;
pub use error::*;
pub use extractor::*;
pub use lexical::*;
pub use normalizer::{create_normalizer, DisabledNormalizer, LinguisticNormalizer, RuleBasedNormalizer};
pub use service::*;
pub use similarity::{create_similarity, DisabledSimilarity, SimilarityMatcher, TfidfSimilarity};
pub use summary::*;
