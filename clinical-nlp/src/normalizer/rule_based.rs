//! Rule-based linguistic normalizer
//!
//! Produces Tier 2 candidates from a note:
//!
//! - named entities, except people, organizations and locations
//!   (abbreviations contribute their expanded form)
//! - lemmas of content words longer than two characters
//! - noun-phrase-like runs of two to four content words
//!
//! The model (lexicon plus compiled entity patterns) loads on first use and is
//! shared for the life of the normalizer. Call [`RuleBasedNormalizer::warm_up`]
//! at startup to pay that cost before the first request.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::Range;
use std::sync::OnceLock;
use tracing::{debug, info};

use super::lexicon::Lexicon;
use super::LinguisticNormalizer;
use crate::error::{NlpError, NlpResult};

/// Longest run of content words kept as a phrase candidate
pub const MAX_CHUNK_TOKENS: usize = 4;
/// Lemmas must be longer than this many characters
pub const MIN_LEMMA_CHARS: usize = 2;

/// Entity category assigned by the recognizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityLabel {
    Quantity,
    Abbreviation,
    Person,
    Organization,
    Location,
}

impl EntityLabel {
    /// People, organizations and locations never become candidates
    pub fn is_excluded(&self) -> bool {
        matches!(
            self,
            EntityLabel::Person | EntityLabel::Organization | EntityLabel::Location
        )
    }
}

/// Recognized entity; `text` is lowercase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub label: EntityLabel,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Token<'a> {
    text: &'a str,
    start: usize,
    /// Punctuation or a line break sits between this token and the previous one
    breaks_phrase: bool,
}

#[derive(Debug)]
struct Model {
    lexicon: Lexicon,
    token: Regex,
    quantity: Regex,
    person: Regex,
    organization: Regex,
    location: Regex,
}

impl Model {
    fn load() -> NlpResult<Self> {
        let lexicon = Lexicon::english();
        let person = format!(
            r"\b(?:{})\.?\s+[\p{{L}}'-]+",
            alternation(lexicon.honorifics())
        );
        let organization = format!(
            r"\b(?:[\p{{L}}'-]+\s+){{1,3}}(?:{})\b",
            alternation(lexicon.organization_suffixes())
        );
        let location = format!(
            r"\b[\p{{L}}'-]+\s+(?:{})\b",
            alternation(lexicon.location_suffixes())
        );

        Ok(Self {
            token: compile(r"[\p{L}\p{N}]+(?:['-][\p{L}\p{N}]+)*")?,
            quantity: compile(
                r"\b\d+(?:\.\d+)?(?:\s*(?:mg/dl|mmol/l|mmhg|mcg|mg|kg|ml|bpm|units?|g|l)\b|\s*%)|\b\d{2,3}/\d{2,3}\b",
            )?,
            person: compile(&person)?,
            organization: compile(&organization)?,
            location: compile(&location)?,
            lexicon,
        })
    }

    fn tokens<'a>(&self, text: &'a str) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();
        let mut previous_end = 0;
        for found in self.token.find_iter(text) {
            let gap = text.get(previous_end..found.start()).unwrap_or_default();
            tokens.push(Token {
                text: found.as_str(),
                start: found.start(),
                breaks_phrase: gap.chars().any(|c| !c.is_whitespace() || c == '\n'),
            });
            previous_end = found.end();
        }
        tokens
    }

    /// Entities with their byte spans in `text`
    fn entities(&self, text: &str, tokens: &[Token<'_>]) -> Vec<(Entity, Range<usize>)> {
        let mut entities = Vec::new();
        for (label, regex) in [
            (EntityLabel::Quantity, &self.quantity),
            (EntityLabel::Person, &self.person),
            (EntityLabel::Organization, &self.organization),
            (EntityLabel::Location, &self.location),
        ] {
            entities.extend(regex.find_iter(text).map(|found| {
                let entity = Entity {
                    label,
                    text: found.as_str().trim().to_string(),
                };
                (entity, found.range())
            }));
        }
        entities.extend(tokens.iter().filter_map(|token| {
            self.lexicon.expand(token.text).map(|expanded| {
                let entity = Entity {
                    label: EntityLabel::Abbreviation,
                    text: expanded.to_string(),
                };
                (entity, token.start..token.start + token.text.len())
            })
        }));
        entities
    }

    fn is_content_word(&self, word: &str) -> bool {
        word.chars().any(char::is_alphabetic) && !self.lexicon.is_stopword(word)
    }

    fn chunks(&self, tokens: &[Token<'_>]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut run: Vec<&str> = Vec::new();
        for token in tokens {
            let content = self.is_content_word(token.text);
            if token.breaks_phrase || !content {
                flush_run(&mut run, &mut chunks);
            }
            if content {
                run.push(token.text);
            }
        }
        flush_run(&mut run, &mut chunks);
        chunks
    }
}

fn flush_run(run: &mut Vec<&str>, chunks: &mut Vec<String>) {
    if (2..=MAX_CHUNK_TOKENS).contains(&run.len()) {
        chunks.push(run.join(" "));
    }
    run.clear();
}

fn alternation(words: &[&str]) -> String {
    words
        .iter()
        .map(|word| regex::escape(word).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|")
}

fn compile(pattern: &str) -> NlpResult<Regex> {
    Regex::new(pattern).map_err(|e| NlpError::Normalizer(format!("invalid pattern {pattern}: {e}")))
}

/// Lemmatizer, chunker and entity recognizer built from word lists
#[derive(Debug, Default)]
pub struct RuleBasedNormalizer {
    model: OnceLock<NlpResult<Model>>,
}

impl RuleBasedNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.model.get(), Some(Ok(_)))
    }

    fn model(&self) -> NlpResult<&Model> {
        self.model
            .get_or_init(|| {
                info!("Loading rule-based normalizer model");
                Model::load()
            })
            .as_ref()
            .map_err(|e| NlpError::Normalizer(format!("model unavailable: {e}")))
    }

    /// Entities recognized in `text`, excluded labels included
    pub fn entities(&self, text: &str) -> NlpResult<Vec<Entity>> {
        let model = self.model()?;
        let lowered = text.to_lowercase();
        let tokens = model.tokens(&lowered);
        Ok(model
            .entities(&lowered, &tokens)
            .into_iter()
            .map(|(entity, _)| entity)
            .collect())
    }
}

impl LinguisticNormalizer for RuleBasedNormalizer {
    fn name(&self) -> &'static str {
        "rule-based"
    }

    /// Load the model now instead of on first use
    fn warm_up(&self) -> NlpResult<()> {
        self.model().map(|_| ())
    }

    fn extract_terms(&self, text: &str) -> NlpResult<BTreeSet<String>> {
        let model = self.model()?;
        let lowered = text.to_lowercase();
        let mut tokens = model.tokens(&lowered);
        let mut terms = BTreeSet::new();
        let mut excluded: Vec<Range<usize>> = Vec::new();

        for (entity, span) in model.entities(&lowered, &tokens) {
            if entity.label.is_excluded() {
                excluded.push(span);
            } else if !entity.text.is_empty() {
                terms.insert(entity.text);
            }
        }

        // Words of a name or place do not come back as lemmas or phrases.
        let mut inside_excluded = false;
        tokens.retain_mut(|token| {
            let skip = excluded.iter().any(|span| span.contains(&token.start));
            if !skip && inside_excluded {
                token.breaks_phrase = true;
            }
            inside_excluded = skip;
            !skip
        });

        for token in &tokens {
            if model.is_content_word(token.text) {
                let lemma = model.lexicon.lemmatize(token.text);
                if lemma.chars().count() > MIN_LEMMA_CHARS {
                    terms.insert(lemma);
                }
            }
        }

        terms.extend(model.chunks(&tokens));

        debug!(candidates = terms.len(), "Normalized note terms");
        Ok(terms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lemmas_map_inflections_to_catalog_forms() {
        let normalizer = RuleBasedNormalizer::new();
        let terms = normalizer
            .extract_terms("Patient had two seizures and visible tremors.")
            .unwrap();
        assert!(terms.contains("seizure"));
        assert!(terms.contains("tremor"));
        assert!(!terms.contains("and"));
    }

    #[test]
    fn test_short_lemmas_are_dropped() {
        let normalizer = RuleBasedNormalizer::new();
        let terms = normalizer.extract_terms("GI upset, ok").unwrap();
        assert!(!terms.contains("gi"));
        assert!(!terms.contains("ok"));
    }

    #[test]
    fn test_abbreviations_expand() {
        let normalizer = RuleBasedNormalizer::new();
        let terms = normalizer.extract_terms("Pt with SOB and prior CVA").unwrap();
        assert!(terms.contains("shortness of breath"));
        assert!(terms.contains("stroke"));
    }

    #[test]
    fn test_people_places_and_organizations_are_excluded() {
        let normalizer = RuleBasedNormalizer::new();
        let entities = normalizer
            .entities("Seen by Dr. Smith at Mercy General Hospital in Cook County")
            .unwrap();
        assert!(entities.iter().any(|e| e.label == EntityLabel::Person));
        assert!(entities.iter().any(|e| e.label == EntityLabel::Organization));
        assert!(entities.iter().any(|e| e.label == EntityLabel::Location));

        let terms = normalizer
            .extract_terms("Seen by Dr. Smith at Mercy General Hospital in Cook County")
            .unwrap();
        for entity in entities.iter().filter(|e| e.label.is_excluded()) {
            assert!(!terms.contains(&entity.text), "leaked {}", entity.text);
        }
        assert!(!terms.contains("smith"));
        assert!(!terms.contains("cook county"));
        assert!(terms.contains("seen"));
    }

    #[test]
    fn test_quantities_are_candidates() {
        let normalizer = RuleBasedNormalizer::new();
        let terms = normalizer.extract_terms("BP 150/95, given 40 mg").unwrap();
        assert!(terms.contains("150/95"));
        assert!(terms.contains("40 mg"));
        assert!(terms.contains("blood pressure"));
    }

    #[test]
    fn test_chunks_stop_at_punctuation_and_length() {
        let normalizer = RuleBasedNormalizer::new();
        let terms = normalizer
            .extract_terms("Severe chest pain, cold clammy pale mottled sweaty skin")
            .unwrap();
        assert!(terms.contains("severe chest pain"));
        assert!(!terms.contains("cold clammy pale mottled sweaty skin"));
        assert!(!terms.contains("pain cold"));
    }

    #[test]
    fn test_warm_up_loads_once() {
        let normalizer = RuleBasedNormalizer::new();
        assert!(!normalizer.is_loaded());
        normalizer.warm_up().unwrap();
        assert!(normalizer.is_loaded());
    }

    #[test]
    fn test_empty_note_yields_nothing() {
        let normalizer = RuleBasedNormalizer::new();
        assert!(normalizer.extract_terms("   ").unwrap().is_empty());
    }
}
