//! Character n-gram TF-IDF similarity
//!
//! The note prefix and every candidate phrase form one document set. Each
//! document becomes a vector of character 2- and 3-gram counts weighted by the
//! smoothed inverse document frequency `ln((1 + n) / (1 + df)) + 1` and scaled
//! to unit length; a candidate's score is its cosine similarity with the note.

use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::ops::RangeInclusive;
use tracing::debug;

use super::SimilarityMatcher;
use crate::config::{DEFAULT_MAX_SENTENCES, DEFAULT_SIMILARITY_THRESHOLD};
use crate::error::{NlpError, NlpResult};

const NGRAM_RANGE: RangeInclusive<usize> = 2..=3;
const SENTENCE_DELIMITER: &str = ". ";

/// Ordered so that summation order, and with it every score, is reproducible
type SparseVector = BTreeMap<String, f64>;
type NgramCounts = BTreeMap<String, usize>;

#[derive(Debug, Clone)]
pub struct TfidfSimilarity {
    max_sentences: usize,
    default_threshold: f64,
}

impl Default for TfidfSimilarity {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SENTENCES)
    }
}

impl TfidfSimilarity {
    pub fn new(max_sentences: usize) -> Self {
        Self {
            max_sentences,
            default_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    pub fn with_default_threshold(mut self, threshold: f64) -> Self {
        self.default_threshold = threshold;
        self
    }

    /// First `max_sentences` sentences of the note, lowercased
    pub fn note_prefix(&self, text: &str) -> String {
        text.split(SENTENCE_DELIMITER)
            .take(self.max_sentences)
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// Cosine score of every candidate against the note, in candidate order
    pub fn scores(&self, text: &str, candidates: &[&str]) -> NlpResult<Vec<f64>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let mut documents = Vec::with_capacity(candidates.len() + 1);
        documents.push(self.note_prefix(text));
        documents.extend(candidates.iter().map(|c| c.to_lowercase()));

        let counts: Vec<NgramCounts> =
            documents.par_iter().map(|doc| char_ngrams(doc)).collect();

        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        for doc in &counts {
            for gram in doc.keys() {
                *document_frequency.entry(gram.as_str()).or_insert(0) += 1;
            }
        }
        if document_frequency.is_empty() {
            return Err(NlpError::Similarity(
                "empty vocabulary; documents contain no character n-grams".to_string(),
            ));
        }

        let n = as_weight(counts.len());
        let idf: HashMap<&str, f64> = document_frequency
            .iter()
            .map(|(gram, df)| (*gram, ((1.0 + n) / (1.0 + as_weight(*df))).ln() + 1.0))
            .collect();

        let vectors: Vec<SparseVector> = counts.par_iter().map(|doc| weigh(doc, &idf)).collect();
        let (note, phrases) = vectors
            .split_first()
            .ok_or_else(|| NlpError::Similarity("no note document".to_string()))?;
        Ok(phrases.par_iter().map(|phrase| dot(note, phrase)).collect())
    }
}

impl SimilarityMatcher for TfidfSimilarity {
    fn name(&self) -> &'static str {
        "tfidf"
    }

    fn find_similar(
        &self,
        text: &str,
        candidates: &[&str],
        threshold: f64,
    ) -> NlpResult<Vec<String>> {
        let scores = self.scores(text, candidates)?;
        let matched = candidates
            .iter()
            .zip(scores)
            .filter(|(_, score)| *score > threshold)
            .map(|(candidate, score)| {
                debug!(candidate = %candidate, score, "Similarity match");
                (*candidate).to_string()
            })
            .collect();
        Ok(matched)
    }

    fn default_threshold(&self) -> f64 {
        self.default_threshold
    }
}

/// Character n-gram counts after collapsing whitespace runs
fn char_ngrams(text: &str) -> NgramCounts {
    let chars = collapse_whitespace(text);
    let mut counts = NgramCounts::new();
    for size in NGRAM_RANGE {
        for window in chars.windows(size) {
            *counts.entry(window.iter().collect::<String>()).or_insert(0) += 1;
        }
    }
    counts
}

/// Runs of two or more whitespace characters become a single space
fn collapse_whitespace(text: &str) -> Vec<char> {
    let mut out = Vec::with_capacity(text.len());
    let mut pending: Vec<char> = Vec::new();
    for c in text.chars() {
        if c.is_whitespace() {
            pending.push(c);
            continue;
        }
        flush_whitespace(&mut pending, &mut out);
        out.push(c);
    }
    flush_whitespace(&mut pending, &mut out);
    out
}

fn flush_whitespace(pending: &mut Vec<char>, out: &mut Vec<char>) {
    match pending.len() {
        0 => {}
        1 => out.append(pending),
        _ => {
            out.push(' ');
            pending.clear();
        }
    }
}

/// Count as a float; counts past `u32::MAX` saturate
fn as_weight(count: usize) -> f64 {
    u32::try_from(count).map_or(f64::from(u32::MAX), f64::from)
}

/// TF-IDF weights scaled to unit length
fn weigh(counts: &NgramCounts, idf: &HashMap<&str, f64>) -> SparseVector {
    let mut vector: SparseVector = counts
        .iter()
        .map(|(gram, count)| {
            let weight = as_weight(*count) * idf.get(gram.as_str()).copied().unwrap_or(1.0);
            (gram.clone(), weight)
        })
        .collect();
    let norm = vector.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        vector.values_mut().for_each(|w| *w /= norm);
    }
    vector
}

fn dot(a: &SparseVector, b: &SparseVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(gram, w)| large.get(gram).map(|v| w * v))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_convert_counts_without_casts() {
        assert!((as_weight(3) - 3.0).abs() < f64::EPSILON);
        assert!((as_weight(usize::MAX) - f64::from(u32::MAX)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_identical_text_scores_one() {
        let matcher = TfidfSimilarity::default();
        let scores = matcher.scores("cardiac arrest", &["cardiac arrest"]).unwrap();
        assert_eq!(scores.len(), 1);
        assert!((scores.first().copied().unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unrelated_candidate_scores_low() {
        let matcher = TfidfSimilarity::default();
        let scores = matcher
            .scores("mild seasonal allergies", &["allergies", "xyz"])
            .unwrap();
        let (allergies, xyz) = (scores.first().copied().unwrap(), scores.get(1).copied().unwrap());
        assert!(allergies > xyz);
        assert!(xyz.abs() < 1e-9);
    }

    #[test]
    fn test_threshold_is_strict() {
        let matcher = TfidfSimilarity::default();
        assert_eq!(
            matcher.find_similar("sepsis", &["sepsis"], 0.5).unwrap(),
            vec!["sepsis".to_string()]
        );
        // "xyz" shares no n-gram with the note and scores exactly zero.
        assert!(matcher.find_similar("sepsis", &["xyz"], 0.0).unwrap().is_empty());
    }

    #[test]
    fn test_note_prefix_keeps_first_sentences() {
        let matcher = TfidfSimilarity::new(2);
        assert_eq!(matcher.note_prefix("One. Two. Three. Four"), "one two");
        assert_eq!(matcher.note_prefix("No delimiter here"), "no delimiter here");
    }

    #[test]
    fn test_empty_vocabulary_is_an_error() {
        let matcher = TfidfSimilarity::default();
        assert!(matches!(
            matcher.scores("a", &["b"]),
            Err(NlpError::Similarity(_))
        ));
    }

    #[test]
    fn test_no_candidates_means_no_matches() {
        let matcher = TfidfSimilarity::default();
        assert!(matcher.find_similar_default("chest pain", &[]).unwrap().is_empty());
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        assert_eq!(collapse_whitespace("a  \t b"), vec!['a', ' ', 'b']);
        assert_eq!(collapse_whitespace("a\nb"), vec!['a', '\n', 'b']);
    }
}
