//! Whole-word phrase matching
//!
//! A phrase matches when it occurs case-insensitively and both ends sit on a
//! word boundary: the start/end of the text or a character that is not
//! alphanumeric. `stroke` matches "had a stroke." but not "keystroke".

use regex::{Regex, RegexBuilder};

use crate::error::{NlpError, NlpResult};

/// Precompiled whole-word matcher for one phrase
#[derive(Debug, Clone)]
pub struct WordPattern {
    phrase: String,
    regex: Regex,
}

impl WordPattern {
    pub fn new(phrase: &str) -> NlpResult<Self> {
        let pattern = format!(
            r"(?:^|[^\p{{L}}\p{{N}}]){}(?:$|[^\p{{L}}\p{{N}}])",
            regex::escape(phrase)
        );
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| NlpError::Pattern {
                phrase: phrase.to_string(),
                source,
            })?;
        Ok(Self {
            phrase: phrase.to_string(),
            regex,
        })
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// True if the phrase occurs in `text` as whole words
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Whole-word containment without a compiled pattern
///
/// Both strings must already be lowercase. Every occurrence of `phrase` is
/// tried, overlapping ones included, until one sits on word boundaries.
pub fn contains_whole_word(text: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    let mut from = 0;
    while let Some(offset) = text.get(from..).and_then(|rest| rest.find(phrase)) {
        let start = from + offset;
        let end = start + phrase.len();
        let before = text.get(..start).and_then(|head| head.chars().next_back());
        let after = text.get(end..).and_then(|tail| tail.chars().next());
        if is_boundary(before) && is_boundary(after) {
            return true;
        }
        // advance one char so overlapping occurrences are still seen
        let step = text
            .get(start..)
            .and_then(|rest| rest.chars().next())
            .map_or(1, char::len_utf8);
        from = start + step;
    }
    false
}

fn is_boundary(c: Option<char>) -> bool {
    !matches!(c, Some(c) if c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_whole_words_only() {
        let stroke = WordPattern::new("stroke").unwrap();
        assert!(stroke.is_match("history of stroke in 2019"));
        assert!(stroke.is_match("Stroke."));
        assert!(!stroke.is_match("keystroke logging"));
        assert!(!stroke.is_match("prestroke baseline"));
        assert!(!stroke.is_match("strokes"));
    }

    #[test]
    fn test_multi_word_phrases_and_case() {
        let sob = WordPattern::new("shortness of breath").unwrap();
        assert!(sob.is_match("Reports SHORTNESS OF BREATH on exertion"));
        assert!(!sob.is_match("shortness of breathing"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let pattern = WordPattern::new("covid.9 pneumonia").unwrap();
        assert!(!pattern.is_match("covid19 pneumonia"));
        assert!(pattern.is_match("r/o covid.9 pneumonia"));
        assert!(contains_whole_word("severe pre-eclampsia noted", "severe pre-eclampsia"));
        assert!(!contains_whole_word("covid19 pneumonia", "covid.9 pneumonia"));
    }

    #[test]
    fn test_punctuation_bounds_a_match() {
        assert!(contains_whole_word("(sepsis)", "sepsis"));
        assert!(contains_whole_word("dx:sepsis,", "sepsis"));
        assert!(!contains_whole_word("urosepsis", "sepsis"));
        assert!(contains_whole_word("dx_sepsis_confirmed", "sepsis"));
        assert!(!contains_whole_word("sepsis2", "sepsis"));
    }

    #[test]
    fn test_scan_skips_embedded_occurrences() {
        assert!(contains_whole_word("urosepsis then sepsis", "sepsis"));
        assert!(contains_whole_word("aaa aa", "aa"));
        assert!(!contains_whole_word("aaaa", "aa"));
        assert!(!contains_whole_word("sepsis", ""));
        assert!(contains_whole_word("fièvre, sepsis", "sepsis"));
        assert!(!contains_whole_word("ésepsis", "sepsis"));
    }

    #[test]
    fn test_scan_agrees_with_compiled_pattern() {
        let texts = [
            "history of stroke in 2019",
            "keystroke logging",
            "stroke.",
            "strokes",
            "post-stroke",
            "stroke_2",
        ];
        let stroke = WordPattern::new("stroke").unwrap();
        for text in texts {
            assert_eq!(
                contains_whole_word(text, "stroke"),
                stroke.is_match(text),
                "{text}"
            );
        }
    }
}
