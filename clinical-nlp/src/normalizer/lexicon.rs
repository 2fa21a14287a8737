//! Word lists backing the rule-based normalizer
//!
//! Contains English stopwords, irregular lemmas and clinical abbreviations
//! used to map note text onto catalog vocabulary.

use std::collections::{HashMap, HashSet};

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "became", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each",
    "either", "else", "ever", "every", "few", "for", "from", "further", "had", "has", "have",
    "having", "he", "her", "here", "hers", "herself", "him", "himself", "his", "how", "however",
    "i", "if", "in", "into", "is", "it", "its", "itself", "just", "may", "me", "might", "more",
    "most", "much", "must", "my", "myself", "neither", "no", "nor", "not", "now", "of", "off",
    "on", "once", "only", "or", "other", "our", "ours", "out", "over", "own", "per", "same",
    "she", "should", "since", "so", "some", "such", "than", "that", "the", "their", "theirs",
    "them", "then", "there", "these", "they", "this", "those", "though", "through", "thus", "to",
    "too", "under", "until", "up", "upon", "us", "very", "via", "was", "we", "well", "were",
    "what", "when", "where", "whether", "which", "while", "who", "whom", "whose", "why", "will",
    "with", "within", "without", "would", "yet", "you", "your", "yours",
];

const IRREGULAR_LEMMAS: &[(&str, &str)] = &[
    ("bled", "bleed"),
    ("children", "child"),
    ("diabetes", "diabetes"),
    ("diagnoses", "diagnosis"),
    ("dying", "die"),
    ("emboli", "embolus"),
    ("feet", "foot"),
    ("fell", "fall"),
    ("fallen", "fall"),
    ("felt", "feel"),
    ("found", "find"),
    ("given", "give"),
    ("gave", "give"),
    ("lying", "lie"),
    ("men", "man"),
    ("metastases", "metastasis"),
    ("stenoses", "stenosis"),
    ("taken", "take"),
    ("took", "take"),
    ("teeth", "tooth"),
    ("thromboses", "thrombosis"),
    ("women", "woman"),
    ("worse", "bad"),
    ("worst", "bad"),
];

/// Abbreviation → expanded form
const ABBREVIATIONS: &[(&str, &str)] = &[
    // Vital signs
    ("bp", "blood pressure"),
    ("hr", "heart rate"),
    ("rr", "respiratory rate"),
    ("temp", "temperature"),
    ("spo2", "oxygen saturation"),
    // Conditions
    ("afib", "atrial fibrillation"),
    ("ams", "altered mental status"),
    ("cad", "coronary artery disease"),
    ("chf", "congestive heart failure"),
    ("ckd", "chronic kidney disease"),
    ("cva", "stroke"),
    ("dm", "diabetes"),
    ("dvt", "deep vein thrombosis"),
    ("gib", "gastrointestinal hemorrhage"),
    ("htn", "hypertension"),
    ("ich", "intracranial hemorrhage"),
    ("loc", "loss of consciousness"),
    ("mi", "myocardial infarction"),
    ("sah", "subarachnoid hemorrhage"),
    ("sob", "shortness of breath"),
    ("tia", "transient ischemic attack"),
    ("uti", "urinary tract infection"),
];

const HONORIFICS: &[&str] = &["dr", "mr", "mrs", "ms", "miss", "prof", "nurse"];

const ORGANIZATION_SUFFIXES: &[&str] = &[
    "hospital",
    "clinic",
    "medical center",
    "health system",
    "pharmacy",
    "laboratories",
    "university",
];

const LOCATION_SUFFIXES: &[&str] = &["county", "city", "province", "street", "avenue"];

/// Immutable word lists used by the normalizer
#[derive(Debug, Clone)]
pub struct Lexicon {
    stopwords: HashSet<&'static str>,
    irregular: HashMap<&'static str, &'static str>,
    abbreviations: HashMap<&'static str, &'static str>,
    honorifics: Vec<&'static str>,
    organization_suffixes: Vec<&'static str>,
    location_suffixes: Vec<&'static str>,
}

impl Lexicon {
    /// English clinical lexicon
    pub fn english() -> Self {
        Self {
            stopwords: STOPWORDS.iter().copied().collect(),
            irregular: IRREGULAR_LEMMAS.iter().copied().collect(),
            abbreviations: ABBREVIATIONS.iter().copied().collect(),
            honorifics: HONORIFICS.to_vec(),
            organization_suffixes: ORGANIZATION_SUFFIXES.to_vec(),
            location_suffixes: LOCATION_SUFFIXES.to_vec(),
        }
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    pub fn expand(&self, abbreviation: &str) -> Option<&'static str> {
        self.abbreviations.get(abbreviation).copied()
    }

    pub fn honorifics(&self) -> &[&'static str] {
        &self.honorifics
    }

    pub fn organization_suffixes(&self) -> &[&'static str] {
        &self.organization_suffixes
    }

    pub fn location_suffixes(&self) -> &[&'static str] {
        &self.location_suffixes
    }

    /// Dictionary form of a lowercase word
    pub fn lemmatize(&self, word: &str) -> String {
        if let Some(lemma) = self.irregular.get(word) {
            return (*lemma).to_string();
        }
        if let Some(lemma) = strip_inflection(word) {
            return lemma;
        }
        word.to_string()
    }
}

fn strip_inflection(word: &str) -> Option<String> {
    let len = word.chars().count();

    if len > 5 {
        if let Some(stem) = word.strip_suffix("ing") {
            return Some(restore_stem(stem));
        }
    }

    if len > 4 && !word.ends_with("eed") {
        if let Some(stem) = word.strip_suffix("ied") {
            return Some(format!("{stem}y"));
        }
        if let Some(stem) = word.strip_suffix("ed") {
            return Some(restore_stem(stem));
        }
    }

    if len > 4 {
        if let Some(stem) = word.strip_suffix("ies") {
            return Some(format!("{stem}y"));
        }
        for suffix in ["ches", "shes", "sses", "xes", "zes"] {
            if word.ends_with(suffix) {
                return word.strip_suffix("es").map(str::to_string);
            }
        }
    }

    if len > 3
        && word.ends_with('s')
        && !["ss", "us", "is", "ous"].iter().any(|keep| word.ends_with(keep))
    {
        return word.strip_suffix('s').map(str::to_string);
    }

    None
}

/// Undo the spelling changes of an `-ing`/`-ed` suffix
fn restore_stem(stem: &str) -> String {
    let mut tail = stem.chars().rev();
    if let (Some(last), Some(before)) = (tail.next(), tail.next()) {
        if last == before && !matches!(last, 'l' | 's' | 'z' | 'e' | 'o') {
            let mut shortened = stem.to_string();
            shortened.pop();
            return shortened;
        }
    }
    let long_at = stem.ends_with("at") && stem.chars().count() > 5;
    if long_at
        || ["iz", "yz", "os", "us", "as", "ur", "v", "c", "ak", "bl"]
            .iter()
            .any(|ending| stem.ends_with(ending))
    {
        return format!("{stem}e");
    }
    stem.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_forms() {
        let lexicon = Lexicon::english();
        assert_eq!(lexicon.lemmatize("seizures"), "seizure");
        assert_eq!(lexicon.lemmatize("tremors"), "tremor");
        assert_eq!(lexicon.lemmatize("injuries"), "injury");
        assert_eq!(lexicon.lemmatize("rashes"), "rash");
        assert_eq!(lexicon.lemmatize("diagnoses"), "diagnosis");
    }

    #[test]
    fn test_words_that_only_look_plural() {
        let lexicon = Lexicon::english();
        assert_eq!(lexicon.lemmatize("sepsis"), "sepsis");
        assert_eq!(lexicon.lemmatize("nervous"), "nervous");
        assert_eq!(lexicon.lemmatize("loss"), "loss");
    }

    #[test]
    fn test_verb_forms() {
        let lexicon = Lexicon::english();
        assert_eq!(lexicon.lemmatize("bleeding"), "bleed");
        assert_eq!(lexicon.lemmatize("elevated"), "elevate");
        assert_eq!(lexicon.lemmatize("confused"), "confuse");
        assert_eq!(lexicon.lemmatize("worsening"), "worsen");
        assert_eq!(lexicon.lemmatize("stopped"), "stop");
        assert_eq!(lexicon.lemmatize("delayed"), "delay");
        assert_eq!(lexicon.lemmatize("bled"), "bleed");
        assert_eq!(lexicon.lemmatize("decreased"), "decrease");
        assert_eq!(lexicon.lemmatize("sweating"), "sweat");
    }

    #[test]
    fn test_abbreviation_expansion() {
        let lexicon = Lexicon::english();
        assert_eq!(lexicon.expand("sob"), Some("shortness of breath"));
        assert_eq!(lexicon.expand("cva"), Some("stroke"));
        assert_eq!(lexicon.expand("stroke"), None);
    }
}
