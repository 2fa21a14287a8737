use base64::{engine::general_purpose, Engine as _};
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};

/// Literal identifier patterns
#[allow(clippy::unwrap_used)]
mod patterns {
    use lazy_static::lazy_static;
    use regex::Regex;

    lazy_static! {
        pub static ref EMAIL_REGEX: Regex =
            Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap();
        pub static ref PHONE_REGEX: Regex =
            Regex::new(r"\b(?:\+1[-.\s]?)?\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}\b").unwrap();
        pub static ref SSN_REGEX: Regex = Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap();
        pub static ref MRN_REGEX: Regex = Regex::new(r"(?i)\bMRN[:#\s]*\d{4,}\b").unwrap();
        pub static ref DATE_REGEX: Regex = Regex::new(r"\b\d{1,2}/\d{1,2}/\d{2,4}\b").unwrap();
    }
}

use patterns::{DATE_REGEX, EMAIL_REGEX, MRN_REGEX, PHONE_REGEX, SSN_REGEX};

/// Which identifier classes to redact
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub redact_emails: bool,
    pub redact_phones: bool,
    pub redact_ssn: bool,
    pub redact_mrn: bool,
    pub redact_dates: bool,
    pub hash_for_correlation: bool,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_emails: true,
            redact_phones: true,
            redact_ssn: true,
            redact_mrn: true,
            redact_dates: true,
            hash_for_correlation: false,
        }
    }
}

/// Identifier redactor for log lines quoting clinical notes
#[derive(Debug, Clone, Default)]
pub struct PiiRedactor {
    config: RedactionConfig,
}

impl PiiRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();

        // SSN before phone: a phone pattern would swallow part of an SSN.
        if self.config.redact_ssn {
            result = self.replace(&SSN_REGEX, &result, "SSN", "***-**-****");
        }
        if self.config.redact_emails {
            result = self.replace(&EMAIL_REGEX, &result, "EMAIL", "***@***");
        }
        if self.config.redact_phones {
            result = self.replace(&PHONE_REGEX, &result, "PHONE", "(***) ***-****");
        }
        if self.config.redact_mrn {
            result = self.replace(&MRN_REGEX, &result, "MRN", "MRN[REDACTED]");
        }
        if self.config.redact_dates {
            result = self.replace(&DATE_REGEX, &result, "DATE", "**/**/****");
        }

        result
    }

    /// Redact, then cut to at most `max_chars` characters
    pub fn preview(&self, text: &str, max_chars: usize) -> String {
        let redacted = self.redact(text);
        let mut chars = redacted.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }

    fn replace(&self, pattern: &Regex, text: &str, label: &str, mask: &str) -> String {
        pattern
            .replace_all(text, |caps: &Captures| {
                if self.config.hash_for_correlation {
                    format!("{label}[{}]", hash_value(caps.get(0).map_or("", |m| m.as_str())))
                } else {
                    mask.to_string()
                }
            })
            .into_owned()
    }
}

fn hash_value(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    let prefix: Vec<u8> = digest.iter().take(8).copied().collect();
    general_purpose::STANDARD.encode(prefix)
}
