//! Risk factor and diagnostic code derivation

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::catalog::DiagnosticCodeCatalog;

/// Code reported when no catalog condition is present
pub const FALLBACK_CODE: &str = "R69.9";
pub const CODE_SEPARATOR: &str = ", ";

pub const PREGNANCY_FACTOR: &str = "Pregnant/Postpartum status";
pub const POSTPARTUM_FACTOR: &str = "Postpartum period";

/// Age bucket of a patient; the first matching rule wins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeBracket {
    /// Older than 75
    AdvancedOver75,
    /// Older than 65
    AdvancedOver65,
    /// Younger than 5
    Pediatric,
    /// Younger than 18
    Adolescent,
}

impl AgeBracket {
    pub fn from_age(age: i64) -> Option<Self> {
        if age > 75 {
            Some(Self::AdvancedOver75)
        } else if age > 65 {
            Some(Self::AdvancedOver65)
        } else if age < 5 {
            Some(Self::Pediatric)
        } else if age < 18 {
            Some(Self::Adolescent)
        } else {
            None
        }
    }

    /// Bracket for a free-text age; unparsable input has none
    pub fn parse(age: &str) -> Option<Self> {
        match age.trim().parse::<i64>() {
            Ok(years) => Self::from_age(years),
            Err(e) => {
                debug!(error = %e, "Ignoring unparsable patient age");
                None
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::AdvancedOver75 => "Advanced age (>75)",
            Self::AdvancedOver65 => "Advanced age (>65)",
            Self::Pediatric => "Pediatric patient",
            Self::Adolescent => "Adolescent patient",
        }
    }
}

impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Demographic and obstetric risk factors, age bracket first
pub fn identify_risk_factors(note: &str, patient_age: &str, gender: &str) -> Vec<String> {
    let mut factors: Vec<String> = Vec::new();
    let lowered = note.to_lowercase();

    if let Some(bracket) = AgeBracket::parse(patient_age) {
        factors.push(bracket.label().to_string());
    }

    if gender.to_lowercase() == "female" {
        if lowered.contains("pregnant") || lowered.contains("pregnancy") {
            factors.push(PREGNANCY_FACTOR.to_string());
        }
        if lowered.contains("postpartum") {
            factors.push(POSTPARTUM_FACTOR.to_string());
        }
    }

    factors.dedup();
    factors
}

/// Distinct codes of the conditions present, in catalog order
pub fn matched_codes<'a>(note: &str, catalog: &'a DiagnosticCodeCatalog) -> Vec<&'a str> {
    catalog
        .conditions()
        .filter(|(condition, code)| {
            let present = condition.is_match(note);
            if present {
                debug!(condition = condition.phrase(), code, "Diagnostic code matched");
            }
            present
        })
        .map(|(_, code)| code)
        .unique()
        .collect()
}

/// Comma-joined diagnostic codes, or [`FALLBACK_CODE`]
pub fn generate_diagnostic_codes(note: &str, catalog: &DiagnosticCodeCatalog) -> String {
    let codes = matched_codes(note, catalog);
    if codes.is_empty() {
        FALLBACK_CODE.to_string()
    } else {
        codes.join(CODE_SEPARATOR)
    }
}
