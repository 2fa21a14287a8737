//! Heuristic confidence of an extraction

pub const BASE_SCORE: u32 = 50;
pub const MAX_SCORE: u32 = 95;

const LENGTH_STEPS: &[usize] = &[200, 500];
const LENGTH_BONUS: u32 = 10;

const SECTION_MARKERS: &[&str] = &[
    "vital signs",
    "physical exam",
    "assessment",
    "plan",
    "impression",
];
const SECTION_BONUS: u32 = 5;
const MAX_SECTION_BONUS: u32 = 15;

const RISK_WORD_BONUS: u32 = 2;
const MAX_RISK_WORD_BONUS: u32 = 10;

/// Score in `[50, 95]` from note length, section markers and risk word count
///
/// Length counts characters, not bytes. Section markers are plain substrings
/// of the lowercased note.
pub fn calculate_confidence(note: &str, risk_word_count: usize) -> u32 {
    let length = note.chars().count();
    let lowered = note.to_lowercase();

    let length_bonus: u32 = LENGTH_STEPS
        .iter()
        .filter(|&&step| length > step)
        .map(|_| LENGTH_BONUS)
        .sum();

    let sections = SECTION_MARKERS
        .iter()
        .filter(|marker| lowered.contains(*marker))
        .count();
    let section_bonus = bonus(sections, SECTION_BONUS, MAX_SECTION_BONUS);

    let risk_bonus = bonus(risk_word_count, RISK_WORD_BONUS, MAX_RISK_WORD_BONUS);

    (BASE_SCORE + length_bonus + section_bonus + risk_bonus).min(MAX_SCORE)
}

fn bonus(hits: usize, per_hit: u32, cap: u32) -> u32 {
    u32::try_from(hits)
        .unwrap_or(u32::MAX)
        .saturating_mul(per_hit)
        .min(cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_plain_note_scores_base() {
        assert_eq!(calculate_confidence("Headache.", 0), BASE_SCORE);
        assert_eq!(calculate_confidence("", 0), BASE_SCORE);
    }

    #[test]
    fn test_length_steps() {
        assert_eq!(calculate_confidence(&"x".repeat(200), 0), 50);
        assert_eq!(calculate_confidence(&"x".repeat(201), 0), 60);
        assert_eq!(calculate_confidence(&"x".repeat(501), 0), 70);
    }

    #[test]
    fn test_length_counts_characters() {
        // 150 characters is 300 bytes
        assert_eq!(calculate_confidence(&"é".repeat(150), 0), 50);
        assert_eq!(calculate_confidence(&"é".repeat(201), 0), 60);
    }

    #[test]
    fn test_section_bonus_is_capped() {
        assert_eq!(calculate_confidence("Assessment and Plan", 0), 60);
        assert_eq!(
            calculate_confidence("vital signs, physical exam, assessment, plan, impression", 0),
            65
        );
    }

    #[test]
    fn test_risk_word_bonus_is_capped() {
        assert_eq!(calculate_confidence("note", 1), 52);
        assert_eq!(calculate_confidence("note", 5), 60);
        assert_eq!(calculate_confidence("note", 40), 60);
    }

    #[test]
    fn test_score_never_exceeds_max() {
        let note = format!("vital signs physical exam assessment plan {}", "x".repeat(600));
        assert_eq!(calculate_confidence(&note, 10), MAX_SCORE);
    }
}
