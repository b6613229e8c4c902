//! Token-difference re-scoring and edit-distance confirmation for fuzzy
//! candidate selection.
//!
//! Trigram similarity alone over-matches titles that share common words
//! ("Call of Duty X" vs "Call of Duty Y"); penalizing by the count of
//! words unique to either side suppresses false merges inside a franchise
//! while still catching true near-duplicates.

use strsim::levenshtein;

/// Score forced when both titles tokenize identically, guarding against
/// trigram under-scoring of short exact matches.
pub const EXACT_MATCH_SCORE: f64 = 2.0;

/// Penalty applied per word present in only one of the two titles.
const TOKEN_DIFF_PENALTY: f64 = 0.1;

/// Count of whitespace-delimited words (case folded) present in exactly one
/// of the two strings.
pub fn token_difference(a: &str, b: &str) -> usize {
    let a_tokens: Vec<String> = a.split_whitespace().map(str::to_lowercase).collect();
    let b_tokens: Vec<String> = b.split_whitespace().map(str::to_lowercase).collect();

    let only_in_a = a_tokens.iter().filter(|t| !b_tokens.contains(t)).count();
    let only_in_b = b_tokens.iter().filter(|t| !a_tokens.contains(t)).count();
    only_in_a + only_in_b
}

/// Re-score a trigram candidate against the input title.
///
/// An exact case-insensitive match forces [`EXACT_MATCH_SCORE`]; otherwise
/// the trigram similarity is reduced by the symmetric token difference.
pub fn rescore(input: &str, candidate: &str, similarity: f64) -> f64 {
    if input.to_lowercase() == candidate.to_lowercase() {
        return EXACT_MATCH_SCORE;
    }
    similarity - TOKEN_DIFF_PENALTY * token_difference(input, candidate) as f64
}

/// Case-folded Levenshtein confirmation: true when the edit distance between
/// the two titles is within `max_distance`.
pub fn levenshtein_within(a: &str, b: &str, max_distance: usize) -> bool {
    levenshtein(&a.to_lowercase(), &b.to_lowercase()) <= max_distance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_tokens_force_exact_score() {
        assert_eq!(rescore("Days Gone", "days gone", 0.80), EXACT_MATCH_SCORE);
    }

    #[test]
    fn token_difference_is_symmetric() {
        assert_eq!(
            token_difference("Call of Duty Black Ops III", "Call of Duty Modern Warfare"),
            5
        );
        assert_eq!(
            token_difference("Call of Duty Modern Warfare", "Call of Duty Black Ops III"),
            5
        );
        assert_eq!(token_difference("Days Gone", "Days Gone"), 0);
    }

    #[test]
    fn franchise_siblings_are_penalized_below_floor() {
        // Five differing words knock 0.5 off even a high trigram score.
        let score = rescore(
            "Call of Duty Black Ops III",
            "Call of Duty Modern Warfare",
            0.82,
        );
        assert!(score < 0.6, "score {score} should fall under the floor");
    }

    #[test]
    fn near_duplicates_keep_their_score() {
        let score = rescore("Grand Theft Auto V", "Grand Theft Auto V Premium", 0.93);
        assert!((score - 0.83).abs() < 1e-9);
    }

    #[test]
    fn levenshtein_confirmation_bounds() {
        assert!(levenshtein_within("Grand Theft Auto V", "grand theft auto v", 5));
        assert!(levenshtein_within("Watch Dogs", "Watch Dogs 2", 5));
        assert!(!levenshtein_within(
            "Call of Duty Black Ops III",
            "Call of Duty Modern Warfare",
            5
        ));
    }
}
