//! Line classifier: decides whether a raw line is noise (ads, headers,
//! decorative separators, metadata) or a candidate game title.

use anyhow::Result;
use regex::Regex;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Default noise patterns, matched against the case-folded line.
///
/// Each entry is one noise category or boilerplate phrase. Evaluation is a
/// short-circuiting OR; an unmatched line is kept. Patterns are written
/// lowercase because the input is folded before matching.
const SKIP_PATTERNS: &[&str] = &[
    // digits / punctuation / whitespace only
    r"^[\d\W]+$",
    r"^\s*$",
    // non-game content markers
    r"\b(?:demo|trial|beta|early access|account|dlc|season pass)\b",
    // URLs and inline metadata markers
    r".{0,5}(http|www|\.com|\.ir|id:|number of post)",
    // decorative separator runs
    r"[=*]{4,}",
    // emoji metadata prefixes
    r"^[📥💰🔥❗️♻️✅🟢🎲🔻]",
    // Persian greeting / promo openers
    r"^(سلام|ممنون|مجموعه|پلاس|همراه|اکانت)",
    // subscription / bundle boilerplate
    r"\(some games on ea play\)",
    r"some games on ea play",
    r"ps plus",
    r"\+\s*plus",
    // dates like 12.4.2025
    r"\d+\.\d+\.\d{4}",
    // crypto price lines
    r"ps[45]:\s*\d+\s*t\s*\(btc,usdt\)",
    // numbered seller directory lines
    r"\d+\)\s*(ps gameshare|log seller's|castore|playstation kingdom|ps-station market)",
    r"4\)",
    // seller / channel boilerplate
    r"\d+xtreme ps4 & ps5",
    r"log seller",
    r"acc 33521",
    r"acc021",
    r"ps gameshare",
    r"castore",
    r"playstation kingdom",
    r"ps-station market",
    r"r1 🇺🇸 usa",
    r"🤞🏻\s*online\s*\+\s*offline",
    // hit-count promo lines
    r"100 hits",
    r"200 hits",
    r"50 hits",
    r"100x",
    r"200x",
    r"300x",
    r"500x",
    // known noisy titles / requests
    r"7 days to die",
    r"middle-earth\s*shadow",
    r"\*?بازی\s*درخواستی",
    // Persian promo phrases
    r"آفر",
    r"بی نظیر",
    r"افر",
    r"ویژه",
];

/// Pure noise predicate over single trimmed lines.
///
/// Matching is case-insensitive and diacritic-insensitive: the line is NFD
/// decomposed, combining marks are dropped and the result lowercased before
/// any pattern is tried. The original line is never modified.
pub struct SkipFilter {
    patterns: Vec<Regex>,
}

impl SkipFilter {
    /// Build the filter with the full default denylist.
    pub fn with_defaults() -> Result<Self> {
        Self::from_patterns(SKIP_PATTERNS)
    }

    /// Build a filter from an explicit pattern subset (used by tests).
    pub fn from_patterns(patterns: &[&str]) -> Result<Self> {
        let compiled = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns: compiled })
    }

    /// True when the line is noise and must never reach the normalizer.
    pub fn should_skip(&self, line: &str) -> bool {
        let folded = fold_line(line);
        self.patterns.iter().any(|p| p.is_match(&folded))
    }
}

/// Case-fold a line for matching: NFD decompose, strip combining marks,
/// lowercase.
pub(crate) fn fold_line(line: &str) -> String {
    line.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> SkipFilter {
        SkipFilter::with_defaults().unwrap()
    }

    #[test]
    fn keeps_plain_titles() {
        let f = filter();
        assert!(!f.should_skip("Days Gone"));
        assert!(!f.should_skip("Grand Theft Auto V"));
        assert!(!f.should_skip("FIFA 21 Champions"));
    }

    #[test]
    fn skips_separator_and_symbol_lines() {
        let f = filter();
        assert!(f.should_skip("======================================"));
        assert!(f.should_skip("-=-=-=-=-=-=-=-="));
        assert!(f.should_skip("1234"));
        assert!(f.should_skip("   "));
    }

    #[test]
    fn skips_forbidden_keywords_case_insensitively() {
        let f = filter();
        assert!(f.should_skip("Resident Evil 2 DEMO"));
        assert!(f.should_skip("Season Pass for Borderlands"));
        assert!(f.should_skip("PS4 Buy Account"));
        assert!(f.should_skip("Watch Dogs trial"));
    }

    #[test]
    fn skips_urls_and_metadata_markers() {
        let f = filter();
        assert!(f.should_skip("https://t.me/somechannel"));
        assert!(f.should_skip("id: 42"));
        assert!(f.should_skip("Number of post: 12"));
    }

    #[test]
    fn skips_emoji_metadata_lines() {
        let f = filter();
        assert!(f.should_skip("💰Price PS4: 100"));
        assert!(f.should_skip("♻️Price: 250"));
        assert!(f.should_skip("🔥 OFF 50%"));
    }

    #[test]
    fn skips_seller_boilerplate_and_promo() {
        let f = filter();
        assert!(f.should_skip("PS GameShare"));
        assert!(f.should_skip("Log Seller's"));
        assert!(f.should_skip("100 Hits"));
        assert!(f.should_skip("پلاس 1 ساله"));
    }

    #[test]
    fn diacritics_do_not_hide_noise() {
        // Combining marks are stripped before matching.
        let f = filter();
        assert!(f.should_skip("Démo"));
    }

    #[test]
    fn injected_subset_only_matches_its_patterns() {
        let f = SkipFilter::from_patterns(&[r"^zzz"]).unwrap();
        assert!(f.should_skip("zzz noise"));
        assert!(!f.should_skip("1234"));
    }
}
