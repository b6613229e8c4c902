//! Post extractor: turns one raw delimited block (or archive row) into a
//! structured [`PostRecord`] plus its candidate title lines.

use anyhow::Result;
use regex::Regex;

use crate::database_ops::posts::{Platform, PostRecord};

/// Why a block produced no post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No `id: <digits>` line; the block is not a post.
    MissingId,
    /// The block matched the advertisement denylist.
    Advertisement,
}

/// Outcome of extracting one raw block.
#[derive(Debug)]
pub enum Extraction {
    Post(PostRecord),
    Skip(SkipReason),
}

/// Price parsed for one platform. A textual "sold" marker yields no amount
/// and sets the flag instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceInfo {
    pub amount: Option<i64>,
    pub sold: bool,
}

/// Ordered fallback chain for one platform's price marker.
///
/// Platform-specific markers come first; the generic "Price:" forms are
/// deliberately reused for the remaining platform when only one
/// platform-specific price is present in the source text.
pub fn build_price_pattern(platform: Platform) -> Result<Regex> {
    let label = platform.label();
    let pattern = format!(
        "(?i)💰\\s*Price\\s*{label}\\s*:\\s*(\\S+)\
         |💸\\s*Price\\s*{label}\\s*:\\s*(\\S+)\
         |♻️\\s*Price\\s*:\\s*(\\S+)\
         |💷\\s*Price\\s*:\\s*(\\S+)"
    );
    Ok(Regex::new(&pattern)?)
}

/// Compiled extraction patterns, built once per pipeline.
pub struct Extractor {
    id_line: Regex,
    id_line_strip: Regex,
    ad_markers: Regex,
    escaped_separator: Regex,
    separator_runs: Regex,
    escaped_newline: Regex,
    region: Regex,
    price_ps4: Regex,
    price_ps5: Regex,
    metadata_line: Regex,
    block_delimiter: Regex,
}

impl Extractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            id_line: Regex::new(r"id:\s*(\d+)")?,
            id_line_strip: Regex::new(r"id:\s*\d+\s*\n?")?,
            ad_markers: Regex::new(r"(?i)Buy\s*\(خرید\)|جوین بشید و پیام بدید")?,
            escaped_separator: Regex::new(r"\\([=-])")?,
            separator_runs: Regex::new(r"[=*]{4,}")?,
            escaped_newline: Regex::new(r"\\n")?,
            region: Regex::new(r"(?i)🌐\s*Region?\s*(\d+)")?,
            price_ps4: build_price_pattern(Platform::Ps4)?,
            price_ps5: build_price_pattern(Platform::Ps5)?,
            metadata_line: Regex::new(r"(?i)🌐|💰|💸|♻️|💷|🔥|❗️|@|=-|PS\d")?,
            block_delimiter: Regex::new(r"={10,}|-{10,}")?,
        })
    }

    /// Split a source file into post blocks on long `=`/`-` runs.
    pub fn split_blocks<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.block_delimiter
            .split(text)
            .map(str::trim)
            .filter(|block| !block.is_empty())
            .collect()
    }

    /// Extract a structured post from one raw block, or say why not.
    ///
    /// No partial record is ever produced: a block without an identifier or
    /// matching the ad denylist yields [`Extraction::Skip`].
    pub fn extract_post(&self, raw: &str) -> Extraction {
        let Some(id) = self
            .id_line
            .captures(raw)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<i64>().ok())
        else {
            return Extraction::Skip(SkipReason::MissingId);
        };

        if self.is_advertisement(raw) {
            return Extraction::Skip(SkipReason::Advertisement);
        }

        let content = self.clean_content(raw);
        let ps4 = self.extract_price(raw, Platform::Ps4);
        let ps5 = self.extract_price(raw, Platform::Ps5);
        let title_lines = self.title_lines(&content);

        Extraction::Post(PostRecord {
            id,
            content,
            region: self.extract_region(raw),
            price_ps4: ps4.amount,
            price_ps5: ps5.amount,
            is_ps4_sold: ps4.sold,
            is_ps5_sold: ps5.sold,
            title_lines,
            ..Default::default()
        })
    }

    /// Seller self-promotion blocks never reach the post table.
    pub fn is_advertisement(&self, content: &str) -> bool {
        self.ad_markers.is_match(content)
    }

    /// Stored content: identifier line removed, escape sequences resolved,
    /// decorative separator runs dropped.
    pub fn clean_content(&self, raw: &str) -> String {
        let content = self.id_line_strip.replace(raw, "");
        let content = self.escaped_separator.replace_all(&content, "${1}");
        let content = self.separator_runs.replace_all(&content, "");
        let content = self.escaped_newline.replace_all(&content, "\n");
        content.trim().to_string()
    }

    pub fn extract_region(&self, content: &str) -> Option<String> {
        self.region
            .captures(content)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Price for one platform via the ordered marker chain; the first
    /// participating capture wins. "Sold" text clears the amount and sets
    /// the flag.
    pub fn extract_price(&self, content: &str, platform: Platform) -> PriceInfo {
        let pattern = match platform {
            Platform::Ps4 => &self.price_ps4,
            Platform::Ps5 => &self.price_ps5,
        };
        let Some(caps) = pattern.captures(content) else {
            return PriceInfo::default();
        };
        let value = (1..=4)
            .find_map(|i| caps.get(i))
            .map(|m| m.as_str())
            .unwrap_or("");

        let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
        PriceInfo {
            amount: digits.parse::<i64>().ok().filter(|v| *v > 0),
            sold: value.to_lowercase().contains("sold"),
        }
    }

    /// Candidate title lines: everything left after dropping metadata lines
    /// and fragments of one or two characters.
    pub fn title_lines(&self, content: &str) -> Vec<String> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| line.chars().count() > 2 && !self.metadata_line.is_match(line))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> Extractor {
        Extractor::new().unwrap()
    }

    #[test]
    fn extracts_structured_post_from_block() {
        let block = "id: 42\nFIFA 21 Champions\n🌐Region 1\n💰Price PS4: 100\n💰Price PS5: Sold";
        let Extraction::Post(post) = extractor().extract_post(block) else {
            panic!("expected a post");
        };
        assert_eq!(post.id, 42);
        assert_eq!(post.region.as_deref(), Some("1"));
        assert_eq!(post.price_ps4, Some(100));
        assert_eq!(post.price_ps5, None);
        assert!(!post.is_ps4_sold);
        assert!(post.is_ps5_sold);
        assert_eq!(post.title_lines, vec!["FIFA 21 Champions".to_string()]);
    }

    #[test]
    fn block_without_id_is_skipped() {
        let out = extractor().extract_post("Elden Ring\n🌐Region 2");
        assert!(matches!(out, Extraction::Skip(SkipReason::MissingId)));
    }

    #[test]
    fn ad_block_is_skipped() {
        let block = "id: 7\nBuy (خرید)\nElden Ring";
        let out = extractor().extract_post(block);
        assert!(matches!(out, Extraction::Skip(SkipReason::Advertisement)));
    }

    #[test]
    fn id_line_is_stripped_from_stored_content() {
        let block = "id: 9\nDays Gone\n====\nGod of War";
        let Extraction::Post(post) = extractor().extract_post(block) else {
            panic!("expected a post");
        };
        assert!(!post.content.contains("id:"));
        assert!(!post.content.contains("===="));
    }

    #[test]
    fn price_pattern_matches_all_marker_variants() {
        let e = extractor();
        assert_eq!(
            e.extract_price("💸Price PS4: 250", Platform::Ps4),
            PriceInfo {
                amount: Some(250),
                sold: false
            }
        );
        assert_eq!(
            e.extract_price("♻️Price: 300", Platform::Ps5),
            PriceInfo {
                amount: Some(300),
                sold: false
            }
        );
        assert_eq!(
            e.extract_price("💷Price: 80", Platform::Ps4),
            PriceInfo {
                amount: Some(80),
                sold: false
            }
        );
    }

    #[test]
    fn generic_price_marker_is_reused_for_missing_platform() {
        // Only PS4 has a platform-specific price; the generic marker fills
        // in the other platform. Documented, intentional ambiguity.
        let e = extractor();
        let content = "💰Price PS4: 100\n♻️Price: 200";
        assert_eq!(e.extract_price(content, Platform::Ps4).amount, Some(100));
        assert_eq!(e.extract_price(content, Platform::Ps5).amount, Some(200));
    }

    #[test]
    fn sold_marker_clears_amount_and_sets_flag() {
        let info = extractor().extract_price("💰Price PS4: Sold", Platform::Ps4);
        assert_eq!(info.amount, None);
        assert!(info.sold);
    }

    #[test]
    fn build_price_pattern_is_platform_specific() {
        let ps4 = build_price_pattern(Platform::Ps4).unwrap();
        let ps5 = build_price_pattern(Platform::Ps5).unwrap();
        assert!(ps4.is_match("💰Price PS4: 90"));
        assert!(!ps4.is_match("💰Price PS5: 90"));
        assert!(ps5.is_match("💰Price PS5: 90"));
        assert!(!ps5.is_match("💰Price PS4: 90"));
    }

    #[test]
    fn splits_blocks_on_long_separator_runs() {
        let e = extractor();
        let text = "id: 1\nA\n======================================\nid: 2\nB\n----------\nid: 3\nC";
        let blocks = e.split_blocks(text);
        assert_eq!(blocks.len(), 3);
        assert!(blocks[0].contains("id: 1"));
        assert!(blocks[2].contains("id: 3"));
    }

    #[test]
    fn mixed_separator_lines_are_not_delimiters() {
        let e = extractor();
        let blocks = e.split_blocks("id: 1\nA\n=-=-=-=-=-=-=-=-=\nstill same block");
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn unescapes_archive_escape_sequences() {
        let e = extractor();
        let cleaned = e.clean_content("id: 5\nDays Gone\\nGod of War \\= test");
        assert!(cleaned.contains("Days Gone\nGod of War"));
        assert!(cleaned.contains("= test"));
    }

    #[test]
    fn metadata_lines_never_become_titles() {
        let e = extractor();
        let lines = e.title_lines("Elden Ring\n🌐Region 1\n💰Price PS4: 100\n@seller\nOK\nGod of War");
        assert_eq!(lines, vec!["Elden Ring".to_string(), "God of War".to_string()]);
    }
}
