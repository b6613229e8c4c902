//! Ingestion orchestrator: drives source text through extraction,
//! normalization, matching and persistence, one post at a time.

pub mod archive;
pub mod extract;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::database_ops::db::Db;
use crate::database_ops::games::{
    clear_post_links, find_canonical, link_game_post, load_existing_clean_titles, upsert_game,
    MatcherConfig, MIN_CLEAN_TITLE_LEN,
};
use crate::database_ops::posts::{upsert_post, PostRecord};
use crate::ingest::extract::{Extraction, Extractor, SkipReason};
use crate::normalization::TitleNormalizer;

/// Everything the ingestion chain needs, built once per run.
pub struct Pipeline {
    pub normalizer: TitleNormalizer,
    pub extractor: Extractor,
    pub matcher: MatcherConfig,
}

impl Pipeline {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            normalizer: TitleNormalizer::with_defaults()?,
            extractor: Extractor::new()?,
            matcher: MatcherConfig::from_env(),
        })
    }
}

/// Per-run counters plus the canonical-title seen-set used for the final
/// unique-game report. Reporting only; uniqueness is enforced by the store.
#[derive(Debug, Default)]
pub struct IngestStats {
    pub posts_written: u64,
    pub posts_skipped: u64,
    pub lines_skipped: u64,
    pub links_written: u64,
    pub matched_existing: u64,
    unique_games: HashSet<String>,
}

impl IngestStats {
    pub fn preload_games<I: IntoIterator<Item = String>>(&mut self, titles: I) {
        self.unique_games.extend(titles);
    }

    pub fn note_game(&mut self, clean_title: &str) {
        self.unique_games.insert(clean_title.to_string());
    }

    pub fn unique_game_count(&self) -> usize {
        self.unique_games.len()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            generated_at: chrono::Utc::now().to_rfc3339(),
            posts_written: self.posts_written,
            posts_skipped: self.posts_skipped,
            lines_skipped: self.lines_skipped,
            links_written: self.links_written,
            matched_existing: self.matched_existing,
            unique_games_total: self.unique_games.len(),
        }
    }
}

/// Serializable end-of-run report.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub generated_at: String,
    pub posts_written: u64,
    pub posts_skipped: u64,
    pub lines_skipped: u64,
    pub links_written: u64,
    pub matched_existing: u64,
    pub unique_games_total: usize,
}

/// Ingest every source file, in order. A source that cannot be read is
/// logged and skipped; a post that fails is logged and never aborts the
/// batch. Returns the accumulated run statistics.
pub async fn run(db: &Db, pipeline: &Pipeline, sources: &[PathBuf]) -> Result<IngestStats> {
    let mut stats = IngestStats::default();
    stats.preload_games(
        load_existing_clean_titles(db)
            .await
            .context("failed to load existing games")?,
    );
    info!(
        existing = stats.unique_game_count(),
        "loaded existing games from catalog"
    );

    for source in sources {
        let text = match tokio::fs::read_to_string(source).await {
            Ok(text) => text,
            Err(err) => {
                warn!(source = %source.display(), error = %err, "failed to read source; skipping");
                continue;
            }
        };
        let source_name = source_file_name(source);

        let blocks = pipeline.extractor.split_blocks(&text);
        info!(source = %source_name, blocks = blocks.len(), "processing source");
        for block in blocks {
            process_block(db, pipeline, &mut stats, block, &source_name).await;
        }
    }

    Ok(stats)
}

/// Process one delimited block: extract, persist the post, then run every
/// surviving title line through the normalization/matching chain and link
/// the resulting games.
///
/// Errors never cross between posts: a failure is logged with the post id
/// and source file and the batch moves on.
async fn process_block(
    db: &Db,
    pipeline: &Pipeline,
    stats: &mut IngestStats,
    block: &str,
    source_file: &str,
) {
    let mut post = match pipeline.extractor.extract_post(block) {
        Extraction::Post(post) => post,
        Extraction::Skip(reason) => {
            stats.posts_skipped += 1;
            match reason {
                SkipReason::MissingId => info!(source = source_file, "block without id skipped"),
                SkipReason::Advertisement => {
                    info!(source = source_file, "advertisement block skipped")
                }
            }
            return;
        }
    };
    post.source_file = Some(source_file.to_string());

    if let Err(err) = persist_post_and_links(db, pipeline, stats, &post).await {
        warn!(
            post_id = post.id,
            source = source_file,
            error = %err,
            "post processing failed; continuing with next post"
        );
    }
}

async fn persist_post_and_links(
    db: &Db,
    pipeline: &Pipeline,
    stats: &mut IngestStats,
    post: &PostRecord,
) -> Result<()> {
    upsert_post(db, post).await?;
    stats.posts_written += 1;

    for line in &post.title_lines {
        if let Some(game_id) = process_title_line(db, pipeline, stats, line).await? {
            link_game_post(db, game_id, post.id).await?;
            stats.links_written += 1;
        }
    }
    Ok(())
}

/// Run one raw title line through classifier, normalizer, matcher and
/// upserter. Returns the canonical game id, or `None` when the line was
/// noise or normalized away.
///
/// A failed candidate lookup is treated as "no match" (fail-open): ingestion
/// must not block on a lookup error, at worst a fresh canonical row is
/// created and later merged by hand.
pub(crate) async fn process_title_line(
    db: &Db,
    pipeline: &Pipeline,
    stats: &mut IngestStats,
    line: &str,
) -> Result<Option<i64>> {
    let Some(clean_title) = pipeline.normalizer.normalize(line) else {
        stats.lines_skipped += 1;
        return Ok(None);
    };
    if clean_title.chars().count() < MIN_CLEAN_TITLE_LEN {
        stats.lines_skipped += 1;
        return Ok(None);
    }

    let matched = match find_canonical(db, &pipeline.matcher, &clean_title).await {
        Ok(matched) => matched,
        Err(err) => {
            warn!(title = %clean_title, error = %err, "candidate lookup failed; treating as no match");
            None
        }
    };

    if let Some(game) = matched {
        stats.matched_existing += 1;
        return Ok(Some(game.id));
    }

    let game_id = upsert_game(db, line, &clean_title).await?;
    stats.note_game(&clean_title);
    Ok(Some(game_id))
}

/// Rebuild the game links for one post from its freshly extracted lines.
/// Used by the archive import, which replaces links on every re-ingestion.
pub(crate) async fn relink_post_games(
    db: &Db,
    pipeline: &Pipeline,
    stats: &mut IngestStats,
    post_id: i64,
    title_lines: &[String],
) -> Result<()> {
    clear_post_links(db, post_id).await?;
    for line in title_lines {
        if let Some(game_id) = process_title_line(db, pipeline, stats, line).await? {
            link_game_post(db, game_id, post_id).await?;
            stats.links_written += 1;
        }
    }
    Ok(())
}

fn source_file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_count_distinct_canonical_titles() {
        let mut stats = IngestStats::default();
        stats.preload_games(vec!["Days Gone".to_string(), "Elden Ring".to_string()]);
        stats.note_game("Days Gone");
        stats.note_game("FIFA 21");
        assert_eq!(stats.unique_game_count(), 3);

        let summary = stats.summary();
        assert_eq!(summary.unique_games_total, 3);
    }

    #[test]
    fn source_name_is_the_file_name() {
        assert_eq!(
            source_file_name(Path::new("/data/exports/channel_1.txt")),
            "channel_1.txt"
        );
    }
}
