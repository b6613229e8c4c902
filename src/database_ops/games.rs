//! Canonical game lookup and upsert: exact match, trigram candidate
//! retrieval, token-difference re-scoring and edit-distance confirmation.

use std::cmp::Ordering;

use anyhow::Result;
use sqlx::Row;
use tracing::{debug, instrument};

use crate::database_ops::db::Db;
use crate::normalization::{levenshtein_within, rescore};
use crate::util::env::{env_flag, env_parse};

/// Normalized titles shorter than this never enter the matcher.
pub const MIN_CLEAN_TITLE_LEN: usize = 3;

/// Deployment-time matching thresholds.
///
/// The strict trigram profile (0.99) is the default: it sacrifices recall
/// to avoid false merges. The looser 0.75 profile used by the text-file
/// variant is one env var away (`SIMILARITY_THRESHOLD`).
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Minimum trigram similarity for candidate retrieval.
    pub trigram_threshold: f64,
    /// Maximum Levenshtein distance accepted at confirmation.
    pub max_edit_distance: usize,
    /// Minimum re-scored value accepted when edit-distance confirmation is
    /// disabled.
    pub score_floor: f64,
    /// Confirm the best candidate by edit distance (default) instead of the
    /// score floor.
    pub edit_distance_confirm: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            trigram_threshold: 0.99,
            max_edit_distance: 5,
            score_floor: 0.6,
            edit_distance_confirm: true,
        }
    }
}

impl MatcherConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            trigram_threshold: env_parse("SIMILARITY_THRESHOLD", defaults.trigram_threshold),
            max_edit_distance: env_parse("MAX_EDIT_DISTANCE", defaults.max_edit_distance),
            score_floor: env_parse("SCORE_FLOOR", defaults.score_floor),
            edit_distance_confirm: env_flag("EDIT_DISTANCE_CONFIRM", true),
        }
    }
}

/// A canonical catalog entry selected by the matcher.
#[derive(Debug, Clone)]
pub struct GameRef {
    pub id: i64,
    pub clean_title: String,
}

/// Find the canonical game for a normalized title.
///
/// Order matters: the exact case-insensitive match is a hard override and
/// wins even when a fuzzy candidate would re-score higher. Errors propagate;
/// the fail-open policy (treat a lookup failure as "no match") belongs to
/// the caller, where it is an explicit, visible choice.
#[instrument(skip(db, cfg))]
pub async fn find_canonical(
    db: &Db,
    cfg: &MatcherConfig,
    clean_title: &str,
) -> Result<Option<GameRef>> {
    let exact = sqlx::query(
        "SELECT id, clean_title FROM games WHERE LOWER(clean_title) = LOWER($1) LIMIT 1",
    )
    .bind(clean_title)
    .fetch_optional(&db.pool)
    .await?;
    if let Some(row) = exact {
        return Ok(Some(GameRef {
            id: row.get("id"),
            clean_title: row.get("clean_title"),
        }));
    }

    let candidates = sqlx::query(
        "SELECT id, clean_title,
                SIMILARITY(LOWER(clean_title), LOWER($1))::float8 AS sim
         FROM games
         WHERE SIMILARITY(LOWER(clean_title), LOWER($1)) >= $2
         ORDER BY sim DESC
         LIMIT 10",
    )
    .bind(clean_title)
    .bind(cfg.trigram_threshold)
    .fetch_all(&db.pool)
    .await?;

    if candidates.is_empty() {
        return Ok(None);
    }

    let best = candidates
        .into_iter()
        .map(|row| {
            let game = GameRef {
                id: row.get("id"),
                clean_title: row.get("clean_title"),
            };
            let sim: f64 = row.get("sim");
            let score = rescore(clean_title, &game.clean_title, sim);
            (game, score)
        })
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

    let Some((game, score)) = best else {
        return Ok(None);
    };

    let accepted = if cfg.edit_distance_confirm {
        levenshtein_within(&game.clean_title, clean_title, cfg.max_edit_distance)
    } else {
        score >= cfg.score_floor
    };

    if accepted {
        debug!(candidate = %game.clean_title, score, "fuzzy match accepted");
        Ok(Some(game))
    } else {
        debug!(candidate = %game.clean_title, score, "fuzzy match rejected");
        Ok(None)
    }
}

/// Insert a canonical game, or return the existing id for the same title.
///
/// The conflict target is the case-folded unique index; the DO UPDATE arm
/// rewrites `clean_title` to the incoming value, an idempotent no-op when
/// the value is unchanged. Safe under concurrent runs: uniqueness is the
/// storage engine's atomic upsert, not application locking.
pub async fn upsert_game(db: &Db, original_title: &str, clean_title: &str) -> Result<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO games (original_title, clean_title)
         VALUES ($1, $2)
         ON CONFLICT (LOWER(clean_title)) DO UPDATE SET clean_title = EXCLUDED.clean_title
         RETURNING id",
    )
    .bind(original_title)
    .bind(clean_title)
    .fetch_one(&db.pool)
    .await?;
    Ok(id)
}

/// All canonical titles currently in the catalog; used to seed the run's
/// unique-game report so the final count reflects the whole catalog.
pub async fn load_existing_clean_titles(db: &Db) -> Result<Vec<String>> {
    let titles = sqlx::query_scalar("SELECT clean_title FROM games")
        .fetch_all(&db.pool)
        .await?;
    Ok(titles)
}

/// Link a post to a canonical game. Duplicate pairs are ignored.
pub async fn link_game_post(db: &Db, game_id: i64, post_id: i64) -> Result<()> {
    sqlx::query(
        "INSERT INTO games_posts (game_id, post_id)
         VALUES ($1, $2)
         ON CONFLICT DO NOTHING",
    )
    .bind(game_id)
    .bind(post_id)
    .execute(&db.pool)
    .await?;
    Ok(())
}

/// Drop every game link for a post; the archive import rebuilds links on
/// each re-ingestion so they stay consistent with the latest extraction.
pub async fn clear_post_links(db: &Db, post_id: i64) -> Result<()> {
    sqlx::query("DELETE FROM games_posts WHERE post_id = $1")
        .bind(post_id)
        .execute(&db.pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_is_strict() {
        let cfg = MatcherConfig::default();
        assert_eq!(cfg.trigram_threshold, 0.99);
        assert_eq!(cfg.max_edit_distance, 5);
        assert_eq!(cfg.score_floor, 0.6);
        assert!(cfg.edit_distance_confirm);
    }

    #[test]
    fn titles_under_three_chars_are_gated() {
        assert!("It".chars().count() < MIN_CLEAN_TITLE_LEN);
        assert!("Ico".chars().count() >= MIN_CLEAN_TITLE_LEN);
    }
}
