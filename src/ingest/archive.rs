//! Archive import: replays an exported bot database (SQLite) through the
//! same extraction and normalization chain as the text sources, carrying
//! the richer per-post fields the exports do not have.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};

use crate::database_ops::db::{open_sqlite, Db};
use crate::database_ops::posts::{
    channel_exists, ensure_channel, upsert_channel, upsert_post, Platform, PostRecord,
};
use crate::ingest::{relink_post_games, IngestStats, Pipeline};

/// Import channels and posts from the archive at `path`.
///
/// Post rows are fully overwritten on conflict and their game links are
/// deleted and rebuilt, so re-imports stay consistent with the latest
/// extraction. A failing row is logged and skipped.
pub async fn import_archive(
    db: &Db,
    pipeline: &Pipeline,
    path: &Path,
    stats: &mut IngestStats,
) -> Result<()> {
    let sqlite = open_sqlite(path)
        .await
        .with_context(|| format!("failed to open archive {}", path.display()))?;

    let channels = import_channels(db, &sqlite).await?;
    import_posts(db, pipeline, &sqlite, &channels, stats).await?;

    sqlite.close().await;
    Ok(())
}

/// Copy the archive's channels into the catalog store. Returns a name -> id
/// map for posts that reference channels by name instead of id.
async fn import_channels(db: &Db, sqlite: &SqlitePool) -> Result<HashMap<String, i64>> {
    let rows = sqlx::query("SELECT id, name FROM channels")
        .fetch_all(sqlite)
        .await
        .context("failed to read archive channels")?;

    let mut by_name = HashMap::with_capacity(rows.len());
    for row in &rows {
        let id: i64 = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        upsert_channel(db, id, &name).await?;
        by_name.insert(name, id);
    }
    info!(count = rows.len(), "channels imported");
    Ok(by_name)
}

async fn import_posts(
    db: &Db,
    pipeline: &Pipeline,
    sqlite: &SqlitePool,
    channels_by_name: &HashMap<String, i64>,
    stats: &mut IngestStats,
) -> Result<()> {
    // Casts keep decoding stable across loosely-typed archive columns:
    // `channel` in particular holds either a numeric id or a channel name.
    let rows = sqlx::query(
        "SELECT id,
                CAST(number AS INTEGER) AS number,
                CAST(message AS TEXT) AS content,
                CAST(channel AS TEXT) AS channel,
                CAST(last_sent AS REAL) AS last_sent,
                CAST(message_id AS TEXT) AS message_id,
                CAST(file_id AS TEXT) AS file_id,
                CAST(parent_id AS TEXT) AS parent_id,
                CAST(original_message AS TEXT) AS original_message
         FROM posts",
    )
    .fetch_all(sqlite)
    .await
    .context("failed to read archive posts")?;
    info!(count = rows.len(), "posts found in archive");

    for (index, row) in rows.iter().enumerate() {
        let post_id: i64 = row.try_get("id").unwrap_or_default();
        if let Err(err) = import_post_row(db, pipeline, row, channels_by_name, stats).await {
            warn!(post_id, error = %err, "archive post failed; continuing");
        }
        if (index + 1) % 100 == 0 {
            info!(processed = index + 1, total = rows.len(), "archive import progress");
        }
    }
    Ok(())
}

async fn import_post_row(
    db: &Db,
    pipeline: &Pipeline,
    row: &sqlx::sqlite::SqliteRow,
    channels_by_name: &HashMap<String, i64>,
    stats: &mut IngestStats,
) -> Result<()> {
    let post_id: i64 = row.try_get("id")?;
    let Some(raw_content) = row.try_get::<Option<String>, _>("content")? else {
        stats.posts_skipped += 1;
        return Ok(());
    };

    if pipeline.extractor.is_advertisement(&raw_content) {
        info!(post_id, "skipping ad post");
        stats.posts_skipped += 1;
        return Ok(());
    }

    let channel_id =
        resolve_channel(db, row.try_get::<Option<String>, _>("channel")?, channels_by_name)
            .await?;

    let content = pipeline.extractor.clean_content(&raw_content);
    let ps4 = pipeline.extractor.extract_price(&raw_content, Platform::Ps4);
    let ps5 = pipeline.extractor.extract_price(&raw_content, Platform::Ps5);
    let title_lines = pipeline.extractor.title_lines(&content);

    let post = PostRecord {
        id: post_id,
        number: row.try_get("number").unwrap_or(None),
        content,
        channel_id,
        region: pipeline.extractor.extract_region(&raw_content),
        price_ps4: ps4.amount,
        price_ps5: ps5.amount,
        is_ps4_sold: ps4.sold,
        is_ps5_sold: ps5.sold,
        source_file: Some("sqlite-import".to_string()),
        last_sent: row.try_get("last_sent").unwrap_or(None),
        message_id: row.try_get("message_id").unwrap_or(None),
        file_id: row.try_get("file_id").unwrap_or(None),
        parent_id: row.try_get("parent_id").unwrap_or(None),
        original_message: row.try_get("original_message").unwrap_or(None),
        title_lines,
    };

    upsert_post(db, &post).await?;
    stats.posts_written += 1;

    relink_post_games(db, pipeline, stats, post.id, &post.title_lines).await?;
    Ok(())
}

/// Resolve a channel reference that is either a numeric id or a name.
/// Unknown numeric ids get a placeholder channel row so the foreign key
/// holds; unknown names are dropped with a warning.
async fn resolve_channel(
    db: &Db,
    raw: Option<String>,
    channels_by_name: &HashMap<String, i64>,
) -> Result<Option<i64>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if let Ok(id) = trimmed.parse::<i64>() {
        if !channel_exists(db, id).await? {
            info!(channel_id = id, "creating missing channel");
            ensure_channel(db, id, &format!("Channel {id}")).await?;
        }
        return Ok(Some(id));
    }

    match channels_by_name.get(trimmed) {
        Some(id) => Ok(Some(*id)),
        None => {
            warn!(channel = trimmed, "channel name not found in archive");
            Ok(None)
        }
    }
}
