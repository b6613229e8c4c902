//! Read-side contract consumed by the bot layer: fuzzy title search and
//! post retrieval filtered to platform price present and not sold.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::Row;

use crate::database_ops::db::Db;
use crate::database_ops::posts::Platform;

#[derive(Debug, Clone)]
pub struct GameHit {
    pub id: i64,
    pub clean_title: String,
}

#[derive(Debug, Clone)]
pub struct PostHit {
    pub id: i64,
    pub content: String,
    pub region: Option<String>,
    pub price: i64,
    pub created_at: DateTime<Utc>,
}

/// Substring search over canonical titles, best trigram similarity first.
pub async fn search_games_by_title(db: &Db, q: &str, limit: i64) -> Result<Vec<GameHit>> {
    let pattern = format!("%{}%", q);
    let rows = sqlx::query(
        "SELECT id, clean_title
         FROM games
         WHERE clean_title ILIKE $1
         ORDER BY similarity(clean_title, $2) DESC
         LIMIT $3",
    )
    .bind(&pattern)
    .bind(q)
    .bind(limit)
    .fetch_all(&db.pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| GameHit {
            id: r.get("id"),
            clean_title: r.get("clean_title"),
        })
        .collect())
}

/// Posts advertising any of the given games on the given platform, with a
/// price present and the copy not sold, newest first.
pub async fn posts_for_games(
    db: &Db,
    game_ids: &[i64],
    platform: Platform,
    limit: i64,
) -> Result<Vec<PostHit>> {
    if game_ids.is_empty() {
        return Ok(Vec::new());
    }

    let sql = posts_query(platform);

    let rows = sqlx::query(&sql)
        .bind(game_ids)
        .bind(limit)
        .fetch_all(&db.pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|r| PostHit {
            id: r.get("id"),
            content: r.get("content"),
            region: r.get("region"),
            price: r.get("price"),
            created_at: r.get("created_at"),
        })
        .collect())
}

fn posts_query(platform: Platform) -> String {
    format!(
        "SELECT DISTINCT p.id, p.content, p.region, p.{price} AS price, p.created_at
         FROM games_posts gp
         JOIN posts p ON p.id = gp.post_id
         WHERE gp.game_id = ANY($1)
           AND p.{price} IS NOT NULL
           AND NOT p.{sold}
         ORDER BY p.created_at DESC
         LIMIT $2",
        price = platform.price_column(),
        sold = platform.sold_column(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posts_query_filters_by_platform_columns() {
        let ps4 = posts_query(Platform::Ps4);
        assert!(ps4.contains("p.price_ps4 IS NOT NULL"));
        assert!(ps4.contains("NOT p.is_ps4_sold"));

        let ps5 = posts_query(Platform::Ps5);
        assert!(ps5.contains("p.price_ps5 IS NOT NULL"));
        assert!(ps5.contains("NOT p.is_ps5_sold"));
        assert!(ps5.contains("ORDER BY p.created_at DESC"));
    }
}
