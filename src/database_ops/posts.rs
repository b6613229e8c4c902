//! Post persistence: full-overwrite upserts keyed on the stable post id.

use anyhow::Result;
use tracing::debug;

use crate::database_ops::db::Db;

/// The two platform variants a post may price independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Ps4,
    Ps5,
}

impl Platform {
    /// Marker text used in price lines ("PS4" / "PS5").
    pub fn label(self) -> &'static str {
        match self {
            Platform::Ps4 => "PS4",
            Platform::Ps5 => "PS5",
        }
    }

    pub fn price_column(self) -> &'static str {
        match self {
            Platform::Ps4 => "price_ps4",
            Platform::Ps5 => "price_ps5",
        }
    }

    pub fn sold_column(self) -> &'static str {
        match self {
            Platform::Ps4 => "is_ps4_sold",
            Platform::Ps5 => "is_ps5_sold",
        }
    }
}

/// One structured marketplace post, as extracted from a source block or an
/// archive row. `title_lines` carries the candidate game lines onward to
/// the normalization chain; it is not persisted on the post itself.
#[derive(Debug, Clone, Default)]
pub struct PostRecord {
    pub id: i64,
    pub number: Option<i32>,
    pub content: String,
    pub channel_id: Option<i64>,
    pub region: Option<String>,
    pub price_ps4: Option<i64>,
    pub price_ps5: Option<i64>,
    pub is_ps4_sold: bool,
    pub is_ps5_sold: bool,
    pub source_file: Option<String>,
    pub last_sent: Option<f64>,
    pub message_id: Option<String>,
    pub file_id: Option<String>,
    pub parent_id: Option<String>,
    pub original_message: Option<String>,
    pub title_lines: Vec<String>,
}

/// Insert or fully refresh a post. Re-ingesting the same id updates every
/// derived field (last-write-wins) and bumps `updated_at`; it never
/// duplicates the row.
pub async fn upsert_post(db: &Db, post: &PostRecord) -> Result<()> {
    sqlx::query(
        "INSERT INTO posts
            (id, number, content, channel_id, region, price_ps4, price_ps5,
             is_ps4_sold, is_ps5_sold, source_file, last_sent, message_id,
             file_id, parent_id, original_message)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
         ON CONFLICT (id) DO UPDATE SET
            number = EXCLUDED.number,
            content = EXCLUDED.content,
            channel_id = EXCLUDED.channel_id,
            region = EXCLUDED.region,
            price_ps4 = EXCLUDED.price_ps4,
            price_ps5 = EXCLUDED.price_ps5,
            is_ps4_sold = EXCLUDED.is_ps4_sold,
            is_ps5_sold = EXCLUDED.is_ps5_sold,
            source_file = EXCLUDED.source_file,
            last_sent = EXCLUDED.last_sent,
            message_id = EXCLUDED.message_id,
            file_id = EXCLUDED.file_id,
            parent_id = EXCLUDED.parent_id,
            original_message = EXCLUDED.original_message,
            updated_at = now()",
    )
    .bind(post.id)
    .bind(post.number)
    .bind(&post.content)
    .bind(post.channel_id)
    .bind(&post.region)
    .bind(post.price_ps4)
    .bind(post.price_ps5)
    .bind(post.is_ps4_sold)
    .bind(post.is_ps5_sold)
    .bind(&post.source_file)
    .bind(post.last_sent)
    .bind(&post.message_id)
    .bind(&post.file_id)
    .bind(&post.parent_id)
    .bind(&post.original_message)
    .execute(&db.pool)
    .await?;
    debug!(post_id = post.id, "post upserted");
    Ok(())
}

/// Insert or rename a channel.
pub async fn upsert_channel(db: &Db, id: i64, name: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO channels (id, name)
         VALUES ($1, $2)
         ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name",
    )
    .bind(id)
    .bind(name)
    .execute(&db.pool)
    .await?;
    Ok(())
}

/// Insert a channel only if the id is new; an existing row keeps its name.
pub async fn ensure_channel(db: &Db, id: i64, name: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO channels (id, name)
         VALUES ($1, $2)
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(id)
    .bind(name)
    .execute(&db.pool)
    .await?;
    Ok(())
}

/// True when the channel id already exists.
pub async fn channel_exists(db: &Db, id: i64) -> Result<bool> {
    let found: Option<i32> = sqlx::query_scalar("SELECT 1 FROM channels WHERE id = $1")
        .bind(id)
        .fetch_optional(&db.pool)
        .await?;
    Ok(found.is_some())
}
