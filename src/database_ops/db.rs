use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    PgPool, SqlitePool,
};
use tracing::{info, instrument};

/// Schema bootstrap for the catalog store. Runs once per ingestion run;
/// every statement is idempotent. Trigram candidate retrieval requires the
/// pg_trgm extension and the GIN index on `games.clean_title`.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS channels (
    id BIGINT PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS games (
    id BIGSERIAL PRIMARY KEY,
    original_title TEXT NOT NULL,
    clean_title TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE UNIQUE INDEX IF NOT EXISTS games_clean_title_key
    ON games ((LOWER(clean_title)));

CREATE EXTENSION IF NOT EXISTS pg_trgm;

CREATE INDEX IF NOT EXISTS games_clean_title_trgm_idx
    ON games USING GIN (clean_title gin_trgm_ops);

CREATE TABLE IF NOT EXISTS posts (
    id BIGINT PRIMARY KEY,
    number INTEGER,
    content TEXT NOT NULL,
    channel_id BIGINT REFERENCES channels(id),
    region TEXT,
    price_ps4 BIGINT,
    price_ps5 BIGINT,
    is_ps4_sold BOOLEAN NOT NULL DEFAULT FALSE,
    is_ps5_sold BOOLEAN NOT NULL DEFAULT FALSE,
    source_file TEXT,
    last_sent DOUBLE PRECISION,
    message_id TEXT,
    file_id TEXT,
    parent_id TEXT,
    original_message TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS games_posts (
    game_id BIGINT REFERENCES games(id),
    post_id BIGINT REFERENCES posts(id),
    PRIMARY KEY (game_id, post_id)
);
"#;

#[derive(Clone)]
pub struct Db {
    pub pool: PgPool,
}

impl Db {
    // SECURITY: never include raw DSNs in tracing spans (they may contain credentials).
    #[instrument(skip(database_url))]
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let use_prepared = std::env::var("USE_PREPARED")
            .map(|v| (v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("on")))
            .unwrap_or(false);
        let mut connect_options = PgConnectOptions::from_str(database_url)?;

        if database_url.contains("sslmode=require") && !database_url.contains("sslmode=disable") {
            connect_options = connect_options.ssl_mode(PgSslMode::Require);
        }

        if !use_prepared {
            // PgBouncer txn mode safe
            connect_options = connect_options.statement_cache_capacity(0);
        }

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(600))
            .connect_with(connect_options)
            .await?;
        info!("connected to db");
        Ok(Self { pool })
    }

    /// Create the catalog schema. A failure here is batch-fatal: the run
    /// cannot proceed without the tables or the trigram index.
    pub async fn create_tables(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        info!("schema created/verified");
        Ok(())
    }

    /// Release the pool. The orchestrating binary calls this on every exit
    /// path, success or failure.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("database connection closed");
    }
}

/// Open an exported bot archive (SQLite) read-only.
pub async fn open_sqlite(path: &Path) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .immutable(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    info!(path = %path.display(), "connected to sqlite archive");
    Ok(pool)
}
