//! ingest: read marketplace export files (and optionally a bot archive),
//! normalize and deduplicate game titles, and persist the catalog.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use psmarket::database_ops::db::Db;
use psmarket::ingest::{self, IngestStats, Pipeline};
use psmarket::logging::init_tracing;
use psmarket::util::env as env_util;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "ingest",
    about = "Ingest marketplace post exports into the game catalog"
)]
struct Cli {
    /// Plain-text export files to ingest. Falls back to FILE_PATH_1..6 when
    /// omitted.
    #[arg(value_name = "FILE")]
    sources: Vec<PathBuf>,

    /// Exported bot database (SQLite) to import after the text sources.
    #[arg(long, value_name = "DB")]
    archive: Option<PathBuf>,

    /// Postgres pool size.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Write the JSON run summary to this path.
    #[arg(long, value_name = "PATH")]
    summary_out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_util::init_env();
    init_tracing("info,sqlx=warn")?;
    let cli = Cli::parse();

    let sources = if cli.sources.is_empty() {
        env_util::input_files_from_env()
    } else {
        cli.sources.clone()
    };
    if sources.is_empty() && cli.archive.is_none() {
        bail!("no input configured; pass export files or set FILE_PATH_1..6 (or --archive)");
    }

    let database_url = env_util::db_url()?;
    let db = Db::connect(&database_url, cli.max_connections)
        .await
        .context("database connection failed")?;

    // The pool is released on every exit path, including failures below.
    let result = run_all(&db, &sources, cli.archive.as_deref()).await;
    db.close().await;
    let stats = result?;

    info!(
        posts_written = stats.posts_written,
        posts_skipped = stats.posts_skipped,
        lines_skipped = stats.lines_skipped,
        links_written = stats.links_written,
        matched_existing = stats.matched_existing,
        unique_games = stats.unique_game_count(),
        "ingestion finished"
    );
    println!(
        "Total unique games in database: {}",
        stats.unique_game_count()
    );

    if let Some(path) = cli.summary_out {
        let summary = serde_json::to_string_pretty(&stats.summary())?;
        std::fs::write(&path, summary)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        info!(path = %path.display(), "run summary written");
    }

    Ok(())
}

async fn run_all(
    db: &Db,
    sources: &[PathBuf],
    archive: Option<&std::path::Path>,
) -> Result<IngestStats> {
    // Schema bootstrap is the only batch-fatal persistence step.
    db.create_tables().await.context("schema bootstrap failed")?;

    let pipeline = Pipeline::from_env()?;
    let mut stats = ingest::run(db, &pipeline, sources).await?;

    if let Some(archive_path) = archive {
        ingest::archive::import_archive(db, &pipeline, archive_path, &mut stats).await?;
    }

    Ok(stats)
}
