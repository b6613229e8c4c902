//! Environment helpers: centralized dotenv loading and ergonomic getters.
//! Call `init_env()` once early in each binary (or rely on lazy Once).
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Once;

static INIT: Once = Once::new();

/// Load .env exactly once. Safe to call many times.
pub fn init_env() {
    INIT.call_once(|| {
        let _ = dotenv::dotenv();
    });
}

/// Get required env var; error if missing.
pub fn env_req(key: &str) -> anyhow::Result<String> {
    init_env();
    std::env::var(key).map_err(|_| anyhow::anyhow!("missing env var {key}"))
}

/// Get optional env var (None if unset or empty).
pub fn env_opt(key: &str) -> Option<String> {
    init_env();
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Get parsed value with default fallback.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Clone,
{
    init_env();
    match std::env::var(key) {
        Ok(raw) => raw.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Boolean flag; accepts 1/true/on/yes (case-insensitive) as true.
pub fn env_flag(key: &str, default: bool) -> bool {
    init_env();
    match std::env::var(key) {
        Ok(raw) => {
            let v = raw.trim().to_ascii_lowercase();
            matches!(v.as_str(), "1" | "true" | "on" | "yes")
        }
        Err(_) => default,
    }
}

/// Resolve the Postgres DSN (tries specific -> generic). Returns first found.
pub fn db_url() -> anyhow::Result<String> {
    init_env();
    for k in ["DATABASE_URL", "DB_URL", "POSTGRES_URL"] {
        if let Some(v) = env_opt(k) {
            return Ok(v);
        }
    }
    Err(anyhow::anyhow!("no database URL env vars set"))
}

/// Input sources configured the legacy way: FILE_PATH_1..FILE_PATH_6.
/// Unset slots are skipped, matching the original ingester's behavior.
pub fn input_files_from_env() -> Vec<PathBuf> {
    init_env();
    (1..=6)
        .filter_map(|n| env_opt(&format!("FILE_PATH_{n}")))
        .map(PathBuf::from)
        .collect()
}
