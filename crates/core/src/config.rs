//! Runtime configuration gathered from `REGDESK_*` environment variables.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_DB_POOL_SIZE, DEFAULT_DRAFT_DEBOUNCE_MS, DEFAULT_EDIT_TTL_HOURS, MAX_EDIT_TTL_HOURS,
};

/// Settings shared by the storage, service and CLI layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding `regdesk.db` (key-value entries and photo blobs)
    pub data_dir: PathBuf,
    /// Lifetime of the edit token issued on registration
    pub edit_ttl: chrono::Duration,
    /// Draft autosave quiet period
    pub draft_debounce: Duration,
    /// Country-info endpoint base; map lookups are disabled when unset
    pub geo_api_url: Option<String>,
    pub db_pool_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            edit_ttl: chrono::Duration::hours(DEFAULT_EDIT_TTL_HOURS),
            draft_debounce: Duration::from_millis(DEFAULT_DRAFT_DEBOUNCE_MS),
            geo_api_url: None,
            db_pool_size: DEFAULT_DB_POOL_SIZE,
        }
    }
}

impl Config {
    /// Reads the environment, falling back to defaults for unset or
    /// invalid values.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let text = |name: &str| {
            lookup(name).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
        };

        let mut ttl_hours: i64 =
            parse_or(text("REGDESK_EDIT_TTL_HOURS"), "REGDESK_EDIT_TTL_HOURS", DEFAULT_EDIT_TTL_HOURS);
        if ttl_hours > MAX_EDIT_TTL_HOURS {
            tracing::warn!(
                var = "REGDESK_EDIT_TTL_HOURS",
                value = ttl_hours,
                max = MAX_EDIT_TTL_HOURS,
                default = DEFAULT_EDIT_TTL_HOURS,
                "edit TTL too large, using default"
            );
            ttl_hours = DEFAULT_EDIT_TTL_HOURS;
        }
        let debounce_ms: u64 = parse_or(
            text("REGDESK_DRAFT_DEBOUNCE_MS"),
            "REGDESK_DRAFT_DEBOUNCE_MS",
            DEFAULT_DRAFT_DEBOUNCE_MS,
        );
        let pool_size: u32 =
            parse_or(text("REGDESK_DB_POOL_SIZE"), "REGDESK_DB_POOL_SIZE", DEFAULT_DB_POOL_SIZE);

        Self {
            data_dir: text("REGDESK_DATA_DIR").map_or_else(default_data_dir, PathBuf::from),
            edit_ttl: chrono::Duration::hours(ttl_hours.max(0)),
            draft_debounce: Duration::from_millis(debounce_ms),
            geo_api_url: text("REGDESK_GEO_API_URL"),
            db_pool_size: pool_size.max(1),
        }
    }

    /// Path of the `SQLite` database inside `data_dir`.
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("regdesk.db")
    }
}

/// Parses `raw`, warning and falling back to `default` when it is malformed.
fn parse_or<T: FromStr + Display>(raw: Option<String>, var: &str, default: T) -> T {
    let Some(raw) = raw else {
        return default;
    };
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(var, value = %raw, default = %default, "invalid env var value, using default");
        default
    })
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")).join("regdesk")
}
