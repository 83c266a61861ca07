//! Database schema setup

use rusqlite::Connection;

pub const SCHEMA_VERSION: i32 = 1;

const V1_SQL: &str = "
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS candidates_photo (
    id TEXT PRIMARY KEY,
    photo_base64 TEXT NOT NULL
);
";

pub fn run_migrations(conn: &Connection) -> Result<(), rusqlite::Error> {
    let current_version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    tracing::debug!(
        "Database schema version: {} (target: {})",
        current_version,
        SCHEMA_VERSION
    );

    if current_version < 1 {
        tracing::info!("Running migration v1: initial schema");
        conn.execute_batch(V1_SQL)?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    }

    Ok(())
}
