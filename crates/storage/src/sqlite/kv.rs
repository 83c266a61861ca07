use rusqlite::{OptionalExtension as _, params};

use super::{SqliteStore, get_conn};
use crate::error::StorageError;
use crate::traits::KeyValueStore;

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let value: Option<String> = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
               ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        tracing::trace!(key, bytes = value.len(), "kv write");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let conn = get_conn(&self.pool)?;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let keys = stmt.query_map([], |row| row.get(0))?.collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT key FROM kv WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
        )?;
        let keys =
            stmt.query_map(params![prefix], |row| row.get(0))?.collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}
