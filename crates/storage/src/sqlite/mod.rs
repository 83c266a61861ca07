//! `SQLite` persistence for both the key-value entries and the photo collection.
//!
//! One database file, two tables: `kv` for small string records and
//! `candidates_photo` for photo payloads.

mod blob;
mod kv;

use std::path::Path;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::error::StorageError;
use crate::migrations;

/// Type alias for pooled connection
pub(crate) type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Durable store wrapping a `SQLite` connection pool.
///
/// Implements [`KeyValueStore`](crate::KeyValueStore) synchronously and
/// [`BlobStore`](crate::BlobStore) through `spawn_blocking`.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pub(crate) pool: Pool<SqliteConnectionManager>,
}

/// Get a connection from the pool
pub(crate) fn get_conn(pool: &Pool<SqliteConnectionManager>) -> Result<PooledConn, StorageError> {
    Ok(pool.get()?)
}

/// Concurrency settings applied to every new connection
fn init_connection(conn: &mut Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA busy_timeout = 5000;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )?;
    Ok(())
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `db_path` and runs migrations.
    ///
    /// # Errors
    /// Returns `NotInitialized` when the file cannot be opened or the schema
    /// cannot be created; every photo operation depends on this succeeding.
    pub fn open(db_path: &Path, pool_size: u32) -> Result<Self, StorageError> {
        let manager = SqliteConnectionManager::file(db_path).with_init(init_connection);
        let pool = Pool::builder()
            .max_size(pool_size.max(1))
            .build(manager)
            .map_err(|e| StorageError::NotInitialized(format!("{}: {e}", db_path.display())))?;

        let conn = get_conn(&pool)?;
        migrations::run_migrations(&conn)
            .map_err(|e| StorageError::NotInitialized(format!("schema setup failed: {e}")))?;
        drop(conn);

        tracing::info!(path = %db_path.display(), pool_size, "Storage initialized with connection pool");

        Ok(Self { pool })
    }
}

/// Run a blocking closure on the tokio blocking pool.
async fn blocking<F, T>(f: F) -> Result<T, StorageError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}
