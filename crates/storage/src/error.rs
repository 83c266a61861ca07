//! Errors returned by the key-value and photo stores.

use thiserror::Error;

/// Failure of a key-value or photo store operation.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A row the caller expected is missing.
    #[error("not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// SQL / connection failure.
    #[error("database error: {0}")]
    Database(#[source] rusqlite::Error),

    /// Connection pool could not hand out a connection.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// The store was used before it finished opening, or opening failed.
    #[error("store not initialized: {0}")]
    NotInitialized(String),

    /// Blocking task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(String),
}

impl StorageError {
    /// Busy/locked database or pool exhaustion.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Pool(_) => true,
            Self::Database(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }

    /// Whether this error is a missing-entity condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// `QueryReturnedNoRows` becomes a generic `NotFound`; everything else is
/// `Database`.
impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => {
                Self::NotFound { entity: "row", id: "unknown".into() }
            },
            other => Self::Database(other),
        }
    }
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}
