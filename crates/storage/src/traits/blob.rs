use async_trait::async_trait;
use regdesk_core::PhotoRecord;

use crate::error::StorageError;

/// Async record store holding a single photo collection keyed by candidate id.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Insert or overwrite the record with `photo.id`.
    async fn put(&self, photo: &PhotoRecord) -> Result<(), StorageError>;

    /// Record by id.
    async fn get(&self, id: &str) -> Result<Option<PhotoRecord>, StorageError>;

    /// Every stored record, ordered by id.
    async fn get_all(&self) -> Result<Vec<PhotoRecord>, StorageError>;

    /// Delete by id. Returns `true` if a record was removed.
    async fn delete(&self, id: &str) -> Result<bool, StorageError>;
}
