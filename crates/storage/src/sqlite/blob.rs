use async_trait::async_trait;
use regdesk_core::PhotoRecord;
use rusqlite::{OptionalExtension as _, params};

use super::{SqliteStore, blocking, get_conn};
use crate::error::StorageError;
use crate::traits::BlobStore;

impl SqliteStore {
    /// Upsert a photo.
    ///
    /// # Errors
    /// Returns error if the database write fails.
    pub fn put_photo(&self, photo: &PhotoRecord) -> Result<(), StorageError> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO candidates_photo (id, photo_base64) VALUES (?1, ?2)
               ON CONFLICT(id) DO UPDATE SET photo_base64 = excluded.photo_base64",
            params![photo.id, photo.photo_base64],
        )?;
        Ok(())
    }

    /// Get a photo by candidate id.
    ///
    /// # Errors
    /// Returns error if the database query fails.
    pub fn get_photo(&self, id: &str) -> Result<Option<PhotoRecord>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let record = conn
            .query_row(
                "SELECT id, photo_base64 FROM candidates_photo WHERE id = ?1",
                params![id],
                |row| Ok(PhotoRecord::new(row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(record)
    }

    /// Every stored photo.
    ///
    /// # Errors
    /// Returns error if the database query fails.
    pub fn all_photos(&self) -> Result<Vec<PhotoRecord>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare("SELECT id, photo_base64 FROM candidates_photo ORDER BY id")?;
        let records = stmt
            .query_map([], |row| Ok(PhotoRecord::new(row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Delete a photo.
    ///
    /// # Errors
    /// Returns error if the database delete fails.
    pub fn delete_photo(&self, id: &str) -> Result<bool, StorageError> {
        let conn = get_conn(&self.pool)?;
        let affected = conn.execute("DELETE FROM candidates_photo WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}

#[async_trait]
impl BlobStore for SqliteStore {
    async fn put(&self, photo: &PhotoRecord) -> Result<(), StorageError> {
        let s = self.clone();
        let photo = photo.clone();
        blocking(move || s.put_photo(&photo)).await
    }

    async fn get(&self, id: &str) -> Result<Option<PhotoRecord>, StorageError> {
        let s = self.clone();
        let id = id.to_owned();
        blocking(move || s.get_photo(&id)).await
    }

    async fn get_all(&self) -> Result<Vec<PhotoRecord>, StorageError> {
        let s = self.clone();
        blocking(move || s.all_photos()).await
    }

    async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let s = self.clone();
        let id = id.to_owned();
        blocking(move || s.delete_photo(&id)).await
    }
}
