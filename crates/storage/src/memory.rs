//! In-memory stores for tests and ephemeral runs.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use regdesk_core::PhotoRecord;

use crate::error::StorageError;
use crate::traits::{BlobStore, KeyValueStore};

/// `BTreeMap`-backed key-value store; keys enumerate in sorted order.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `entries`.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { entries: RwLock::new(map) }
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.keys().cloned().collect())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries
            .range(prefix.to_owned()..)
            .map(|(k, _)| k)
            .take_while(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

/// Photo collection held in a map.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    records: tokio::sync::RwLock<BTreeMap<String, String>>,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, photo: &PhotoRecord) -> Result<(), StorageError> {
        self.records.write().await.insert(photo.id.clone(), photo.photo_base64.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<PhotoRecord>, StorageError> {
        let records = self.records.read().await;
        Ok(records.get(id).map(|payload| PhotoRecord::new(id.to_owned(), payload.clone())))
    }

    async fn get_all(&self) -> Result<Vec<PhotoRecord>, StorageError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .map(|(id, payload)| PhotoRecord::new(id.clone(), payload.clone()))
            .collect())
    }

    async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self.records.write().await.remove(id).is_some())
    }
}
