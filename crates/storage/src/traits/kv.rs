use crate::error::StorageError;

/// Synchronous string-keyed store for small records (candidate list,
/// counters, draft, edit tokens).
///
/// Calls are expected to be fast for small payloads; they run inline on
/// the caller's task.
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or overwrite `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Missing keys are not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Every stored key, in ascending order.
    fn keys(&self) -> Result<Vec<String>, StorageError>;

    /// Keys starting with `prefix`, in ascending order.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        Ok(self.keys()?.into_iter().filter(|k| k.starts_with(prefix)).collect())
    }
}
