//! Test utilities and module declarations for storage tests.

use crate::SqliteStore;
use regdesk_core::PhotoRecord;
use tempfile::TempDir;

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_store() -> (SqliteStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let store = SqliteStore::open(&db_path, 2).unwrap();
    (store, temp_dir)
}

pub fn create_test_photo(id: &str) -> PhotoRecord {
    PhotoRecord::new(id.to_owned(), format!("data:image/png;base64,{id}"))
}

mod blob_tests;
mod kv_tests;
