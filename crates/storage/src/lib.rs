//! Storage layer for regdesk
//!
//! A synchronous string key-value store for small records and an async
//! record store for photo payloads, each with an in-memory and a `SQLite`
//! implementation.

mod error;
mod memory;
mod migrations;
mod sqlite;
#[cfg(test)]
mod tests;
pub mod traits;

pub use error::StorageError;
pub use memory::{MemoryBlobStore, MemoryKeyValueStore};
pub use sqlite::SqliteStore;
pub use traits::{BlobStore, KeyValueStore};
