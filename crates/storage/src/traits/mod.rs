//! Storage abstraction traits
//!
//! Two small interfaces keep the service layer storage-agnostic: a
//! synchronous string key-value store for small records and an async
//! record store for photo payloads.

pub mod blob;
pub mod kv;

pub use blob::BlobStore;
pub use kv::KeyValueStore;
