//! Storage module for the API.
//!
//! Provides key-value store backends: in-memory (with an optional change
//! feed) and PostgreSQL.

pub mod error;
pub mod traits;

// Storage backend implementations
pub mod memory;
pub mod postgres;

pub use error::StorageError;
pub use memory::InMemoryKeyValueStore;
pub use postgres::PostgresKeyValueStore;
pub use traits::{Item, KeyValueStore, ReturnValues, ScanPage, WriteCondition};
