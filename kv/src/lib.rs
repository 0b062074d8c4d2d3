//! Key-value store interface and implementations.
//!
//! Keys are UTF-8 strings kept in lexicographic order; values are raw bytes.
//! [`MemoryStore`] is for tests and ephemeral use, [`RedbStore`] persists to
//! a single file.
//!
//! Every write is atomic per key: a concurrent reader sees either the old
//! value or the new one, never a partial write.

pub mod memory;
pub mod redb;

use std::fmt;
use thiserror::Error;

/// Errors that can occur in KV store operations.
#[derive(Error, Debug)]
pub enum KVError {
    #[error("kv: not found")]
    NotFound,

    #[error("kv: storage error: {0}")]
    Storage(String),
}

/// Result type for KV operations.
pub type KVResult<T> = Result<T, KVError>;

/// Key-value store trait.
pub trait KVStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &str) -> KVResult<Option<Vec<u8>>>;

    /// Set a key-value pair, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> KVResult<()>;

    /// Set a key-value pair only if the key is absent.
    /// Returns false (and writes nothing) when the key already exists.
    fn insert_new(&self, key: &str, value: &[u8]) -> KVResult<bool>;

    /// Delete a key. Returns [`KVError::NotFound`] if the key is absent.
    fn delete(&self, key: &str) -> KVResult<()>;

    /// Return up to `limit` entries whose key starts with `prefix`, in key
    /// order, starting strictly after `after` (or from the first match when
    /// `after` is `None`).
    fn scan_page(
        &self,
        prefix: &str,
        after: Option<&str>,
        limit: usize,
    ) -> KVResult<Vec<(String, Vec<u8>)>>;

    /// Count keys starting with `prefix`.
    fn count(&self, prefix: &str) -> KVResult<usize>;
}

impl fmt::Debug for dyn KVStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KVStore {{ ... }}")
    }
}

pub use memory::MemoryStore;
pub use redb::RedbStore;
