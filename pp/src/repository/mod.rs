//! Persistence port for progress state
//!
//! The store reads and writes whole JSON values by string key. Backends:
//!
//! - [`MemoryRepository`] - process-local map, for tests and dry runs
//! - [`FileRepository`] - one `<key>.json` file per key under a directory
//! - [`SqliteRepository`] - a single `kv` table
//!
//! Every write replaces the full value for its key; there is no locking, so
//! concurrent writers are last-write-wins. `set_many` writes several keys as
//! one unit: either every entry lands or none does.

mod file;
mod memory;
mod sqlite;

pub use file::FileRepository;
pub use memory::MemoryRepository;
pub use sqlite::SqliteRepository;

use serde_json::Value;

use crate::error::RepositoryError;

/// Key/value storage of JSON documents
pub trait ProgressRepository {
    /// Read the value for `key`, `None` when absent
    fn get(&self, key: &str) -> Result<Option<Value>, RepositoryError>;

    /// Replace the value for `key`
    fn set(&mut self, key: &str, value: Value) -> Result<(), RepositoryError>;

    /// Replace several keys at once; on error none of them is changed
    fn set_many(&mut self, entries: Vec<(&str, Value)>) -> Result<(), RepositoryError>;

    /// Remove `key`; removing an absent key is not an error
    fn remove(&mut self, key: &str) -> Result<(), RepositoryError>;

    /// All stored keys, sorted
    fn keys(&self) -> Result<Vec<String>, RepositoryError>;
}

impl<R: ProgressRepository + ?Sized> ProgressRepository for Box<R> {
    fn get(&self, key: &str) -> Result<Option<Value>, RepositoryError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), RepositoryError> {
        (**self).set(key, value)
    }

    fn set_many(&mut self, entries: Vec<(&str, Value)>) -> Result<(), RepositoryError> {
        (**self).set_many(entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), RepositoryError> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, RepositoryError> {
        (**self).keys()
    }
}

/// Parse a stored JSON document, naming the key on failure
pub(crate) fn parse_document(key: &str, raw: &str) -> Result<Value, RepositoryError> {
    serde_json::from_str(raw).map_err(|source| RepositoryError::Corrupt {
        key: key.to_string(),
        source,
    })
}
