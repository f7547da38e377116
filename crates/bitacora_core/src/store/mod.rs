//! Key-value store adapter.
//!
//! # Responsibility
//! - Define the string-keyed persistence contract repositories depend on.
//! - Keep the persistence medium swappable without touching repositories.
//!
//! # Invariants
//! - Every call is synchronous and durable once it returns `Ok`.
//! - `get` returns `None` for absent keys; absence is never an error.
//! - No batching and no transactions across calls.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::{open_db, open_db_in_memory, SqliteStore, STORE_VERSION};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of the backing medium.
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build with a different table layout.
    UnsupportedStoreVersion { found: u32, supported: u32 },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "key-value store failure: {err}"),
            Self::UnsupportedStoreVersion { found, supported } => write!(
                f,
                "key-value store version {found} is newer than supported {supported}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedStoreVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// String-keyed persistent storage.
pub trait KeyValueStore {
    /// Reads the value stored under `key`.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    /// Deletes `key`. Removing an absent key is a no-op.
    fn remove(&self, key: &str) -> StoreResult<()>;
    /// Lists keys starting with `prefix`, sorted ascending.
    fn keys_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>>;
}

