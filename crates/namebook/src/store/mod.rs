//! Local record store for namebook.
//!
//! This module defines the [`RecordStore`] seam that the form talks to, the
//! error taxonomy shared by every store, and a non-durable [`MemoryStore`].
//! The durable `SQLite` implementation lives in [`sqlite`].

pub mod schema;
pub mod sqlite;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::person::Person;

pub use sqlite::SqliteStore;

/// Errors reported by a record store.
///
/// None of these are fatal: a failed operation leaves the stored records
/// exactly as they were before the call.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage context (database connection) could not be acquired.
    #[error("storage unavailable at {path}: {reason}")]
    Unavailable {
        /// Location of the storage that could not be reached.
        path: PathBuf,
        /// Description of what went wrong.
        reason: String,
    },

    /// Committing a new record failed.
    #[error("failed to write record: {0}")]
    WriteFailed(#[source] rusqlite::Error),

    /// Executing the fetch query failed.
    #[error("failed to read records: {0}")]
    ReadFailed(#[source] rusqlite::Error),
}

impl StoreError {
    /// Create an unavailable error for the given location.
    #[must_use]
    pub fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Unavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if this error means the storage context could not be acquired.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Append-and-fetch storage for [`Person`] records.
///
/// Stores do not validate names; callers are expected to reject empty
/// fields before calling [`append`](RecordStore::append). Both operations
/// take `&mut self` because implementations may acquire their context
/// lazily on first use.
pub trait RecordStore {
    /// Durably and atomically add one record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the storage context cannot be
    /// acquired, or [`StoreError::WriteFailed`] if the commit fails.
    fn append(&mut self, first_name: &str, last_name: &str) -> Result<(), StoreError>;

    /// Fetch every stored record.
    ///
    /// The order of the returned records is unspecified. An empty store
    /// yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the storage context cannot be
    /// acquired, or [`StoreError::ReadFailed`] if the query fails.
    fn fetch_all(&mut self) -> Result<Vec<Person>, StoreError>;
}

/// `SQLite` durability level applied to every connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Synchronous {
    /// Sync at critical moments only; a power loss may drop the last commits.
    Normal,
    /// Sync on every commit.
    #[default]
    Full,
}

impl Synchronous {
    /// The value used in `PRAGMA synchronous`.
    #[must_use]
    pub fn as_pragma(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Full => "FULL",
        }
    }
}

impl std::fmt::Display for Synchronous {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Full => write!(f, "full"),
        }
    }
}

/// Options applied when a store acquires its connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreOptions {
    /// Durability level.
    pub synchronous: Synchronous,
}

/// Non-durable store keeping records in a vector.
///
/// Contents are lost when the value is dropped. Use this only in tests or
/// development contexts.
#[derive(Debug)]
pub struct MemoryStore {
    records: Option<Vec<Person>>,
}

impl MemoryStore {
    /// Create an empty, available store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Some(Vec::new()),
        }
    }

    /// Create a store whose context can never be acquired.
    #[must_use]
    pub fn unavailable() -> Self {
        Self { records: None }
    }

    fn context(&mut self) -> Result<&mut Vec<Person>, StoreError> {
        self.records
            .as_mut()
            .ok_or_else(|| StoreError::unavailable(":memory:", "no storage context"))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryStore {
    fn append(&mut self, first_name: &str, last_name: &str) -> Result<(), StoreError> {
        self.context()?.push(Person::new(first_name, last_name));
        Ok(())
    }

    fn fetch_all(&mut self) -> Result<Vec<Person>, StoreError> {
        Ok(self.context()?.clone())
    }
}
