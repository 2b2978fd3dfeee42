//! The `Person` record.
//!
//! A person is the only entity namebook stores: a first and a last name,
//! with no identity, timestamps, or uniqueness constraint.

use serde::{Deserialize, Serialize};

/// A single stored name.
///
/// Two people with the same names are indistinguishable; the store keeps
/// duplicates as separate records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Person {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

impl Person {
    /// Create a person from the two name fields.
    #[must_use]
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

impl std::fmt::Display for Person {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}
