//! `SQLite` schema for the person table.

/// SQL statement to create the person table.
///
/// The implicit rowid is the only key; people themselves carry no identity.
pub const CREATE_PERSON_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS person (
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL
)
";

/// SQL statement to insert one person.
pub const INSERT_PERSON: &str = r"
INSERT INTO person (first_name, last_name) VALUES (?1, ?2)
";

/// SQL statement to select every person.
pub const SELECT_PEOPLE: &str = r"
SELECT first_name, last_name FROM person
";
