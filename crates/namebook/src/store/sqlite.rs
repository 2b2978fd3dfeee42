//! `SQLite`-backed record store.
//!
//! The connection is the store's context. It is acquired on the first
//! operation rather than at construction, so a store can be handed to the
//! form before the database is reachable, and a failed acquisition is
//! retried on the next call.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use tracing::{debug, info, warn};

use super::schema;
use super::{RecordStore, StoreError, StoreOptions};
use crate::person::Person;

/// Path reported for in-memory databases.
const IN_MEMORY_PATH: &str = ":memory:";

/// Durable record store backed by a single `SQLite` file.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Pragmas applied when the connection is acquired.
    options: StoreOptions,
    /// Database connection, once acquired.
    conn: Option<Connection>,
}

impl SqliteStore {
    /// Create a store for the database at `path` without opening it.
    #[must_use]
    pub fn new(path: impl AsRef<Path>, options: StoreOptions) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            options,
            conn: None,
        }
    }

    /// Open or create the database at `path` immediately.
    ///
    /// Creates the parent directories and the person table if they don't
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the database cannot be opened
    /// or prepared.
    pub fn open(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self, StoreError> {
        let mut store = Self::new(path, options);
        store.context()?;
        Ok(store)
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the in-memory database cannot
    /// be created.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::unavailable(IN_MEMORY_PATH, e))?;
        let options = StoreOptions::default();
        prepare(&conn, options).map_err(|e| StoreError::unavailable(IN_MEMORY_PATH, e))?;

        Ok(Self {
            path: PathBuf::from(IN_MEMORY_PATH),
            options,
            conn: Some(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check whether the connection has been acquired.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Get the connection, acquiring it first if needed.
    fn context(&mut self) -> Result<&mut Connection, StoreError> {
        let conn = match self.conn.take() {
            Some(conn) => conn,
            None => self.acquire()?,
        };
        Ok(self.conn.insert(conn))
    }

    fn acquire(&self) -> Result<Connection, StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    warn!("Cannot create directory {}: {}", parent.display(), e);
                    StoreError::unavailable(
                        &self.path,
                        format!("failed to create directory {}: {e}", parent.display()),
                    )
                })?;
            }
        }

        debug!("Opening database at {}", self.path.display());
        let conn = Connection::open(&self.path).map_err(|e| {
            warn!("Cannot open database at {}: {}", self.path.display(), e);
            StoreError::unavailable(&self.path, e)
        })?;

        prepare(&conn, self.options).map_err(|e| StoreError::unavailable(&self.path, e))?;

        info!("Database opened successfully at {}", self.path.display());
        Ok(conn)
    }
}

/// Apply pragmas and create the person table.
fn prepare(conn: &Connection, options: StoreOptions) -> rusqlite::Result<()> {
    conn.execute_batch(&format!(
        "PRAGMA journal_mode=WAL; PRAGMA synchronous={};",
        options.synchronous.as_pragma()
    ))?;
    conn.execute_batch(schema::CREATE_PERSON_TABLE)
}

fn row_to_person(row: &rusqlite::Row) -> rusqlite::Result<Person> {
    Ok(Person {
        first_name: row.get(0)?,
        last_name: row.get(1)?,
    })
}

impl RecordStore for SqliteStore {
    fn append(&mut self, first_name: &str, last_name: &str) -> Result<(), StoreError> {
        let conn = self.context()?;

        let tx = conn.transaction().map_err(StoreError::WriteFailed)?;
        tx.execute(schema::INSERT_PERSON, params![first_name, last_name])
            .map_err(StoreError::WriteFailed)?;
        tx.commit().map_err(StoreError::WriteFailed)?;

        debug!("Appended person record");
        Ok(())
    }

    fn fetch_all(&mut self) -> Result<Vec<Person>, StoreError> {
        let conn = self.context()?;

        let mut stmt = conn
            .prepare(schema::SELECT_PEOPLE)
            .map_err(StoreError::ReadFailed)?;
        let people = stmt
            .query_map([], row_to_person)
            .map_err(StoreError::ReadFailed)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::ReadFailed)?;

        debug!("Fetched {} person records", people.len());
        Ok(people)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Synchronous;

    fn create_test_store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("failed to create test store")
    }

    fn test_db_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("namebook_test_{}_{name}.db", std::process::id()))
    }

    fn remove_db(path: &Path) {
        let _ = std::fs::remove_file(path);
        let _ = std::fs::remove_file(path.with_extension("db-wal"));
        let _ = std::fs::remove_file(path.with_extension("db-shm"));
    }

    fn sorted(mut people: Vec<Person>) -> Vec<Person> {
        people.sort();
        people
    }

    #[test]
    fn test_open_in_memory() {
        let store = SqliteStore::open_in_memory();
        assert!(store.is_ok());
        assert_eq!(store.unwrap().path().to_string_lossy(), ":memory:");
    }

    #[test]
    fn test_fetch_all_empty_store() {
        let mut store = create_test_store();
        let people = store.fetch_all().unwrap();
        assert!(people.is_empty());
    }

    #[test]
    fn test_append_then_fetch_contains_pair() {
        let mut store = create_test_store();
        store.append("Ada", "Lovelace").unwrap();

        let people = store.fetch_all().unwrap();
        assert!(people.contains(&Person::new("Ada", "Lovelace")));
    }

    #[test]
    fn test_two_appends_fetch_both() {
        let mut store = create_test_store();
        store.append("Ada", "Lovelace").unwrap();
        store.append("Alan", "Turing").unwrap();

        let people = store.fetch_all().unwrap();
        assert_eq!(people.len(), 2);
        assert!(people.contains(&Person::new("Ada", "Lovelace")));
        assert!(people.contains(&Person::new("Alan", "Turing")));
    }

    #[test]
    fn test_append_n_fetch_n() {
        let mut store = create_test_store();
        for i in 0..25 {
            store.append(&format!("First{i}"), &format!("Last{i}")).unwrap();
        }

        let people = store.fetch_all().unwrap();
        assert_eq!(people.len(), 25);
        for i in 0..25 {
            assert!(people.contains(&Person::new(format!("First{i}"), format!("Last{i}"))));
        }
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut store = create_test_store();
        store.append("Ada", "Lovelace").unwrap();
        store.append("Ada", "Lovelace").unwrap();

        let people = store.fetch_all().unwrap();
        assert_eq!(people, vec![Person::new("Ada", "Lovelace"); 2]);
    }

    #[test]
    fn test_fetch_all_is_repeatable() {
        let mut store = create_test_store();
        store.append("Ada", "Lovelace").unwrap();
        store.append("Alan", "Turing").unwrap();
        store.append("Ada", "Lovelace").unwrap();

        let first = sorted(store.fetch_all().unwrap());
        let second = sorted(store.fetch_all().unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn test_store_accepts_empty_strings() {
        let mut store = create_test_store();
        store.append("", "").unwrap();

        let people = store.fetch_all().unwrap();
        assert_eq!(people, vec![Person::new("", "")]);
    }

    #[test]
    fn test_unicode_names() {
        let mut store = create_test_store();
        store.append("Émilie", "du Châtelet").unwrap();
        store.append("李", "白").unwrap();

        let people = sorted(store.fetch_all().unwrap());
        assert!(people.contains(&Person::new("Émilie", "du Châtelet")));
        assert!(people.contains(&Person::new("李", "白")));
    }

    #[test]
    fn test_names_with_sql_metacharacters() {
        let mut store = create_test_store();
        store.append("Robert'); DROP TABLE person;--", "O'Brien").unwrap();

        let people = store.fetch_all().unwrap();
        assert_eq!(
            people,
            vec![Person::new("Robert'); DROP TABLE person;--", "O'Brien")]
        );
    }

    #[test]
    fn test_new_does_not_connect() {
        let path = test_db_path("lazy");
        remove_db(&path);

        let store = SqliteStore::new(&path, StoreOptions::default());
        assert!(!store.is_connected());
        assert!(!path.exists());
        assert_eq!(store.path(), path);
    }

    #[test]
    fn test_context_acquired_on_first_use() {
        let path = test_db_path("first_use");
        remove_db(&path);

        let mut store = SqliteStore::new(&path, StoreOptions::default());
        assert!(store.fetch_all().unwrap().is_empty());
        assert!(store.is_connected());
        assert!(path.exists());

        drop(store);
        remove_db(&path);
    }

    #[test]
    fn test_records_survive_reopen() {
        let path = test_db_path("reopen");
        remove_db(&path);

        let mut store = SqliteStore::open(&path, StoreOptions::default()).unwrap();
        store.append("Ada", "Lovelace").unwrap();
        store.append("Alan", "Turing").unwrap();
        drop(store);

        let mut reopened = SqliteStore::open(&path, StoreOptions::default()).unwrap();
        let people = sorted(reopened.fetch_all().unwrap());
        assert_eq!(
            people,
            vec![Person::new("Ada", "Lovelace"), Person::new("Alan", "Turing")]
        );

        drop(reopened);
        remove_db(&path);
    }

    #[test]
    fn test_open_with_normal_synchronous() {
        let path = test_db_path("sync_normal");
        remove_db(&path);

        let options = StoreOptions {
            synchronous: Synchronous::Normal,
        };
        let mut store = SqliteStore::open(&path, options).unwrap();
        store.append("Ada", "Lovelace").unwrap();
        assert_eq!(store.fetch_all().unwrap().len(), 1);

        let level: i64 = store
            .conn
            .as_ref()
            .unwrap()
            .query_row("PRAGMA synchronous", [], |row| row.get(0))
            .unwrap();
        // NORMAL is 1, FULL is 2
        assert_eq!(level, 1);

        drop(store);
        remove_db(&path);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let root = std::env::temp_dir().join(format!("namebook_test_{}_nested", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        let nested_path = root.join("a/b/people.db");

        let store = SqliteStore::open(&nested_path, StoreOptions::default()).unwrap();
        assert!(nested_path.exists());

        drop(store);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_unavailable_when_parent_is_a_file() {
        let root =
            std::env::temp_dir().join(format!("namebook_test_{}_blocked", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(&root).unwrap();
        let blocker = root.join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let mut store = SqliteStore::new(blocker.join("people.db"), StoreOptions::default());

        let err = store.append("Ada", "Lovelace").unwrap_err();
        assert!(err.is_unavailable());
        assert!(!store.is_connected());

        let err = store.fetch_all().unwrap_err();
        assert!(err.is_unavailable());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_acquisition_retried_after_failure() {
        let root =
            std::env::temp_dir().join(format!("namebook_test_{}_retry", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(&root).unwrap();
        let blocker = root.join("data");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let mut store = SqliteStore::new(blocker.join("people.db"), StoreOptions::default());
        assert!(store.append("Ada", "Lovelace").unwrap_err().is_unavailable());

        std::fs::remove_file(&blocker).unwrap();

        store.append("Alan", "Turing").unwrap();
        assert_eq!(store.fetch_all().unwrap(), vec![Person::new("Alan", "Turing")]);

        drop(store);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_write_failed_when_table_missing() {
        let mut store = create_test_store();
        store
            .conn
            .as_ref()
            .unwrap()
            .execute_batch("DROP TABLE person")
            .unwrap();

        let err = store.append("Ada", "Lovelace").unwrap_err();
        assert!(matches!(err, StoreError::WriteFailed(_)));
    }

    #[test]
    fn test_read_failed_when_table_missing() {
        let mut store = create_test_store();
        store
            .conn
            .as_ref()
            .unwrap()
            .execute_batch("DROP TABLE person")
            .unwrap();

        let err = store.fetch_all().unwrap_err();
        assert!(matches!(err, StoreError::ReadFailed(_)));
    }

    #[test]
    fn test_failed_append_leaves_no_partial_record() {
        let mut store = create_test_store();
        store.append("Ada", "Lovelace").unwrap();
        store
            .conn
            .as_ref()
            .unwrap()
            .execute_batch(
                r"
                CREATE TRIGGER reject_turing BEFORE INSERT ON person
                WHEN NEW.last_name = 'Turing'
                BEGIN
                    SELECT RAISE(ABORT, 'rejected');
                END;
                ",
            )
            .unwrap();

        let err = store.append("Alan", "Turing").unwrap_err();
        assert!(matches!(err, StoreError::WriteFailed(_)));

        let people = store.fetch_all().unwrap();
        assert_eq!(people, vec![Person::new("Ada", "Lovelace")]);
    }
}
