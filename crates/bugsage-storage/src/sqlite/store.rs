//! [`SqliteStore`] -- SQLite-backed bug store.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{Result, StorageError};
use crate::sqlite::schema;

/// SQLite-backed implementation of the [`BugStore`](crate::traits::BugStore) trait.
///
/// Wraps a [`rusqlite::Connection`] in a `Mutex` for thread safety. All
/// public methods acquire the lock, execute SQL, and release it, so each
/// lifecycle operation sees a consistent view of the database.
pub struct SqliteStore {
    /// The mutex-protected SQLite connection.
    pub(crate) conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) a SQLite database at the given path.
    ///
    /// Creates missing parent directories, enables WAL mode and foreign
    /// keys, then initialises the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!(?path, "opening SQLite database");

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Connection(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let conn = Connection::open(path).map_err(|e| {
            StorageError::Connection(format!("failed to open {}: {e}", path.display()))
        })?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.configure_connection()?;
        store.init_schema()?;

        Ok(store)
    }

    /// Opens an in-memory SQLite database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        debug!("opening in-memory SQLite database");
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("failed to open in-memory db: {e}")))?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.configure_connection()?;
        store.init_schema()?;

        Ok(store)
    }

    /// Sets connection pragmas (WAL mode, foreign keys, busy timeout).
    fn configure_connection(&self) -> Result<()> {
        let conn = self.lock_conn()?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )
        .map_err(|e| StorageError::Connection(format!("failed to set pragmas: {e}")))?;

        Ok(())
    }

    /// Creates all tables and indexes if they do not exist, then runs
    /// migrations.
    fn init_schema(&self) -> Result<()> {
        let conn = self.lock_conn()?;

        // Check if schema is already at current version.
        let version: std::result::Result<i32, _> = conn.query_row(
            "SELECT value FROM config WHERE key = 'schema_version'",
            [],
            |row| {
                let v: String = row.get(0)?;
                Ok(v.parse::<i32>().unwrap_or(0))
            },
        );
        if let Ok(v) = version {
            if v >= schema::CURRENT_SCHEMA_VERSION {
                debug!(version = v, "schema already at current version, skipping init");
                return Ok(());
            }
        }

        for stmt in schema::SCHEMA_STATEMENTS {
            conn.execute_batch(stmt).map_err(|e| StorageError::Migration {
                name: "init_schema".into(),
                reason: format!("{e}\nStatement: {}", truncate(stmt, 120)),
            })?;
        }

        Self::run_migrations_on_conn(&conn)?;

        conn.execute(
            "INSERT OR REPLACE INTO config (key, value) VALUES ('schema_version', ?1)",
            rusqlite::params![schema::CURRENT_SCHEMA_VERSION.to_string()],
        )
        .map_err(|e| StorageError::Migration {
            name: "schema_version".into(),
            reason: e.to_string(),
        })?;

        info!("schema initialized (version {})", schema::CURRENT_SCHEMA_VERSION);
        Ok(())
    }

    /// Applies pending migrations tracked via the `metadata` table.
    fn run_migrations_on_conn(conn: &Connection) -> Result<()> {
        for &(name, sql) in schema::MIGRATIONS {
            let key = format!("migration:{name}");
            let already_applied: bool = conn
                .query_row(
                    "SELECT COUNT(*) FROM metadata WHERE key = ?1",
                    rusqlite::params![key],
                    |row| row.get::<_, i32>(0),
                )
                .unwrap_or(0)
                > 0;

            if already_applied {
                debug!(name, "migration already applied, skipping");
                continue;
            }

            debug!(name, "applying migration");
            conn.execute_batch(sql).map_err(|e| StorageError::Migration {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

            conn.execute(
                "INSERT INTO metadata (key, value) VALUES (?1, ?2)",
                rusqlite::params![key, "applied"],
            )
            .map_err(|e| StorageError::Migration {
                name: name.to_string(),
                reason: format!("failed to mark migration: {e}"),
            })?;
        }
        Ok(())
    }

    /// Acquires the connection lock. Helper used by all operation modules.
    pub(crate) fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Connection(format!("mutex poisoned: {e}")))
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

/// Truncates a string for error messages.
fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_in_memory_creates_tables() {
        let store = SqliteStore::open_in_memory().unwrap();
        let conn = store.lock_conn().unwrap();
        let count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('users', 'projects', 'bugs', 'comments', 'attachments', 'bug_history')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 6);
    }

    #[test]
    fn schema_version_set() {
        let store = SqliteStore::open_in_memory().unwrap();
        let conn = store.lock_conn().unwrap();
        let version: String = conn
            .query_row(
                "SELECT value FROM config WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(version, schema::CURRENT_SCHEMA_VERSION.to_string());
    }

    #[test]
    fn migrations_recorded() {
        let store = SqliteStore::open_in_memory().unwrap();
        let conn = store.lock_conn().unwrap();
        let applied: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM metadata WHERE key LIKE 'migration:%'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(applied as usize, schema::MIGRATIONS.len());
    }

    #[test]
    fn idempotent_init() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.init_schema().unwrap();
    }

    #[test]
    fn open_file_creates_parent_dirs() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("bugsage.db");
        let store = SqliteStore::open(&path).unwrap();
        drop(store);
        assert!(path.exists());
        // Re-open hits the "already at current version" path.
        SqliteStore::open(&path).unwrap();
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé...");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
