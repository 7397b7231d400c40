//! SQLite-backed store for the studio follow-up automation engine.
//!
//! The database lives at `~/.studioops/studioops.db` and holds everything the
//! engine touches: clients, attendance, monthly payments, per-owner automation
//! settings, and the generated follow-up tasks and notifications. All rows are
//! partitioned by `owner_id`; the engine never crosses owners.
//!
//! `rusqlite::Connection` is not `Sync`, so embedders open one `StudioDb` per
//! thread; SQLite's write lock plus the busy timeout serialize concurrent
//! writers across connections.

use std::path::PathBuf;

use chrono::Utc;
use rusqlite::{params, Connection};

pub mod types;
pub use types::*;

pub mod attendance;
pub mod clients;
pub mod notifications;
pub mod payments;
pub mod settings;
pub mod tasks;

pub struct StudioDb {
    conn: Connection,
}

impl StudioDb {
    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn_ref(&self) -> &Connection {
        &self.conn
    }

    /// Execute a closure within an IMMEDIATE SQLite transaction.
    /// Commits on Ok, rolls back on Err.
    ///
    /// BEGIN IMMEDIATE takes the database write lock up front, so two
    /// concurrent transactions serialize: the second waits (up to the busy
    /// timeout) before it can even read. The refresh engine relies on this
    /// for its daily-guard check.
    pub fn with_transaction<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<DbError>,
    {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| E::from(DbError::Sqlite(e)))?;
        match f(self) {
            Ok(val) => {
                self.conn
                    .execute_batch("COMMIT")
                    .map_err(|e| E::from(DbError::Sqlite(e)))?;
                Ok(val)
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }

    /// Open (or create) the database at `~/.studioops/studioops.db` and apply
    /// the schema.
    pub fn open() -> Result<Self, DbError> {
        let path = Self::db_path()?;
        Self::open_at(path)
    }

    /// Open a database at an explicit path. Used by the CLI's `dbPath`
    /// override and by tests.
    pub fn open_at(path: PathBuf) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(DbError::CreateDir)?;
            }
        }

        let conn = Connection::open(&path)?;

        // WAL for concurrent-read performance; busy_timeout so a second
        // writer (another refresh invocation) waits instead of failing.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA busy_timeout=5000;")?;

        crate::migrations::run_migrations(&conn).map_err(DbError::Migration)?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        Ok(Self { conn })
    }

    /// Resolve the default database path: `~/.studioops/studioops.db`.
    fn db_path() -> Result<PathBuf, DbError> {
        let home = dirs::home_dir().ok_or(DbError::HomeDirNotFound)?;
        Ok(home.join(".studioops").join("studioops.db"))
    }
}

// =============================================================================
// Shared test utilities
// =============================================================================

#[cfg(test)]
pub mod test_utils {
    use super::StudioDb;

    /// Create a temporary database for testing.
    ///
    /// We leak the `TempDir` so the directory persists for the duration of the
    /// test. Test temp dirs are cleaned up by the OS. FK enforcement is
    /// disabled so that unit tests can insert rows without satisfying every
    /// foreign key constraint.
    pub fn test_db() -> StudioDb {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("test.db");
        std::mem::forget(dir);
        let db = StudioDb::open_at(path).expect("Failed to open test database");
        db.conn_ref()
            .execute_batch("PRAGMA foreign_keys = OFF;")
            .expect("disable FK for tests");
        db
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::test_utils::test_db;
    use super::*;

    #[test]
    fn test_open_creates_tables() {
        let db = test_db();
        for table in [
            "clients",
            "attendance_records",
            "payment_records",
            "automation_settings",
            "follow_up_tasks",
            "notifications",
        ] {
            let count: i32 = db
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })
                .unwrap_or_else(|e| panic!("{table} table should exist: {e}"));
            assert_eq!(count, 0);
        }
    }

    #[test]
    fn test_with_transaction_commits() {
        let db = test_db();
        db.with_transaction::<_, _, DbError>(|db| {
            db.conn_ref().execute(
                "INSERT INTO clients (id, owner_id, full_name) VALUES ('cl-1', 'o1', 'Dana')",
                [],
            )?;
            Ok(())
        })
        .expect("transaction should commit");

        let count: i32 = db
            .conn
            .query_row("SELECT COUNT(*) FROM clients", [], |row| row.get(0))
            .expect("count");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_with_transaction_rolls_back_on_err() {
        let db = test_db();
        let result: Result<(), DbError> = db.with_transaction(|db| {
            db.conn_ref().execute(
                "INSERT INTO clients (id, owner_id, full_name) VALUES ('cl-1', 'o1', 'Dana')",
                [],
            )?;
            Err(DbError::Migration("forced failure".to_string()))
        });
        assert!(result.is_err());

        let count: i32 = db
            .conn
            .query_row("SELECT COUNT(*) FROM clients", [], |row| row.get(0))
            .expect("count");
        assert_eq!(count, 0, "insert should have been rolled back");
    }
}
