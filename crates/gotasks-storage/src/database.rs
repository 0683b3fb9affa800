//! Database connection and operations

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

use crate::migrations::run_migrations;
use crate::store::{KeyValueStore, StorageScope};
use crate::Result;

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open the database file. Session-scoped entries from a previous
    /// process are discarded.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for better concurrent performance
        let _: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

        run_migrations(&conn)?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.clear(StorageScope::Session)?;

        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    pub fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }

    /// Remove and return a value in one transaction.
    pub fn take(&self, scope: StorageScope, key: &str) -> Result<Option<String>> {
        let table = scope.table();
        self.transaction(|conn| {
            let value: Option<String> = conn
                .query_row(
                    &format!("SELECT value FROM {table} WHERE key = ?1"),
                    [key],
                    |row| row.get(0),
                )
                .optional()?;
            conn.execute(&format!("DELETE FROM {table} WHERE key = ?1"), [key])?;
            Ok(value)
        })
    }

    /// Delete keys starting with `prefix` last written before `cutoff`.
    /// Returns how many were removed.
    pub fn remove_stale(
        &self,
        scope: StorageScope,
        prefix: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<usize> {
        let table = scope.table();
        let cutoff = timestamp(cutoff);
        self.with_connection(|conn| {
            let removed = conn.execute(
                &format!(
                    "DELETE FROM {table} WHERE substr(key, 1, length(?1)) = ?1 AND updated_at < ?2"
                ),
                rusqlite::params![prefix, cutoff],
            )?;
            if removed > 0 {
                tracing::debug!(scope = %scope, prefix, removed, "Removed stale entries");
            }
            Ok(removed)
        })
    }
}

/// Fixed-width UTC timestamp so `updated_at` sorts as text
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl KeyValueStore for Database {
    fn get(&self, scope: StorageScope, key: &str) -> Result<Option<String>> {
        let table = scope.table();
        self.with_connection(|conn| {
            let value = conn
                .query_row(
                    &format!("SELECT value FROM {table} WHERE key = ?1"),
                    [key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value)
        })
    }

    fn set(&self, scope: StorageScope, key: &str, value: &str) -> Result<()> {
        let table = scope.table();
        let updated_at = timestamp(Utc::now());
        self.with_connection(|conn| {
            conn.execute(
                &format!(
                    "INSERT OR REPLACE INTO {table} (key, value, updated_at) VALUES (?1, ?2, ?3)"
                ),
                rusqlite::params![key, value, updated_at],
            )?;
            Ok(())
        })
    }

    fn remove(&self, scope: StorageScope, key: &str) -> Result<()> {
        let table = scope.table();
        self.with_connection(|conn| {
            conn.execute(&format!("DELETE FROM {table} WHERE key = ?1"), [key])?;
            Ok(())
        })
    }

    fn clear(&self, scope: StorageScope) -> Result<()> {
        let table = scope.table();
        self.with_connection(|conn| {
            let removed = conn.execute(&format!("DELETE FROM {table}"), [])?;
            tracing::debug!(scope = %scope, removed, "Cleared storage scope");
            Ok(())
        })
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}
