// SQLite-backed string key/value store standing in for browser local storage.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

/// Persistent key/value storage. Values are plain strings with no schema or
/// versioning.
pub struct LocalStorage {
    conn: Mutex<Connection>,
}

impl LocalStorage {
    /// Open (or create) the store at `path`, creating parent directories as
    /// needed. Pass `":memory:"` for an ephemeral store (useful for tests).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path != Path::new(":memory:") {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create storage directory {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("failed to open storage at {}", path.display()))?;

        conn.execute_batch("PRAGMA busy_timeout = 5000;")
            .context("failed to set storage pragmas")?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS local_storage (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
        .context("failed to create storage schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Ephemeral store, mostly for tests.
    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    /// Panics if the mutex is poisoned, which only happens after another
    /// thread panicked mid-statement.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("storage mutex poisoned")
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT value FROM local_storage WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .with_context(|| format!("failed to read storage key {key}"))
    }

    /// Insert or overwrite `key`.
    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO local_storage (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )
        .with_context(|| format!("failed to write storage key {key}"))?;
        Ok(())
    }

    /// Remove `key`. Removing a missing key is a no-op.
    pub fn remove_item(&self, key: &str) -> Result<()> {
        let conn = self.conn();
        conn.execute("DELETE FROM local_storage WHERE key = ?1", params![key])
            .with_context(|| format!("failed to remove storage key {key}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_reads_none() {
        let store = LocalStorage::in_memory().unwrap();
        assert_eq!(store.get_item("nope").unwrap(), None);
    }

    #[test]
    fn set_then_overwrite() {
        let store = LocalStorage::in_memory().unwrap();
        store.set_item("k", "one").unwrap();
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("one"));
        store.set_item("k", "two").unwrap();
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn remove_is_idempotent() {
        let store = LocalStorage::in_memory().unwrap();
        store.set_item("k", "v").unwrap();
        store.remove_item("k").unwrap();
        store.remove_item("k").unwrap();
        assert_eq!(store.get_item("k").unwrap(), None);
    }

    #[test]
    fn values_survive_reopen() {
        let dir = std::env::temp_dir().join("scrumble_storage_reopen");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("storage.db");

        {
            let store = LocalStorage::open(&path).unwrap();
            store.set_item("scrumble-fp", "fp-1-0.5").unwrap();
        }
        let store = LocalStorage::open(&path).unwrap();
        assert_eq!(store.get_item("scrumble-fp").unwrap().as_deref(), Some("fp-1-0.5"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
