//! SQLite-backed key-value persistence adapter.

use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::common::error::StoreError;

/// Key-value store over a single SQLite table.
///
/// Addressed by a `sqlite://` connection URL. The connection lives for the
/// lifetime of the store.
pub struct KvStore {
    conn: Mutex<Connection>,
}

impl KvStore {
    /// Open a store at the given connection URL.
    pub fn open(url: &str) -> Result<Self, StoreError> {
        let Some(path) = url.strip_prefix("sqlite://") else {
            return Err(StoreError::InvalidUrl {
                url: url.to_string(),
            });
        };
        Self::with_connection(Connection::open(path)?)
    }

    /// Open an in-memory store.
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Fetch the value for a key, or `None` if absent.
    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set the value for a key, overwriting any existing value.
    pub fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_none() {
        let store = KvStore::in_memory().unwrap();
        assert_eq!(store.get("absent").unwrap(), None);
    }

    #[test]
    fn test_set_then_get() {
        let store = KvStore::in_memory().unwrap();
        store.set("guild", "{}").unwrap();
        assert_eq!(store.get("guild").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_set_overwrites() {
        let store = KvStore::in_memory().unwrap();
        store.set("guild", "old").unwrap();
        store.set("guild", "new").unwrap();
        assert_eq!(store.get("guild").unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn test_rejects_unsupported_scheme() {
        let result = KvStore::open("redis://localhost/0");
        assert!(matches!(result, Err(StoreError::InvalidUrl { .. })));
    }
}
