//! Persistence port: a string key-value store the trackers write through.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

pub const KEY_CONSUMED_TODAY: &str = "consumed-calories-today";
pub const KEY_DAILY_GOAL: &str = "daily-calorie-goal";
pub const KEY_TODAY_LOG: &str = "today-meal-log";
pub const KEY_TODAY_DATE: &str = "today-meal-log-date";
pub const KEY_HISTORY_LOG: &str = "historical-meal-log";
pub const KEY_PENDING_SYNC: &str = "pending-sync";
pub const KEY_GROWTH_GOALS: &str = "growth-goals";

pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<bool>;

    /// Write several keys as one unit. Implementations backed by a real
    /// database must make this all-or-nothing.
    fn set_many(&self, pairs: &[(&str, String)]) -> Result<()> {
        for (key, value) in pairs {
            self.set(key, value)?;
        }
        Ok(())
    }
}

/// Read a JSON value, resetting the slice to its default when it fails to
/// parse. Backend failures still propagate.
pub fn read_json_or_default<T, S>(store: &S, key: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    match store.get(key)? {
        None => Ok(T::default()),
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(err) => {
                let err = Error::malformed(key, err.to_string());
                tracing::warn!(%err, "resetting local state to default");
                store.remove(key)?;
                Ok(T::default())
            }
        },
    }
}

pub fn to_json<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::malformed(key, e.to_string()))
}

// --- In-memory ---

#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let mut map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(map.remove(key).is_some())
    }

    fn set_many(&self, pairs: &[(&str, String)]) -> Result<()> {
        let mut map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in pairs {
            map.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }
}

// --- SQLite ---

const DEFAULT_NAMESPACE: &str = "local";

pub struct SqliteStore {
    conn: Connection,
    namespace: String,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_namespaced(path, DEFAULT_NAMESPACE)
    }

    /// Open a view of the database restricted to one namespace, e.g. one
    /// user's state on the server.
    pub fn open_namespaced(path: &Path, namespace: &str) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| {
            Error::Storage(format!("Failed to open database {}: {e}", path.display()))
        })?;
        let store = SqliteStore {
            conn,
            namespace: namespace.to_string(),
        };
        store.migrate()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = SqliteStore {
            conn,
            namespace: DEFAULT_NAMESPACE.to_string(),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS kv_state (
                    namespace TEXT NOT NULL,
                    key TEXT NOT NULL,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    PRIMARY KEY (namespace, key)
                );
                PRAGMA user_version = 1;",
            )?;
        }
        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_state WHERE namespace = ?1 AND key = ?2",
                params![self.namespace, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO kv_state (namespace, key, value, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(namespace, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![self.namespace, key, value, now],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM kv_state WHERE namespace = ?1 AND key = ?2",
            params![self.namespace, key],
        )?;
        Ok(rows > 0)
    }

    fn set_many(&self, pairs: &[(&str, String)]) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO kv_state (namespace, key, value, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(namespace, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            )?;
            for (key, value) in pairs {
                stmt.execute(params![self.namespace, key, value, now])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
