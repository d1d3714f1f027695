//! String-keyed persistence slots backing the board.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::config::AppConfig;

pub const TASKS_KEY: &str = "tasks";
pub const CUSTOM_FIELDS_KEY: &str = "custom_fields";

/// A get/set store of string blobs.
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn initialize(config: &AppConfig) -> Result<Self> {
        Self::open_path(config.db_path())
    }

    pub fn open_path(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to configure SQLite WAL mode")?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let storage = Self { conn };
        storage.apply_migrations()?;
        Ok(storage)
    }

    fn apply_migrations(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
             );",
        )?;
        Ok(())
    }
}

impl KeyValueStorage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .with_context(|| format!("Failed to read slot '{}'", key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .with_context(|| format!("Failed to write slot '{}'", key))?;
        Ok(())
    }
}

/// Volatile storage used by tests and throwaway boards.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry<K: Into<String>, V: Into<String>>(self, key: K, value: V) -> Self {
        self.slots.borrow_mut().insert(key.into(), value.into());
        self
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Reads and parses a slot. Missing, unreadable and malformed slots all
/// yield `None`.
pub fn load_json<T: DeserializeOwned>(storage: &dyn KeyValueStorage, key: &str) -> Option<T> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!(slot = key, error = %err, "failed to read storage slot");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(slot = key, error = %err, "discarding malformed storage slot");
            None
        }
    }
}

/// Serializes and writes a slot. Failures are logged and otherwise ignored.
pub fn save_json<T: Serialize + ?Sized>(storage: &dyn KeyValueStorage, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .context("Failed to serialize slot")
        .and_then(|raw| storage.set(key, &raw));
    if let Err(err) = result {
        warn!(slot = key, error = %err, "failed to persist storage slot");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn temp_config() -> (AppConfig, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let config = AppConfig::from_data_dir(dir.path().to_path_buf()).expect("config");
        (config, dir)
    }

    #[test]
    fn sqlite_slots_round_trip_and_overwrite() {
        let (config, _dir) = temp_config();
        let storage = SqliteStorage::initialize(&config).expect("initialize storage");

        assert_eq!(storage.get(TASKS_KEY).expect("get"), None);
        storage.set(TASKS_KEY, "[1]").expect("set");
        storage.set(TASKS_KEY, "[1,2]").expect("overwrite");
        assert_eq!(storage.get(TASKS_KEY).expect("get"), Some("[1,2]".into()));
    }

    #[test]
    fn sqlite_slots_survive_reopen() {
        let (config, _dir) = temp_config();
        {
            let storage = SqliteStorage::initialize(&config).expect("initialize storage");
            storage.set(CUSTOM_FIELDS_KEY, "[]").expect("set");
        }
        let reopened = SqliteStorage::initialize(&config).expect("reopen storage");
        assert_eq!(
            reopened.get(CUSTOM_FIELDS_KEY).expect("get"),
            Some("[]".into())
        );
    }

    #[test]
    fn load_json_discards_malformed_slots() {
        let storage = MemoryStorage::new().with_entry(TASKS_KEY, "{not json");
        let parsed: Option<Vec<u64>> = load_json(&storage, TASKS_KEY);
        assert_eq!(parsed, None);
    }

    #[test]
    fn save_then_load_json() {
        let storage = SqliteStorage::open_in_memory().expect("in-memory storage");
        save_json(&storage, "numbers", &vec![3u64, 1, 2]);
        let parsed: Option<Vec<u64>> = load_json(&storage, "numbers");
        assert_eq!(parsed, Some(vec![3, 1, 2]));
    }
}
