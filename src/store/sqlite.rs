//! SQLite-backed store.
//!
//! A single `kv` table keyed by string. The connection lives behind a mutex;
//! every operation is a single statement, which gives the per-key atomicity
//! the `KeyValueStore` contract asks for.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use super::{KeyValueStore, StoreError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv (
  key TEXT PRIMARY KEY,
  value TEXT NOT NULL
);
";

/// Durable `KeyValueStore` stored in a single SQLite database file.
pub struct SqliteStore {
  conn: Mutex<Connection>,
}

impl SqliteStore {
  /// Open (creating if needed) the store at the default platform data path.
  pub fn open() -> Result<Self, StoreError> {
    Self::open_at(&Self::default_path()?)
  }

  /// Open (creating if needed) the store at `path`.
  pub fn open_at(path: &Path) -> Result<Self, StoreError> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    Self::run_migrations(&conn)?;
    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
  }

  fn default_path() -> Result<PathBuf, StoreError> {
    let base = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
      .ok_or(StoreError::NoDataDir)?;
    Ok(base.join("newsreel").join("store.db"))
  }
}

impl KeyValueStore for SqliteStore {
  fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
    let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
    let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?")?;
    let value = stmt
      .query_row(params![key], |row| row.get::<_, String>(0))
      .optional()?;
    Ok(value)
  }

  fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
    let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
    conn.execute(
      "INSERT OR REPLACE INTO kv (key, value) VALUES (?, ?)",
      params![key, value],
    )?;
    Ok(())
  }

  fn delete(&self, key: &str) -> Result<(), StoreError> {
    let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
    conn.execute("DELETE FROM kv WHERE key = ?", params![key])?;
    Ok(())
  }

  fn clear(&self) -> Result<(), StoreError> {
    let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
    conn.execute("DELETE FROM kv", [])?;
    Ok(())
  }
}
