//! Persistent key-value boundary used by the cache and the favorites ledger.
//!
//! The engine only needs string keys and string values with get/set/delete/
//! clear semantics; everything stored through it is serialized JSON. Two
//! backends ship: `SqliteStore` for durable storage and `MemoryStore` for
//! tests and ephemeral sessions.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use thiserror::Error;

/// Keys the engine persists under.
pub mod keys {
  /// Serialized article list for the feed cache.
  pub const ARTICLES: &str = "cached_articles";
  /// Timestamp of the last successful first-page fetch.
  pub const LAST_FETCH: &str = "last_fetch_time";
  /// Serialized category list.
  pub const CATEGORIES: &str = "cached_categories";
  /// Serialized list of favorited article ids.
  pub const FAVORITES: &str = "favorites";
}

/// Storage backend errors.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("could not determine data directory")]
  NoDataDir,

  #[error("failed to prepare store directory: {0}")]
  Io(#[from] std::io::Error),

  #[error("store lock poisoned")]
  Poisoned,

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),
}

/// String-keyed persistent storage.
///
/// Writes are atomic per key and visible once the call returns: a concurrent
/// reader observes either the previous value or the new one in full, never a
/// torn write.
pub trait KeyValueStore: Send + Sync {
  /// Read the value stored under `key`, if any.
  fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

  /// Store `value` under `key`, replacing any previous value.
  fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

  /// Remove the value stored under `key`. Missing keys are not an error.
  fn delete(&self, key: &str) -> Result<(), StoreError>;

  /// Remove every stored value.
  fn clear(&self) -> Result<(), StoreError>;
}
