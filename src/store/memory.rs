//! In-memory store backend for tests and ephemeral sessions.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{KeyValueStore, StoreError};

/// A `KeyValueStore` backed by a plain `HashMap`.
///
/// Nothing survives the process; useful wherever durability is not part of
/// the exercise.
#[derive(Debug, Default)]
pub struct MemoryStore {
  inner: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl KeyValueStore for MemoryStore {
  fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
    let inner = self.inner.lock().map_err(|_| StoreError::Poisoned)?;
    Ok(inner.get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
    let mut inner = self.inner.lock().map_err(|_| StoreError::Poisoned)?;
    inner.insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn delete(&self, key: &str) -> Result<(), StoreError> {
    let mut inner = self.inner.lock().map_err(|_| StoreError::Poisoned)?;
    inner.remove(key);
    Ok(())
  }

  fn clear(&self) -> Result<(), StoreError> {
    let mut inner = self.inner.lock().map_err(|_| StoreError::Poisoned)?;
    inner.clear();
    Ok(())
  }
}
