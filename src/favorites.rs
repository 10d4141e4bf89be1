//! Favorites ledger.
//!
//! Favorites are article ids in the order the user added them, persisted
//! under their own key so clearing the article cache never touches them. An
//! id may outlive its article; resolution back to article data happens at
//! read time in the synchronizer.

use std::sync::Arc;

use tracing::warn;

use crate::error::Error;
use crate::store::{keys, KeyValueStore};

/// Insertion-ordered set of favorited article ids.
pub struct FavoritesLedger<S: KeyValueStore> {
  store: Arc<S>,
}

impl<S: KeyValueStore> FavoritesLedger<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  /// All favorited ids, oldest first. Missing or corrupt data reads as empty.
  pub fn all(&self) -> Vec<String> {
    let raw = match self.store.get(keys::FAVORITES) {
      Ok(Some(raw)) => raw,
      Ok(None) => return Vec::new(),
      Err(e) => {
        warn!(error = %e, "favorites read failed");
        return Vec::new();
      }
    };
    match serde_json::from_str(&raw) {
      Ok(ids) => ids,
      Err(e) => {
        warn!(error = %e, "favorites failed to parse, treating as empty");
        Vec::new()
      }
    }
  }

  pub fn is_favorite(&self, id: &str) -> bool {
    self.all().iter().any(|fav| fav == id)
  }

  /// Flip the favorite state of `id` and persist the result.
  ///
  /// Returns the new state: `true` when the id is now a favorite. The write
  /// lands before this returns, so a crash never loses an acknowledged
  /// toggle.
  pub fn toggle(&self, id: &str) -> Result<bool, Error> {
    let mut ids = self.all();
    let now_favorite = match ids.iter().position(|fav| fav == id) {
      Some(index) => {
        ids.remove(index);
        false
      }
      None => {
        ids.push(id.to_string());
        true
      }
    };
    self.persist(&ids)?;
    Ok(now_favorite)
  }

  /// Remove every favorite.
  pub fn clear(&self) -> Result<(), Error> {
    self.store.delete(keys::FAVORITES)?;
    Ok(())
  }

  fn persist(&self, ids: &[String]) -> Result<(), Error> {
    let payload = serde_json::to_string(ids)?;
    self.store.set(keys::FAVORITES, &payload)?;
    Ok(())
  }
}

impl<S: KeyValueStore> Clone for FavoritesLedger<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
    }
  }
}
