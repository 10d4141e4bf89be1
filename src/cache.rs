//! TTL cache for the article feed.
//!
//! Articles and the freshness stamp live under separate keys so staleness can
//! be declared (`invalidate`) without dropping the data itself. Reads are
//! fail-open: a corrupt or unreadable entry logs and reads as empty rather
//! than erroring, since the cache can always be refilled from the network.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::error::Error;
use crate::news::{Article, Category};
use crate::store::{keys, KeyValueStore};

/// How long a cached feed counts as fresh.
pub const DEFAULT_TTL_MINUTES: i64 = 60;

/// Most articles kept in the cache at once.
pub const DEFAULT_CAP: usize = 100;

/// Article cache over a key-value store.
pub struct ArticleCache<S: KeyValueStore> {
  store: Arc<S>,
  ttl: Duration,
  cap: usize,
}

impl<S: KeyValueStore> ArticleCache<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self {
      store,
      ttl: Duration::minutes(DEFAULT_TTL_MINUTES),
      cap: DEFAULT_CAP,
    }
  }

  /// Override the freshness window.
  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = ttl;
    self
  }

  /// Override the article cap.
  pub fn with_cap(mut self, cap: usize) -> Self {
    self.cap = cap;
    self
  }

  /// Whether the cached feed is still inside its freshness window.
  ///
  /// A missing or unreadable stamp reads as stale.
  pub fn is_valid(&self) -> bool {
    match self.cached_at() {
      Some(at) => Utc::now() - at < self.ttl,
      None => false,
    }
  }

  /// When the cache was last written, if known.
  pub fn cached_at(&self) -> Option<DateTime<Utc>> {
    let raw = self.get_raw(keys::LAST_FETCH)?;
    match DateTime::parse_from_rfc3339(&raw) {
      Ok(at) => Some(at.with_timezone(&Utc)),
      Err(e) => {
        warn!(error = %e, "last fetch timestamp failed to parse");
        None
      }
    }
  }

  /// Read the cached articles. Missing or corrupt data reads as empty.
  pub fn read(&self) -> Vec<Article> {
    let raw = match self.get_raw(keys::ARTICLES) {
      Some(raw) => raw,
      None => return Vec::new(),
    };
    match serde_json::from_str(&raw) {
      Ok(articles) => articles,
      Err(e) => {
        warn!(error = %e, "cached articles failed to parse, treating as empty");
        Vec::new()
      }
    }
  }

  /// Replace the cached articles and stamp the cache fresh.
  pub fn write(&self, articles: &[Article]) -> Result<(), Error> {
    let payload = serde_json::to_string(articles)?;
    self.store.set(keys::ARTICLES, &payload)?;
    self.touch()?;
    debug!(count = articles.len(), "cached articles");
    Ok(())
  }

  /// Merge a fresh first page over the cached feed.
  ///
  /// The fresh articles take the front; cached articles past the first
  /// `page_size` keep their positions behind them, minus any that reappear
  /// in the fresh page. The result is capped, written back, and returned.
  /// Deep-scrolled articles survive a refresh this way.
  pub fn merge_front(
    &self,
    new_articles: &[Article],
    page_size: usize,
  ) -> Result<Vec<Article>, Error> {
    let cached = self.read();
    let new_ids: HashSet<&str> = new_articles.iter().map(|a| a.id.as_str()).collect();

    let mut merged: Vec<Article> = new_articles.to_vec();
    merged.extend(
      cached
        .into_iter()
        .skip(page_size)
        .filter(|article| !new_ids.contains(article.id.as_str())),
    );
    merged.truncate(self.cap);

    self.write(&merged)?;
    Ok(merged)
  }

  /// Mark the cache stale without dropping the articles.
  ///
  /// The next load refetches, but offline fallback still has data to serve.
  pub fn invalidate(&self) -> Result<(), Error> {
    self.store.delete(keys::LAST_FETCH)?;
    Ok(())
  }

  /// Drop the cached articles and the freshness stamp.
  pub fn clear(&self) -> Result<(), Error> {
    self.store.delete(keys::ARTICLES)?;
    self.store.delete(keys::LAST_FETCH)?;
    Ok(())
  }

  /// Look up a cached article by id.
  pub fn find(&self, id: &str) -> Option<Article> {
    self.read().into_iter().find(|article| article.id == id)
  }

  /// Read the cached categories, seeding the defaults on first use.
  pub fn categories(&self) -> Vec<Category> {
    if let Some(raw) = self.get_raw(keys::CATEGORIES) {
      match serde_json::from_str(&raw) {
        Ok(categories) => return categories,
        Err(e) => warn!(error = %e, "cached categories failed to parse, reseeding"),
      }
    }

    let defaults = Category::defaults();
    if let Err(e) = self.write_categories(&defaults) {
      warn!(error = %e, "failed to persist default categories");
    }
    defaults
  }

  /// Replace the cached categories.
  pub fn write_categories(&self, categories: &[Category]) -> Result<(), Error> {
    let payload = serde_json::to_string(categories)?;
    self.store.set(keys::CATEGORIES, &payload)?;
    Ok(())
  }

  fn touch(&self) -> Result<(), Error> {
    self.store.set(keys::LAST_FETCH, &Utc::now().to_rfc3339())?;
    Ok(())
  }

  fn get_raw(&self, key: &str) -> Option<String> {
    match self.store.get(key) {
      Ok(value) => value,
      Err(e) => {
        warn!(key, error = %e, "store read failed");
        None
      }
    }
  }
}

impl<S: KeyValueStore> Clone for ArticleCache<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      ttl: self.ttl,
      cap: self.cap,
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::store::MemoryStore;

  use super::*;

  fn article(id: &str) -> Article {
    Article {
      id: id.to_string(),
      title: format!("Title {id}"),
      summary: "summary".to_string(),
      content: "content".to_string(),
      author: "author".to_string(),
      published_at: Utc::now(),
      category: Category {
        id: "general".to_string(),
        name: "General".to_string(),
        slug: "general".to_string(),
      },
      tags: vec!["news".to_string()],
      image_url: None,
      source_url: format!("https://example.com/{id}"),
    }
  }

  fn articles(prefix: &str, count: usize) -> Vec<Article> {
    (0..count).map(|i| article(&format!("{prefix}{i}"))).collect()
  }

  fn cache() -> (ArticleCache<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (ArticleCache::new(Arc::clone(&store)), store)
  }

  #[test]
  fn test_never_written_cache_is_invalid() {
    let (cache, _) = cache();
    assert!(!cache.is_valid());
    assert!(cache.read().is_empty());
    assert_eq!(cache.cached_at(), None);
  }

  #[test]
  fn test_valid_after_write() {
    let (cache, _) = cache();
    cache.write(&articles("a", 3)).unwrap();
    assert!(cache.is_valid());
    assert!(cache.cached_at().is_some());
  }

  #[test]
  fn test_expires_when_ttl_elapses() {
    let (cache, _) = cache();
    let cache = cache.with_ttl(Duration::zero());
    cache.write(&articles("a", 1)).unwrap();
    assert!(!cache.is_valid());
  }

  #[test]
  fn test_read_roundtrip() {
    let (cache, _) = cache();
    let written = articles("a", 4);
    cache.write(&written).unwrap();
    assert_eq!(cache.read(), written);
  }

  #[test]
  fn test_corrupt_articles_read_as_empty() {
    let (cache, store) = cache();
    store.set(keys::ARTICLES, "not json").unwrap();
    assert!(cache.read().is_empty());
  }

  #[test]
  fn test_corrupt_timestamp_is_stale() {
    let (cache, store) = cache();
    cache.write(&articles("a", 1)).unwrap();
    store.set(keys::LAST_FETCH, "garbage").unwrap();
    assert!(!cache.is_valid());
    assert_eq!(cache.cached_at(), None);
  }

  #[test]
  fn test_merge_front_dedups_against_fresh_page() {
    let (cache, _) = cache();
    let cache = cache.with_cap(5);
    cache.write(&articles("a", 5)).unwrap();

    let mut refreshed_a3 = article("a3");
    refreshed_a3.title = "Updated a3".to_string();
    let fresh = vec![refreshed_a3, article("f")];

    let merged = cache.merge_front(&fresh, 2).unwrap();

    let ids: Vec<&str> = merged.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["a3", "f", "a2", "a4"]);
    assert_eq!(merged[0].title, "Updated a3");
  }

  #[test]
  fn test_merge_front_applies_cap() {
    let (cache, _) = cache();
    let cache = cache.with_cap(3);
    cache.write(&articles("a", 5)).unwrap();

    let merged = cache.merge_front(&articles("b", 2), 2).unwrap();

    let ids: Vec<&str> = merged.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["b0", "b1", "a2"]);
  }

  #[test]
  fn test_merge_front_keeps_deep_scroll() {
    let (cache, _) = cache();
    cache.write(&articles("a", 15)).unwrap();

    let merged = cache.merge_front(&articles("b", 10), 10).unwrap();

    assert_eq!(merged.len(), 15);
    assert_eq!(merged[0].id, "b0");
    assert_eq!(merged[10].id, "a10");
    assert_eq!(cache.read().len(), 15);
  }

  #[test]
  fn test_invalidate_keeps_articles() {
    let (cache, _) = cache();
    cache.write(&articles("a", 3)).unwrap();
    cache.invalidate().unwrap();

    assert!(!cache.is_valid());
    assert_eq!(cache.cached_at(), None);
    assert_eq!(cache.read().len(), 3);
  }

  #[test]
  fn test_clear_removes_articles_and_stamp() {
    let (cache, _) = cache();
    cache.write(&articles("a", 3)).unwrap();
    cache.clear().unwrap();

    assert!(!cache.is_valid());
    assert!(cache.read().is_empty());
  }

  #[test]
  fn test_find_by_id() {
    let (cache, _) = cache();
    cache.write(&articles("a", 3)).unwrap();

    assert_eq!(cache.find("a1").map(|a| a.id), Some("a1".to_string()));
    assert_eq!(cache.find("missing"), None);
  }

  #[test]
  fn test_categories_seed_and_overwrite() {
    let (cache, store) = cache();
    let seeded = cache.categories();
    assert_eq!(seeded.len(), 6);

    assert!(store.get(keys::CATEGORIES).unwrap().is_some());

    let custom = vec![Category {
      id: "7".to_string(),
      name: "Local".to_string(),
      slug: "local".to_string(),
    }];
    cache.write_categories(&custom).unwrap();
    assert_eq!(cache.categories(), custom);
  }
}
