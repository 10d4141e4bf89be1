//! Feed synchronizer.
//!
//! Owns the feed read model (`FeedState`) and drives it through the cache
//! and the news source. Page 1 is served from a valid cache without touching
//! the network; a miss or an explicit refresh fetches and writes through; a
//! failed fetch falls back to whatever the cache still holds. Deeper pages
//! go straight to the source and live only in the in-memory window.
//!
//! Methods take `&mut self`, so the guard flags on `FeedState` are the only
//! concurrency control needed with a single driving task. Consumers that
//! want push updates subscribe to the watch channel.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::cache::ArticleCache;
use crate::error::Error;
use crate::favorites::FavoritesLedger;
use crate::net::ConnectivityHandle;
use crate::news::{Article, Category, NewsSource, Page};
use crate::store::KeyValueStore;

/// Snapshot of the feed as consumers see it.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
  pub articles: Vec<Article>,
  /// 1-based number of the last successfully loaded page.
  pub page: u32,
  pub has_more: bool,
  pub is_loading: bool,
  pub is_loading_more: bool,
  /// Latest connectivity report. Advisory only; fetch failures, not this
  /// flag, drive the offline fallback.
  pub is_offline: bool,
  /// Message from the most recent failed operation, cleared when the next
  /// one starts.
  pub error: Option<String>,
  pub last_sync_time: Option<DateTime<Utc>>,
}

impl Default for FeedState {
  fn default() -> Self {
    Self {
      articles: Vec::new(),
      page: 1,
      has_more: true,
      is_loading: false,
      is_loading_more: false,
      is_offline: false,
      error: None,
      last_sync_time: None,
    }
  }
}

/// Favorites resolved against article data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoritesView {
  /// Favorites with article data on hand, in the order they were added.
  pub articles: Vec<Article>,
  /// Favorited ids whose articles are no longer in the window or the cache.
  pub unresolved: Vec<String>,
}

/// Everything the synchronizer needs to drive a feed.
pub struct FeedContext<S: KeyValueStore> {
  pub cache: ArticleCache<S>,
  pub favorites: FavoritesLedger<S>,
  pub source: Arc<dyn NewsSource>,
  pub connectivity: ConnectivityHandle,
  pub page_size: u32,
}

/// Drives the feed read model through the cache and the news source.
pub struct FeedSynchronizer<S: KeyValueStore> {
  cache: ArticleCache<S>,
  favorites: FavoritesLedger<S>,
  source: Arc<dyn NewsSource>,
  connectivity: ConnectivityHandle,
  page_size: u32,
  state: FeedState,
  updates: watch::Sender<FeedState>,
}

impl<S: KeyValueStore> FeedSynchronizer<S> {
  pub fn new(context: FeedContext<S>) -> Self {
    let (updates, _) = watch::channel(FeedState::default());
    Self {
      cache: context.cache,
      favorites: context.favorites,
      source: context.source,
      connectivity: context.connectivity,
      page_size: context.page_size,
      state: FeedState::default(),
      updates,
    }
  }

  /// Current state with the live connectivity flag folded in.
  pub fn state(&self) -> FeedState {
    let mut state = self.state.clone();
    state.is_offline = self.connectivity.is_offline();
    state
  }

  /// Subscribe to state snapshots. The receiver always holds the latest.
  pub fn subscribe(&self) -> watch::Receiver<FeedState> {
    self.updates.subscribe()
  }

  /// Load the first page, preferring a still-fresh cache over the network.
  pub async fn initial_load(&mut self) -> FeedState {
    self.state.is_loading = true;
    self.state.error = None;
    self.publish();

    self.load_front_page().await;

    self.state.is_loading = false;
    self.publish();
    self.state()
  }

  /// Force a fresh first page, bypassing cache freshness.
  ///
  /// The cache is invalidated, not cleared, before the fetch. A refresh that
  /// fails still has the previous articles to fall back to.
  pub async fn refresh(&mut self) -> FeedState {
    self.state.is_loading = true;
    self.state.error = None;
    self.state.page = 1;
    self.publish();

    if let Err(e) = self.cache.invalidate() {
      warn!(error = %e, "cache invalidation failed");
    }
    self.load_front_page().await;

    self.state.is_loading = false;
    self.publish();
    self.state()
  }

  /// Fetch the next page and append it to the window.
  ///
  /// A no-op while another load is in flight or the feed is exhausted. An
  /// empty page marks the feed exhausted even when the provider claims
  /// otherwise. A failure leaves `page` and `has_more` untouched so the same
  /// page can be retried.
  pub async fn load_more(&mut self) -> FeedState {
    if self.state.is_loading_more || self.state.is_loading || !self.state.has_more {
      return self.state();
    }

    self.state.is_loading_more = true;
    self.state.error = None;
    self.publish();

    let next = self.state.page + 1;
    match self.source.fetch_page(next, self.page_size).await {
      Ok(page) if page.data.is_empty() => {
        debug!(page = next, "empty page, feed exhausted");
        self.state.has_more = false;
      }
      Ok(page) => {
        let added = self.append_new(page.data);
        self.state.page = next;
        self.state.has_more = page.has_more;
        info!(page = next, added, total = self.state.articles.len(), "loaded more articles");
      }
      Err(e) => {
        warn!(error = %e, page = next, "load more failed");
        self.state.error = Some(e.to_string());
      }
    }

    self.state.is_loading_more = false;
    self.publish();
    self.state()
  }

  async fn load_front_page(&mut self) {
    if self.cache.is_valid() {
      let cached = self.cache.read();
      if !cached.is_empty() {
        debug!(count = cached.len(), "serving fresh cache, skipping network");
        let synced_at = self.cache.cached_at();
        self.install_window(&cached, synced_at);
        return;
      }
    }

    match self.source.fetch_page(1, self.page_size).await {
      Ok(page) => {
        // An empty page never overwrites the cached articles.
        if !page.data.is_empty() {
          if let Err(e) = self.cache.merge_front(&page.data, self.page_size as usize) {
            warn!(error = %e, "cache write failed after fetch");
          }
        }
        self.state.articles = page.data;
        self.state.page = 1;
        self.state.has_more = page.has_more;
        self.state.last_sync_time = Some(Utc::now());
        info!(count = self.state.articles.len(), "feed loaded from network");
      }
      Err(e) => {
        warn!(error = %e, "fetch failed, falling back to cache");
        let cached = self.cache.read();
        if cached.is_empty() {
          self.state.articles = Vec::new();
        } else {
          let synced_at = self.cache.cached_at();
          self.install_window(&cached, synced_at);
        }
        self.state.error = Some(e.to_string());
      }
    }
  }

  /// Show the first page of `cached` in the window.
  fn install_window(&mut self, cached: &[Article], synced_at: Option<DateTime<Utc>>) {
    let limit = self.page_size as usize;
    self.state.articles = cached.iter().take(limit).cloned().collect();
    self.state.page = 1;
    self.state.has_more = cached.len() > limit;
    // A missing stamp, e.g. right after an invalidate, keeps the previous
    // sync time.
    if synced_at.is_some() {
      self.state.last_sync_time = synced_at;
    }
  }

  fn append_new(&mut self, fresh: Vec<Article>) -> usize {
    let known: HashSet<String> = self.state.articles.iter().map(|a| a.id.clone()).collect();
    let mut added = 0;
    for article in fresh {
      if !known.contains(&article.id) {
        self.state.articles.push(article);
        added += 1;
      }
    }
    added
  }

  fn publish(&self) {
    self.updates.send_replace(self.state());
  }

  // ============================================================================
  // Read models
  // ============================================================================

  /// Flip the favorite state of an article id. The id does not have to
  /// resolve to a known article.
  pub fn toggle_favorite(&self, id: &str) -> Result<bool, Error> {
    self.favorites.toggle(id)
  }

  pub fn is_favorite(&self, id: &str) -> bool {
    self.favorites.is_favorite(id)
  }

  /// Favorites in insertion order, resolved against the window and then the
  /// cache. Ids that resolve nowhere are reported, not dropped.
  pub fn favorites_view(&self) -> FavoritesView {
    let cached = self.cache.read();
    let mut view = FavoritesView::default();
    for id in self.favorites.all() {
      let found = self
        .state
        .articles
        .iter()
        .chain(cached.iter())
        .find(|article| article.id == id);
      match found {
        Some(article) => view.articles.push(article.clone()),
        None => view.unresolved.push(id),
      }
    }
    view
  }

  /// Look up a single article in the window, then the cache.
  pub fn article(&self, id: &str) -> Result<Article, Error> {
    if let Some(article) = self.state.articles.iter().find(|a| a.id == id) {
      return Ok(article.clone());
    }
    self
      .cache
      .find(id)
      .ok_or_else(|| Error::NotFound(id.to_string()))
  }

  pub fn categories(&self) -> Vec<Category> {
    self.cache.categories()
  }

  /// Search the provider directly. Results are paginated and never cached.
  pub async fn search(&self, query: &str, page: u32) -> Result<Page<Article>, Error> {
    let results = self.source.search(query, page, self.page_size).await?;
    Ok(results)
  }

  /// Drop the cached articles and freshness stamp. Favorites are untouched.
  pub fn clear_cache(&self) -> Result<(), Error> {
    self.cache.clear()
  }
}
