//! End-to-end feed behavior over a durable store.
//!
//! Each test opens a SQLite store in its own temp directory and drives the
//! synchronizer across simulated sessions: new process, new source, same
//! database file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use newsreel::net::ConnectivityMonitor;
use newsreel::news::{Article, Category, MockSource, Page};
use newsreel::store::SqliteStore;
use newsreel::sync::{FeedContext, FeedSynchronizer};
use newsreel::{ArticleCache, FavoritesLedger};

fn temp_db_path(name: &str) -> PathBuf {
  let nanos = std::time::SystemTime::now()
    .duration_since(std::time::UNIX_EPOCH)
    .unwrap()
    .subsec_nanos();
  std::env::temp_dir()
    .join(format!("newsreel-flow-{}-{}-{}", name, std::process::id(), nanos))
    .join("store.db")
}

fn cleanup(path: &Path) {
  if let Some(dir) = path.parent() {
    let _ = std::fs::remove_dir_all(dir);
  }
}

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

fn page_of(prefix: &str, count: usize, has_more: bool) -> Page<Article> {
  Page {
    data: (0..count).map(|i| article(&format!("{prefix}{i}"))).collect(),
    total: 50,
    page: 1,
    limit: 10,
    has_more,
  }
}

fn synchronizer(
  path: &Path,
  source: &MockSource,
  monitor: &ConnectivityMonitor,
) -> FeedSynchronizer<SqliteStore> {
  let store = Arc::new(SqliteStore::open_at(path).unwrap());
  FeedSynchronizer::new(FeedContext {
    cache: ArticleCache::new(Arc::clone(&store)),
    favorites: FavoritesLedger::new(store),
    source: Arc::new(source.clone()),
    connectivity: monitor.handle(),
    page_size: 10,
  })
}

#[tokio::test]
async fn feed_survives_restart_and_outage() {
  let path = temp_db_path("restart");
  let monitor = ConnectivityMonitor::new();

  // Session 1: load two pages, favorite an article.
  {
    let source = MockSource::new();
    source.queue_page(page_of("a", 10, true));
    source.queue_page(page_of("b", 5, false));

    let mut sync = synchronizer(&path, &source, &monitor);
    let state = sync.initial_load().await;
    assert_eq!(state.articles.len(), 10);

    let state = sync.load_more().await;
    assert_eq!(state.articles.len(), 15);
    assert_eq!(state.page, 2);
    assert!(!state.has_more);

    sync.toggle_favorite("a3").unwrap();
  }

  // Session 2: the fresh cache answers without a network call. Only the
  // first page was written through, so the window is back to ten articles.
  {
    let source = MockSource::new();
    let mut sync = synchronizer(&path, &source, &monitor);

    let state = sync.initial_load().await;
    assert_eq!(state.articles.len(), 10);
    assert_eq!(state.error, None);
    assert!(state.last_sync_time.is_some());
    assert_eq!(source.call_count(), 0);
    assert!(sync.is_favorite("a3"));
  }

  // Session 3: provider outage. Refresh fails but the stale cache serves.
  {
    let source = MockSource::new();
    source.queue_error("gateway timeout");
    let mut sync = synchronizer(&path, &source, &monitor);

    let state = sync.refresh().await;
    assert_eq!(state.articles.len(), 10);
    assert!(state.error.unwrap().contains("gateway timeout"));
    assert_eq!(source.call_count(), 1);

    sync.clear_cache().unwrap();
  }

  // Session 4: with the cache wiped and nothing loaded yet, the favorite
  // survives only as an unresolved id.
  {
    let source = MockSource::new();
    let sync = synchronizer(&path, &source, &monitor);

    let view = sync.favorites_view();
    assert!(view.articles.is_empty());
    assert_eq!(view.unresolved, vec!["a3"]);
  }

  cleanup(&path);
}

#[tokio::test]
async fn favorite_resolves_once_article_arrives() {
  let path = temp_db_path("favorite");
  let monitor = ConnectivityMonitor::new();
  let source = MockSource::new();
  let mut sync = synchronizer(&path, &source, &monitor);

  sync.toggle_favorite("a2").unwrap();
  let view = sync.favorites_view();
  assert!(view.articles.is_empty());
  assert_eq!(view.unresolved, vec!["a2"]);

  source.queue_page(page_of("a", 5, false));
  sync.initial_load().await;

  let view = sync.favorites_view();
  assert_eq!(view.articles.len(), 1);
  assert_eq!(view.articles[0].id, "a2");
  assert!(view.unresolved.is_empty());

  cleanup(&path);
}

#[tokio::test]
async fn expired_cache_refetches_on_next_session() {
  let path = temp_db_path("expired");
  let monitor = ConnectivityMonitor::new();

  {
    let source = MockSource::new();
    source.queue_page(page_of("a", 10, true));
    let mut sync = synchronizer(&path, &source, &monitor);
    sync.initial_load().await;
  }

  // Session 2 with a zero TTL: everything cached is already expired.
  let source = MockSource::new();
  source.queue_page(page_of("b", 10, true));
  let store = Arc::new(SqliteStore::open_at(&path).unwrap());
  let mut sync = FeedSynchronizer::new(FeedContext {
    cache: ArticleCache::new(Arc::clone(&store)).with_ttl(chrono::Duration::zero()),
    favorites: FavoritesLedger::new(store),
    source: Arc::new(source.clone()),
    connectivity: monitor.handle(),
    page_size: 10,
  });

  let state = sync.initial_load().await;
  assert_eq!(source.call_count(), 1);
  assert!(state.articles.iter().all(|a| a.id.starts_with('b')));

  cleanup(&path);
}
