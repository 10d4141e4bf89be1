//! Mock news source for testing.
//!
//! Allows queueing pages and errors and capturing fetch calls for
//! verification.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{Article, FetchError, NewsSource, Page};

/// Mock `NewsSource` that replays scripted responses in order.
#[derive(Debug, Default)]
pub struct MockSource {
  inner: Arc<Mutex<MockSourceInner>>,
}

#[derive(Debug, Default)]
struct MockSourceInner {
  feed_queue: VecDeque<Result<Page<Article>, FetchError>>,
  search_queue: VecDeque<Result<Page<Article>, FetchError>>,
  feed_calls: Vec<(u32, u32)>,
  search_calls: Vec<(String, u32, u32)>,
}

impl MockSource {
  /// Create a new mock source.
  pub fn new() -> Self {
    Self::default()
  }

  /// Queue a page to be returned by the next `fetch_page()` call.
  pub fn queue_page(&self, page: Page<Article>) {
    let mut inner = self.inner.lock().unwrap();
    inner.feed_queue.push_back(Ok(page));
  }

  /// Queue a provider error to be returned by the next `fetch_page()` call.
  pub fn queue_error(&self, message: &str) {
    let mut inner = self.inner.lock().unwrap();
    inner
      .feed_queue
      .push_back(Err(FetchError::Provider(message.to_string())));
  }

  /// Queue a page to be returned by the next `search()` call.
  pub fn queue_search(&self, page: Page<Article>) {
    let mut inner = self.inner.lock().unwrap();
    inner.search_queue.push_back(Ok(page));
  }

  /// Get the (page, limit) pairs `fetch_page()` was called with.
  pub fn feed_calls(&self) -> Vec<(u32, u32)> {
    let inner = self.inner.lock().unwrap();
    inner.feed_calls.clone()
  }

  /// Number of `fetch_page()` calls so far.
  pub fn call_count(&self) -> usize {
    let inner = self.inner.lock().unwrap();
    inner.feed_calls.len()
  }

  /// Get the (query, page, limit) triples `search()` was called with.
  pub fn search_calls(&self) -> Vec<(String, u32, u32)> {
    let inner = self.inner.lock().unwrap();
    inner.search_calls.clone()
  }
}

impl Clone for MockSource {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

#[async_trait]
impl NewsSource for MockSource {
  async fn fetch_page(&self, page: u32, limit: u32) -> Result<Page<Article>, FetchError> {
    let mut inner = self.inner.lock().unwrap();
    inner.feed_calls.push((page, limit));
    inner
      .feed_queue
      .pop_front()
      .unwrap_or_else(|| Err(FetchError::Provider("no scripted response".to_string())))
  }

  async fn search(&self, query: &str, page: u32, limit: u32) -> Result<Page<Article>, FetchError> {
    let mut inner = self.inner.lock().unwrap();
    inner.search_calls.push((query.to_string(), page, limit));
    inner
      .search_queue
      .pop_front()
      .unwrap_or_else(|| Err(FetchError::Provider("no scripted response".to_string())))
  }
}
