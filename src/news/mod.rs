//! News provider boundary.
//!
//! `NewsSource` is the seam between the synchronizer and the outside world:
//! `NewsClient` implements it over the provider's HTTP API, `MockSource`
//! replays scripted pages in tests. Everything above this module works in
//! terms of fully-formed `Article` values.

mod api_types;
mod client;
mod mock;
mod types;

pub use client::NewsClient;
pub use mock::MockSource;
pub use types::{stable_article_id, Article, Category, Page};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from fetching articles.
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("network error: {0}")]
  Network(#[from] reqwest::Error),

  #[error("provider error: {0}")]
  Provider(String),

  #[error("provider response missing articles")]
  MissingArticles,

  #[error("invalid provider url: {0}")]
  Url(#[from] url::ParseError),
}

/// A paginated source of articles.
///
/// Implementations return fully-formed articles or an error, never partial
/// rows. An `Ok` page with no data is a valid end-of-feed signal, not an
/// error. Any provider-internal fallback (a secondary endpoint, say) happens
/// behind this trait; callers see a single fetch.
#[async_trait]
pub trait NewsSource: Send + Sync {
  /// Fetch one page of the main feed.
  async fn fetch_page(&self, page: u32, limit: u32) -> Result<Page<Article>, FetchError>;

  /// Search articles matching `query`.
  async fn search(&self, query: &str, page: u32, limit: u32) -> Result<Page<Article>, FetchError>;
}
