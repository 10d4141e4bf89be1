//! Library-level error type.

use thiserror::Error;

use crate::news::FetchError;
use crate::store::StoreError;

/// Errors surfaced by the feed engine.
///
/// None of these is fatal: the synchronizer recovers from fetch failures by
/// falling back to cached data and reports them through `FeedState::error`,
/// and cache reads are fail-open (a corrupt entry is a miss, never an error).
#[derive(Debug, Error)]
pub enum Error {
  #[error("fetch failed: {0}")]
  Fetch(#[from] FetchError),

  #[error("storage error: {0}")]
  Store(#[from] StoreError),

  #[error("serialization error: {0}")]
  Serialize(#[from] serde_json::Error),

  #[error("article not found: {0}")]
  NotFound(String),
}
