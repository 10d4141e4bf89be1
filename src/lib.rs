//! Offline-first news feed engine.
//!
//! `newsreel` keeps a news feed usable without a connection. The cache layer
//! answers first-page loads while it is fresh and becomes the fallback when
//! a fetch fails; the synchronizer drives cache-vs-network policy, the
//! pagination state machine, and the favorites read model; the provider
//! client maps the upstream API into domain articles. A thin CLI in
//! `main.rs` drives the engine from the command line.

pub mod cache;
pub mod config;
pub mod error;
pub mod favorites;
pub mod net;
pub mod news;
pub mod store;
pub mod sync;

pub use cache::ArticleCache;
pub use config::Config;
pub use error::Error;
pub use favorites::FavoritesLedger;
pub use net::{ConnectivityHandle, ConnectivityMonitor};
pub use news::{Article, Category, FetchError, MockSource, NewsClient, NewsSource, Page};
pub use store::{KeyValueStore, MemoryStore, SqliteStore, StoreError};
pub use sync::{FavoritesView, FeedContext, FeedState, FeedSynchronizer};
