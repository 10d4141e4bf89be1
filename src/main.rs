use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use newsreel::config::Config;
use newsreel::net::ConnectivityMonitor;
use newsreel::news::{Article, NewsClient};
use newsreel::store::SqliteStore;
use newsreel::sync::{FeedContext, FeedState, FeedSynchronizer};
use newsreel::{ArticleCache, FavoritesLedger};

#[derive(Parser, Debug)]
#[command(name = "newsreel")]
#[command(about = "Offline-first news feed with cache-aware sync")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/newsreel/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Load the feed, serving the cache while it is still fresh
  Feed {
    /// Extra pages to fetch after the first
    #[arg(long, default_value_t = 0)]
    more: u32,
  },
  /// Force a fresh first page
  Refresh,
  /// Show a single cached article
  Show { id: String },
  /// Search the provider
  Search {
    query: String,
    #[arg(long, default_value_t = 1)]
    page: u32,
  },
  /// List favorites
  Favorites,
  /// Toggle an article's favorite state
  Fav { id: String },
  /// List categories
  Categories,
  /// Drop cached articles (favorites are kept)
  ClearCache,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let config = Config::load(args.config.as_deref())?;
  let _log_guard = init_logging()?;

  // Only the fetching commands need provider credentials.
  let needs_key = matches!(
    args.command,
    Command::Feed { .. } | Command::Refresh | Command::Search { .. }
  );
  let api_key = if needs_key { Config::api_key()? } else { String::new() };

  let store = Arc::new(match &config.store_path {
    Some(path) => SqliteStore::open_at(path)?,
    None => SqliteStore::open()?,
  });

  let monitor = ConnectivityMonitor::new();
  let client = NewsClient::new(&config.news, api_key)?;
  let context = FeedContext {
    cache: ArticleCache::new(Arc::clone(&store))
      .with_ttl(config.cache.ttl())
      .with_cap(config.cache.max_articles),
    favorites: FavoritesLedger::new(store),
    source: Arc::new(client),
    connectivity: monitor.handle(),
    page_size: config.news.page_size,
  };
  let mut sync = FeedSynchronizer::new(context);

  match args.command {
    Command::Feed { more } => {
      let mut state = sync.initial_load().await;
      for _ in 0..more {
        state = sync.load_more().await;
      }
      print_feed(&state);
    }
    Command::Refresh => {
      let state = sync.refresh().await;
      print_feed(&state);
    }
    Command::Show { id } => {
      // A fresh process only has the cache to look in.
      let article = sync.article(&id)?;
      println!("{}", article.title);
      println!(
        "by {} on {}",
        article.author,
        article.published_at.format("%Y-%m-%d %H:%M")
      );
      if !article.source_url.is_empty() {
        println!("{}", article.source_url);
      }
      println!();
      println!("{}", article.summary);
      println!();
      println!("{}", article.content);
    }
    Command::Search { query, page } => {
      let results = sync.search(&query, page).await?;
      for article in &results.data {
        print_article_line(article);
      }
      println!();
      println!(
        "page {} of about {} results{}",
        results.page,
        results.total,
        if results.has_more { ", more available" } else { "" }
      );
    }
    Command::Favorites => {
      let view = sync.favorites_view();
      for article in &view.articles {
        print_article_line(article);
      }
      for id in &view.unresolved {
        println!("(no longer cached)  [{id}]");
      }
    }
    Command::Fav { id } => {
      if sync.toggle_favorite(&id)? {
        println!("added {id} to favorites");
      } else {
        println!("removed {id} from favorites");
      }
    }
    Command::Categories => {
      for category in sync.categories() {
        println!("{}  {}", category.id, category.name);
      }
    }
    Command::ClearCache => {
      sync.clear_cache()?;
      println!("cache cleared");
    }
  }

  Ok(())
}

fn print_feed(state: &FeedState) {
  if let Some(error) = &state.error {
    if state.articles.is_empty() {
      eprintln!("error: {error}");
      return;
    }
    eprintln!("warning: {error} (showing cached articles)");
  }
  if state.is_offline {
    eprintln!("offline");
  }

  for article in &state.articles {
    print_article_line(article);
  }

  let synced = state
    .last_sync_time
    .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
    .unwrap_or_else(|| "never".to_string());
  println!();
  println!(
    "page {}, {} articles{}, last sync {}",
    state.page,
    state.articles.len(),
    if state.has_more { ", more available" } else { "" },
    synced
  );
}

fn print_article_line(article: &Article) {
  println!(
    "{}  {}  [{}]",
    article.published_at.format("%Y-%m-%d"),
    article.title,
    article.id
  );
}

/// Route logs to a daily file under the data directory; stdout stays clean
/// for command output.
fn init_logging() -> Result<WorkerGuard> {
  let log_dir = dirs::data_dir()
    .unwrap_or_else(std::env::temp_dir)
    .join("newsreel")
    .join("logs");
  std::fs::create_dir_all(&log_dir)?;

  let file_appender = tracing_appender::rolling::daily(&log_dir, "newsreel.log");
  let (writer, guard) = tracing_appender::non_blocking(file_appender);

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Ok(guard)
}
