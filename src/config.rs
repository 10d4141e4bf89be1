use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
  pub news: NewsConfig,
  pub cache: CacheConfig,
  /// Override for the store database path (defaults to the platform data dir)
  pub store_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
  pub base_url: String,
  /// Topic query driving the main feed
  pub topic_query: String,
  /// Country for the headline fallback endpoint
  pub fallback_country: String,
  pub page_size: u32,
  pub timeout_seconds: u64,
}

impl Default for NewsConfig {
  fn default() -> Self {
    Self {
      base_url: "https://newsapi.org/v2/".to_string(),
      topic_query: "technology OR business OR sports OR health OR science".to_string(),
      fallback_country: "us".to_string(),
      page_size: 10,
      timeout_seconds: 15,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// Minutes a cached feed counts as fresh
  pub ttl_minutes: i64,
  pub max_articles: usize,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      ttl_minutes: crate::cache::DEFAULT_TTL_MINUTES,
      max_articles: crate::cache::DEFAULT_CAP,
    }
  }
}

impl CacheConfig {
  /// The configured TTL as a time span. An out-of-range `ttl_minutes` reads
  /// as the default.
  pub fn ttl(&self) -> chrono::Duration {
    match chrono::Duration::try_minutes(self.ttl_minutes) {
      Some(ttl) => ttl,
      None => {
        warn!(ttl_minutes = self.ttl_minutes, "ttl_minutes out of range, using default");
        chrono::Duration::minutes(crate::cache::DEFAULT_TTL_MINUTES)
      }
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./newsreel.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/newsreel/config.yaml
  /// 4. ~/.config/newsreel/config.yaml
  ///
  /// Every field has a default, so a missing file (when no explicit path was
  /// given) yields the built-in configuration rather than an error.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("newsreel.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("newsreel").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Get the news provider API key from environment variables.
  ///
  /// Checks NEWSREEL_API_KEY first, then NEWS_API_KEY as fallback.
  pub fn api_key() -> Result<String> {
    std::env::var("NEWSREEL_API_KEY")
      .or_else(|_| std::env::var("NEWS_API_KEY"))
      .map_err(|_| {
        eyre!("Provider API key not found. Set NEWSREEL_API_KEY or NEWS_API_KEY environment variable.")
      })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.news.base_url, "https://newsapi.org/v2/");
    assert_eq!(config.news.page_size, 10);
    assert_eq!(config.news.timeout_seconds, 15);
    assert_eq!(config.cache.ttl_minutes, 60);
    assert_eq!(config.cache.max_articles, 100);
    assert_eq!(config.store_path, None);
  }

  #[test]
  fn test_partial_yaml_overlays_defaults() {
    let yaml = "
news:
  page_size: 25
cache:
  max_articles: 40
";
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.news.page_size, 25);
    assert_eq!(config.news.fallback_country, "us");
    assert_eq!(config.cache.max_articles, 40);
    assert_eq!(config.cache.ttl_minutes, 60);
  }

  #[test]
  fn test_out_of_range_ttl_falls_back_to_default() {
    let custom = CacheConfig { ttl_minutes: 30, max_articles: 40 };
    assert_eq!(custom.ttl(), chrono::Duration::minutes(30));

    let overflow = CacheConfig { ttl_minutes: i64::MAX, max_articles: 40 };
    assert_eq!(overflow.ttl(), chrono::Duration::minutes(60));
  }
}
