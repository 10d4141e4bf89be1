//! Domain types for the feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A single news article.
///
/// Identity is the `id` alone: two articles with the same id are the same
/// article, and the newer fields win when they meet in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
  pub id: String,
  pub title: String,
  pub summary: String,
  pub content: String,
  pub author: String,
  pub published_at: DateTime<Utc>,
  pub category: Category,
  pub tags: Vec<String>,
  pub image_url: Option<String>,
  pub source_url: String,
}

/// A feed category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
  pub id: String,
  pub name: String,
  pub slug: String,
}

impl Category {
  /// The built-in category set, seeded into the cache on first read.
  pub fn defaults() -> Vec<Category> {
    [
      ("1", "Technology"),
      ("2", "Science"),
      ("3", "Business"),
      ("4", "Sports"),
      ("5", "Health"),
      ("6", "Entertainment"),
    ]
    .into_iter()
    .map(|(id, name)| Category {
      id: id.to_string(),
      name: name.to_string(),
      slug: name.to_lowercase(),
    })
    .collect()
  }
}

/// One page of a paginated result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
  pub data: Vec<T>,
  /// Total matching items as reported by the provider.
  pub total: u64,
  /// 1-based page number this window corresponds to.
  pub page: u32,
  /// Requested page size.
  pub limit: u32,
  /// Whether the provider reports further pages past this one.
  pub has_more: bool,
}

/// Derive a stable article id from a provider-side seed.
///
/// The seed is the article's URL when the provider supplies one, the title
/// otherwise. Hashing keeps ids identical across refetches so cached copies
/// and favorites line up with fresh fetches.
pub fn stable_article_id(seed: &str) -> String {
  let digest = Sha256::digest(seed.as_bytes());
  format!("newsapi-{}", hex::encode(&digest[..8]))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_stable_id_is_deterministic() {
    let a = stable_article_id("https://example.com/story");
    let b = stable_article_id("https://example.com/story");
    assert_eq!(a, b);
    assert!(a.starts_with("newsapi-"));
    assert_eq!(a.len(), "newsapi-".len() + 16);
  }

  #[test]
  fn test_stable_id_differs_per_seed() {
    let a = stable_article_id("https://example.com/story-one");
    let b = stable_article_id("https://example.com/story-two");
    assert_ne!(a, b);
  }

  #[test]
  fn test_default_categories() {
    let categories = Category::defaults();
    assert_eq!(categories.len(), 6);
    assert_eq!(categories[0].name, "Technology");
    assert_eq!(categories[0].slug, "technology");
  }
}
