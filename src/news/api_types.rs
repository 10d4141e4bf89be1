//! Wire types for the provider API and their conversion into domain types.
//!
//! Every field the provider may omit or null out is an `Option` here; the
//! conversion into `Article` fills the gaps with fixed fallbacks so the rest
//! of the engine never sees a partial article.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::types::{stable_article_id, Article, Category};

#[derive(Debug, Deserialize)]
pub(super) struct ApiNewsResponse {
  #[serde(default)]
  pub status: String,
  pub message: Option<String>,
  #[serde(rename = "totalResults", default)]
  pub total_results: u64,
  pub articles: Option<Vec<ApiArticle>>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ApiArticle {
  pub source: Option<ApiSource>,
  pub author: Option<String>,
  pub title: Option<String>,
  pub description: Option<String>,
  pub url: Option<String>,
  #[serde(rename = "urlToImage")]
  pub url_to_image: Option<String>,
  #[serde(rename = "publishedAt")]
  pub published_at: Option<String>,
  pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiSource {
  #[allow(dead_code)]
  pub id: Option<String>,
  pub name: Option<String>,
}

/// Drop empty strings so they fall through to the next fallback.
fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.is_empty())
}

impl ApiArticle {
  /// Convert a provider row into a domain article.
  ///
  /// Fallbacks per field:
  /// - `title`: "No title"
  /// - `content`: description, then "No content available"
  /// - `summary`: description, then "No summary available"
  /// - `author`: source name, then "Unknown Author"
  /// - `published_at`: now, when missing or unparseable
  /// - `image_url`: none
  /// - `id`: hashed from the url, falling back to the title
  pub fn into_article(self) -> Article {
    let source_name = self.source.and_then(|s| non_empty(s.name));
    let title = non_empty(self.title).unwrap_or_else(|| "No title".to_string());
    let description = non_empty(self.description);
    let url = non_empty(self.url);

    let id = stable_article_id(url.as_deref().unwrap_or(&title));
    let published_at = non_empty(self.published_at)
      .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
      .map(|parsed| parsed.with_timezone(&Utc))
      .unwrap_or_else(Utc::now);

    Article {
      id,
      content: non_empty(self.content)
        .or_else(|| description.clone())
        .unwrap_or_else(|| "No content available".to_string()),
      summary: description.unwrap_or_else(|| "No summary available".to_string()),
      author: non_empty(self.author)
        .or_else(|| source_name.clone())
        .unwrap_or_else(|| "Unknown Author".to_string()),
      category: Category {
        id: "general".to_string(),
        name: source_name.unwrap_or_else(|| "General".to_string()),
        slug: "general".to_string(),
      },
      tags: vec!["news".to_string()],
      image_url: non_empty(self.url_to_image),
      source_url: url.unwrap_or_default(),
      title,
      published_at,
    }
  }
}
