//! HTTP client for the news provider.

use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

use super::api_types::ApiNewsResponse;
use super::{Article, FetchError, NewsSource, Page};
use crate::config::NewsConfig;

/// `NewsSource` backed by the provider's HTTP API.
///
/// The main feed comes from the `everything` endpoint scoped to a topic
/// query; when that call fails the client retries once against
/// `top-headlines` before giving up. Search goes straight to `everything`
/// with the caller's query and no fallback.
pub struct NewsClient {
  http: reqwest::Client,
  base_url: Url,
  api_key: String,
  topic_query: String,
  fallback_country: String,
}

impl NewsClient {
  pub fn new(config: &NewsConfig, api_key: impl Into<String>) -> Result<Self, FetchError> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_seconds))
      .build()?;

    // Url::join drops the last path segment unless the base ends with '/'.
    let mut base = config.base_url.clone();
    if !base.ends_with('/') {
      base.push('/');
    }

    Ok(Self {
      http,
      base_url: Url::parse(&base)?,
      api_key: api_key.into(),
      topic_query: config.topic_query.clone(),
      fallback_country: config.fallback_country.clone(),
    })
  }

  async fn get_page(
    &self,
    endpoint: &str,
    params: &[(&str, &str)],
    page: u32,
    limit: u32,
  ) -> Result<Page<Article>, FetchError> {
    let url = self.base_url.join(endpoint)?;
    let response = self
      .http
      .get(url)
      .query(params)
      .query(&[("page", page.to_string()), ("pageSize", limit.to_string())])
      .query(&[("apiKey", self.api_key.as_str())])
      .send()
      .await?;

    let http_status = response.status();
    let body: ApiNewsResponse = response.json().await?;

    if body.status != "ok" {
      let message = body
        .message
        .unwrap_or_else(|| format!("provider returned http {http_status}"));
      return Err(FetchError::Provider(message));
    }

    let rows = body.articles.ok_or(FetchError::MissingArticles)?;
    debug!(endpoint, page, count = rows.len(), "fetched provider page");

    Ok(Page {
      data: rows.into_iter().map(|row| row.into_article()).collect(),
      total: body.total_results,
      has_more: u64::from(page) * u64::from(limit) < body.total_results,
      page,
      limit,
    })
  }
}

#[async_trait::async_trait]
impl NewsSource for NewsClient {
  async fn fetch_page(&self, page: u32, limit: u32) -> Result<Page<Article>, FetchError> {
    let primary = self
      .get_page(
        "everything",
        &[
          ("q", self.topic_query.as_str()),
          ("sortBy", "publishedAt"),
          ("language", "en"),
        ],
        page,
        limit,
      )
      .await;

    match primary {
      Ok(result) => Ok(result),
      Err(e) => {
        warn!(error = %e, "primary endpoint failed, trying top headlines");
        self
          .get_page(
            "top-headlines",
            &[("country", self.fallback_country.as_str())],
            page,
            limit,
          )
          .await
          .map_err(|fallback| {
            warn!(error = %fallback, "top headlines fallback failed");
            fallback
          })
      }
    }
  }

  async fn search(&self, query: &str, page: u32, limit: u32) -> Result<Page<Article>, FetchError> {
    self.get_page("everything", &[("q", query)], page, limit).await
  }
}
