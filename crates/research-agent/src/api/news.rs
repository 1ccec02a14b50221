//! News API client

use super::{endpoint_client, get_json};
use crate::config::EndpointSettings;
use crate::error::Result;
use crate::types::NewsResult;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument, warn};

/// Fetches recent articles; never fails, errors are carried in the result
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsFeed: Send + Sync {
    async fn get_news(&self, terms: &[String]) -> NewsResult;
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl RawArticle {
    /// URL when present, title otherwise
    fn identifier(self) -> Option<String> {
        let non_blank = |s: Option<String>| s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        non_blank(self.url).or_else(|| non_blank(self.title))
    }
}

/// Client for `GET {base_url}/news?q=...`
pub struct NewsClient {
    client: Client,
    settings: EndpointSettings,
}

impl NewsClient {
    pub fn new(settings: EndpointSettings) -> Result<Self> {
        Ok(Self {
            client: endpoint_client(&settings)?,
            settings,
        })
    }
}

#[async_trait]
impl NewsFeed for NewsClient {
    #[instrument(skip(self), fields(base_url = %self.settings.base_url))]
    async fn get_news(&self, terms: &[String]) -> NewsResult {
        let query = terms.join(" ");

        match get_json::<NewsResponse>(&self.client, &self.settings, "news", &query).await {
            Ok(response) => {
                let articles: Vec<String> = response
                    .articles
                    .into_iter()
                    .filter_map(RawArticle::identifier)
                    .collect();
                info!(articles = articles.len(), "News lookup completed");
                NewsResult::new(articles)
            }
            Err(message) => {
                warn!(error = %message, "News lookup failed");
                NewsResult::failed(message)
            }
        }
    }
}
