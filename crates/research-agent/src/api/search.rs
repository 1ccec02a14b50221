//! Web search API client

use super::{endpoint_client, get_json};
use crate::config::EndpointSettings;
use crate::error::Result;
use crate::types::{SearchHit, SearchResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument, warn};

/// Runs search queries; never fails, errors are carried in the result
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, terms: &[String]) -> SearchResult;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

impl SearchResponse {
    fn into_result(self) -> SearchResult {
        SearchResult::from_items(self.items.into_iter().filter_map(|item| {
            let url = item.url.filter(|u| !u.trim().is_empty())?;
            Some(SearchHit {
                url,
                snippet: item.snippet.unwrap_or_default(),
                title: item.title.unwrap_or_default(),
            })
        }))
    }
}

/// Client for `GET {base_url}/search?q=...`
pub struct SearchClient {
    client: Client,
    settings: EndpointSettings,
}

impl SearchClient {
    pub fn new(settings: EndpointSettings) -> Result<Self> {
        Ok(Self {
            client: endpoint_client(&settings)?,
            settings,
        })
    }
}

#[async_trait]
impl WebSearch for SearchClient {
    #[instrument(skip(self), fields(base_url = %self.settings.base_url))]
    async fn search(&self, terms: &[String]) -> SearchResult {
        let query = terms.join(" ");

        match get_json::<SearchResponse>(&self.client, &self.settings, "search", &query).await {
            Ok(response) => {
                let result = response.into_result();
                info!(hits = result.len(), "Search completed");
                result
            }
            Err(message) => {
                warn!(error = %message, "Search failed");
                SearchResult::failed(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{refused_base_url, serve_canned};

    fn terms(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[tokio::test]
    async fn test_search_success_projects_items() {
        let body = r#"{"items": [
            {"url": "http://example.com/1", "snippet": "Snippet 1", "title": "Title 1"},
            {"url": "http://example.com/2", "title": "Title 2"},
            {"snippet": "no url, dropped"}
        ]}"#;
        let (base, server) = serve_canned("200 OK", "application/json", body, 1).await;
        let client =
            SearchClient::new(EndpointSettings::new(base).with_api_key("YOUR_API_KEY")).unwrap();

        let result = client.search(&terms(&["test", "query"])).await;

        assert!(result.error().is_none());
        assert_eq!(result.urls(), ["http://example.com/1", "http://example.com/2"]);
        assert_eq!(result.snippets(), ["Snippet 1", ""]);
        assert_eq!(result.titles(), ["Title 1", "Title 2"]);

        let heads = server.await.unwrap();
        assert!(heads[0].starts_with("GET /search?q=test+query "));
        assert!(heads[0].to_lowercase().contains("authorization: your_api_key"));
    }

    #[tokio::test]
    async fn test_missing_items_is_empty_success() {
        let (base, _server) = serve_canned("200 OK", "application/json", "{}", 1).await;
        let client = SearchClient::new(EndpointSettings::new(base)).unwrap();

        let result = client.search(&terms(&["x"])).await;

        assert!(result.error().is_none());
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_http_error_is_contained() {
        let (base, _server) =
            serve_canned("500 Internal Server Error", "text/plain", "boom", 1).await;
        let client = SearchClient::new(EndpointSettings::new(base)).unwrap();

        let result = client.search(&terms(&["x"])).await;

        let error = result.error().expect("error should be set");
        assert!(error.contains("500"));
        assert!(result.urls().is_empty());
        assert!(result.snippets().is_empty());
        assert!(result.titles().is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_is_contained() {
        let client = SearchClient::new(EndpointSettings::new(refused_base_url().await)).unwrap();

        let result = client.search(&terms(&["x"])).await;

        assert!(result.error().is_some());
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_contained() {
        let (base, _server) = serve_canned("200 OK", "application/json", "not json", 1).await;
        let client = SearchClient::new(EndpointSettings::new(base)).unwrap();

        let result = client.search(&terms(&["x"])).await;

        assert!(result.error().unwrap().contains("decode"));
        assert!(result.is_empty());
    }
}
