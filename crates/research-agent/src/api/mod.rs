//! HTTP clients for the external collaborators
//!
//! Search and news clients contain their failures in the returned value.
//! The scraper surfaces failures as errors.

mod html;
pub mod news;
pub mod scraper;
pub mod search;

pub use news::{NewsClient, NewsFeed};
pub use scraper::{PageScraper, ScraperClient};
pub use search::{SearchClient, WebSearch};

use crate::config::EndpointSettings;
use crate::error::{ResearchError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Client with the endpoint's timeout applied
fn endpoint_client(settings: &EndpointSettings) -> Result<Client> {
    Client::builder()
        .timeout(settings.timeout)
        .build()
        .map_err(|e| ResearchError::Config(format!("Failed to create HTTP client: {e}")))
}

/// GET `{base}/{path}?q=<query>` and decode the JSON body
///
/// Every failure is flattened into a message; callers decide how to
/// contain it.
async fn get_json<T: DeserializeOwned>(
    client: &Client,
    settings: &EndpointSettings,
    path: &str,
    query: &str,
) -> std::result::Result<T, String> {
    let url = settings.endpoint(path);
    let mut request = client.get(&url).query(&[("q", query)]);
    if let Some(key) = &settings.api_key {
        request = request.header(reqwest::header::AUTHORIZATION, key);
    }

    let response = request
        .send()
        .await
        .map_err(|e| format!("request to {url} failed: {e}"))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(format!("{url} returned {status}: {}", body.trim()));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| format!("failed to read response from {url}: {e}"))?;
    debug!(bytes = bytes.len(), %url, "Received JSON response");

    serde_json::from_slice(&bytes).map_err(|e| format!("failed to decode response from {url}: {e}"))
}
