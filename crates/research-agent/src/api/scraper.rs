//! Page scraper: fetch a URL and extract its visible text

use super::html;
use crate::config::ScraperSettings;
use crate::error::{ResearchError, Result};
use crate::types::ScrapedPage;
use async_trait::async_trait;
use reqwest::{Client, redirect};
use tracing::{debug, instrument};

/// Fetches one page and returns its text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageScraper: Send + Sync {
    /// Fails with [`ResearchError::Fetch`] or [`ResearchError::Parse`]
    async fn scrape(&self, url: &str) -> Result<ScrapedPage>;
}

/// reqwest-backed scraper
pub struct ScraperClient {
    client: Client,
    max_chars: usize,
}

impl ScraperClient {
    pub fn new(settings: &ScraperSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(&settings.user_agent)
            .redirect(redirect::Policy::limited(settings.max_redirects))
            .build()
            .map_err(|e| ResearchError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_chars: settings.max_chars,
        })
    }
}

#[async_trait]
impl PageScraper for ScraperClient {
    #[instrument(skip(self))]
    async fn scrape(&self, url: &str) -> Result<ScrapedPage> {
        let fetch_error = |reason: String| ResearchError::Fetch {
            url: url.to_string(),
            reason,
        };
        let parse_error = |reason: String| ResearchError::Parse {
            url: url.to_string(),
            reason,
        };

        let parsed = url::Url::parse(url).map_err(|e| fetch_error(format!("invalid URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(fetch_error(format!("unsupported scheme '{}'", parsed.scheme())));
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {status}")));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !html::is_textual(&content_type) {
            return Err(parse_error(format!("unsupported content type '{content_type}'")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_error(format!("failed to read body: {e}")))?;
        let body = std::str::from_utf8(&bytes)
            .map_err(|e| parse_error(format!("body is not valid UTF-8: {e}")))?;

        let text = if content_type.is_empty() || html::is_html(&content_type) {
            html::extract_text(body)
        } else {
            html::normalize_whitespace(body)
        };
        if text.is_empty() {
            return Err(parse_error("no visible text".to_string()));
        }

        let text = truncate_chars(text, self.max_chars);
        debug!(chars = text.chars().count(), "Page scraped");
        Ok(text)
    }
}

/// Keep at most `max_chars` characters
fn truncate_chars(mut text: String, max_chars: usize) -> String {
    if let Some((idx, _)) = text.char_indices().nth(max_chars) {
        text.truncate(idx);
    }
    text
}
