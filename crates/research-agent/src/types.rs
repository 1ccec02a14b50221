//! Data model shared by the pipeline stages
//!
//! Every value here lives for one `conduct_research` call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Extracted text of one scraped page
pub type ScrapedPage = String;

/// Structured breakdown of a research query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAnalysis {
    /// Main topics, most important first
    pub main_topics: Vec<String>,
    /// Kind of information wanted (facts, opinions, news, ...)
    pub info_type: String,
    /// Terms to send to the search and news APIs; never empty
    pub search_terms: Vec<String>,
    /// Whether recent news should be fetched
    pub needs_news: bool,
}

/// One item of a search response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub title: String,
}

/// Ranked search results, or the reason the search failed
///
/// `urls`, `snippets` and `titles` are index-aligned. When `error` is set
/// all three are empty. Both properties hold by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSearchResult")]
pub struct SearchResult {
    urls: Vec<String>,
    snippets: Vec<String>,
    titles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl SearchResult {
    /// Project hits into the three aligned sequences
    pub fn from_items(items: impl IntoIterator<Item = SearchHit>) -> Self {
        let mut result = Self::default();
        for hit in items {
            result.urls.push(hit.url);
            result.snippets.push(hit.snippet);
            result.titles.push(hit.title);
        }
        result
    }

    /// An error-flagged result with no hits
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn snippets(&self) -> &[String] {
        &self.snippets
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Number of hits
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Unchecked wire shape of [`SearchResult`]
#[derive(Deserialize)]
struct RawSearchResult {
    #[serde(default)]
    urls: Vec<String>,
    #[serde(default)]
    snippets: Vec<String>,
    #[serde(default)]
    titles: Vec<String>,
    #[serde(default)]
    error: Option<String>,
}

impl TryFrom<RawSearchResult> for SearchResult {
    type Error = String;

    fn try_from(raw: RawSearchResult) -> Result<Self, Self::Error> {
        if raw.urls.len() != raw.snippets.len() || raw.urls.len() != raw.titles.len() {
            return Err(format!(
                "misaligned search result: {} urls, {} snippets, {} titles",
                raw.urls.len(),
                raw.snippets.len(),
                raw.titles.len()
            ));
        }
        if raw.error.is_some() && !raw.urls.is_empty() {
            return Err("failed search result must not carry hits".to_string());
        }

        Ok(Self {
            urls: raw.urls,
            snippets: raw.snippets,
            titles: raw.titles,
            error: raw.error,
        })
    }
}

/// Articles returned by the news API, or the reason the lookup failed
///
/// Each article is identified by its URL, or its title when the API gave
/// no URL. When `error` is set, `articles` is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNewsResult")]
pub struct NewsResult {
    articles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl NewsResult {
    pub fn new(articles: Vec<String>) -> Self {
        Self {
            articles,
            error: None,
        }
    }

    /// An error-flagged result with no articles
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            articles: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn articles(&self) -> &[String] {
        &self.articles
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[derive(Deserialize)]
struct RawNewsResult {
    #[serde(default)]
    articles: Vec<String>,
    #[serde(default)]
    error: Option<String>,
}

impl TryFrom<RawNewsResult> for NewsResult {
    type Error = String;

    fn try_from(raw: RawNewsResult) -> Result<Self, Self::Error> {
        if raw.error.is_some() && !raw.articles.is_empty() {
            return Err("failed news result must not carry articles".to_string());
        }
        Ok(Self {
            articles: raw.articles,
            error: raw.error,
        })
    }
}

/// Output of content analysis, with news attached by the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedContent {
    pub key_points: Vec<String>,
    pub sentiment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news: Option<NewsResult>,
}

impl AnalyzedContent {
    pub fn new(key_points: Vec<String>, sentiment: impl Into<String>) -> Self {
        Self {
            key_points,
            sentiment: sentiment.into(),
            news: None,
        }
    }
}

/// A URL that was skipped because it could not be scraped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeFailure {
    pub url: String,
    pub reason: String,
}

/// Final artifact of one research call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchReport {
    /// Identifier of the run that produced this report
    pub run_id: Uuid,
    pub query: String,
    pub analysis: QueryAnalysis,
    /// Human-readable synthesis of the findings
    pub summary: String,
    /// Search URLs in rank order, then news article identifiers
    pub sources: Vec<String>,
    pub key_points: Vec<String>,
    pub sentiment: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scrape_failures: Vec<ScrapeFailure>,
    pub generated_at: DateTime<Utc>,
}
