//! Configuration for research operations
//!
//! Each client gets its own settings struct at construction time; there is
//! no process-wide state.

use crate::error::{ResearchError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_SEARCH_BASE: &str = "https://api.search.example.com";
const DEFAULT_NEWS_BASE: &str = "https://api.news.example.com";

/// What to do when one URL cannot be scraped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeFailurePolicy {
    /// Record the failure in the report and keep going
    #[default]
    Skip,
    /// Fail the whole research call
    Abort,
}

/// Which content analyzer the pipeline uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzerKind {
    /// Local extractive key points and lexicon sentiment
    #[default]
    Heuristic,
    /// Delegate to the language model
    Model,
}

/// Settings for calls to the language model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Model identifier passed to the provider
    pub model: String,
    /// Maximum tokens per completion
    pub max_tokens: usize,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Optional system prompt override
    pub system_prompt: Option<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1024,
            temperature: Some(0.2),
            system_prompt: None,
        }
    }
}

/// Settings for a JSON HTTP endpoint (search or news)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointSettings {
    /// Base URL, without trailing slash
    pub base_url: String,
    /// Value of the `Authorization` header
    pub api_key: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl EndpointSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL for a path under the base
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn validate(&self, name: &str) -> Result<()> {
        url::Url::parse(&self.base_url).map_err(|e| {
            ResearchError::Config(format!("{name} base URL '{}' is invalid: {e}", self.base_url))
        })?;
        Ok(())
    }
}

/// Settings for the page scraper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperSettings {
    /// Per-page request timeout
    pub timeout: Duration,
    /// User agent sent with every fetch
    pub user_agent: String,
    /// Maximum characters of text kept per page
    pub max_chars: usize,
    /// Maximum redirects followed per page
    pub max_redirects: usize,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            user_agent: concat!("research-agent/", env!("CARGO_PKG_VERSION")).to_string(),
            max_chars: 20_000,
            max_redirects: 5,
        }
    }
}

/// Settings for the orchestrator itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    pub scrape_failure_policy: ScrapeFailurePolicy,
    /// Upper bound on scrapes in flight at once
    pub max_concurrent_scrapes: usize,
    /// Upper bound on key points in a report
    pub max_key_points: usize,
    pub analyzer: AnalyzerKind,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            scrape_failure_policy: ScrapeFailurePolicy::Skip,
            max_concurrent_scrapes: 4,
            max_key_points: 8,
            analyzer: AnalyzerKind::Heuristic,
        }
    }
}

/// Complete configuration for one research pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    pub model: ModelSettings,
    pub search: EndpointSettings,
    pub news: EndpointSettings,
    pub scraper: ScraperSettings,
    pub pipeline: PipelineSettings,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            model: ModelSettings::default(),
            search: EndpointSettings::new(DEFAULT_SEARCH_BASE),
            news: EndpointSettings::new(DEFAULT_NEWS_BASE),
            scraper: ScraperSettings::default(),
            pipeline: PipelineSettings::default(),
        }
    }
}

impl ResearchConfig {
    /// Create a new configuration builder
    pub fn builder() -> ResearchConfigBuilder {
        ResearchConfigBuilder::default()
    }

    /// Defaults overlaid with environment variables
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env().build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.model.trim().is_empty() {
            return Err(ResearchError::Config("model name must not be empty".to_string()));
        }

        if self.pipeline.max_concurrent_scrapes == 0 {
            return Err(ResearchError::Config(
                "max_concurrent_scrapes must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.max_key_points == 0 {
            return Err(ResearchError::Config(
                "max_key_points must be greater than 0".to_string(),
            ));
        }

        self.search.validate("search")?;
        self.news.validate("news")?;
        Ok(())
    }
}

/// Builder for ResearchConfig
#[derive(Debug, Default)]
pub struct ResearchConfigBuilder {
    model: Option<String>,
    max_tokens: Option<usize>,
    temperature: Option<f32>,
    system_prompt: Option<String>,
    search_base_url: Option<String>,
    search_api_key: Option<String>,
    news_base_url: Option<String>,
    news_api_key: Option<String>,
    request_timeout: Option<Duration>,
    scraper: Option<ScraperSettings>,
    scrape_failure_policy: Option<ScrapeFailurePolicy>,
    max_concurrent_scrapes: Option<usize>,
    max_key_points: Option<usize>,
    analyzer: Option<AnalyzerKind>,
}

impl ResearchConfigBuilder {
    /// Set the model name
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set max tokens per completion
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Override the system prompt sent with every model call
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Set the search API base URL
    pub fn search_base_url(mut self, url: impl Into<String>) -> Self {
        self.search_base_url = Some(url.into());
        self
    }

    /// Set the search API key
    pub fn search_api_key(mut self, key: impl Into<String>) -> Self {
        self.search_api_key = Some(key.into());
        self
    }

    /// Set the news API base URL
    pub fn news_base_url(mut self, url: impl Into<String>) -> Self {
        self.news_base_url = Some(url.into());
        self
    }

    /// Set the news API key
    pub fn news_api_key(mut self, key: impl Into<String>) -> Self {
        self.news_api_key = Some(key.into());
        self
    }

    /// Set the timeout for search and news requests
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Replace the scraper settings
    pub fn scraper(mut self, scraper: ScraperSettings) -> Self {
        self.scraper = Some(scraper);
        self
    }

    /// Set the scrape failure policy
    pub fn scrape_failure_policy(mut self, policy: ScrapeFailurePolicy) -> Self {
        self.scrape_failure_policy = Some(policy);
        self
    }

    /// Set the scrape concurrency limit
    pub fn max_concurrent_scrapes(mut self, limit: usize) -> Self {
        self.max_concurrent_scrapes = Some(limit);
        self
    }

    /// Set the key point limit
    pub fn max_key_points(mut self, limit: usize) -> Self {
        self.max_key_points = Some(limit);
        self
    }

    /// Choose the content analyzer
    pub fn analyzer(mut self, analyzer: AnalyzerKind) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Fill unset fields from environment variables
    ///
    /// Reads `RESEARCH_MODEL`, `SEARCH_API_BASE`, `SEARCH_API_KEY`,
    /// `NEWS_API_BASE` and `NEWS_API_KEY`. Values set explicitly on the
    /// builder win.
    pub fn with_env(mut self) -> Self {
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        self.model = self.model.or_else(|| env("RESEARCH_MODEL"));
        self.search_base_url = self.search_base_url.or_else(|| env("SEARCH_API_BASE"));
        self.search_api_key = self.search_api_key.or_else(|| env("SEARCH_API_KEY"));
        self.news_base_url = self.news_base_url.or_else(|| env("NEWS_API_BASE"));
        self.news_api_key = self.news_api_key.or_else(|| env("NEWS_API_KEY"));
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ResearchConfig> {
        let defaults = ResearchConfig::default();

        let endpoint = |base: Option<String>, key: Option<String>, fallback: EndpointSettings| {
            let mut settings = base.map_or(fallback, EndpointSettings::new);
            settings.api_key = key;
            if let Some(timeout) = self.request_timeout {
                settings.timeout = timeout;
            }
            settings
        };

        let config = ResearchConfig {
            model: ModelSettings {
                model: self.model.unwrap_or(defaults.model.model),
                max_tokens: self.max_tokens.unwrap_or(defaults.model.max_tokens),
                temperature: self.temperature.or(defaults.model.temperature),
                system_prompt: self.system_prompt,
            },
            search: endpoint(self.search_base_url, self.search_api_key, defaults.search),
            news: endpoint(self.news_base_url, self.news_api_key, defaults.news),
            scraper: self.scraper.unwrap_or(defaults.scraper),
            pipeline: PipelineSettings {
                scrape_failure_policy: self
                    .scrape_failure_policy
                    .unwrap_or(defaults.pipeline.scrape_failure_policy),
                max_concurrent_scrapes: self
                    .max_concurrent_scrapes
                    .unwrap_or(defaults.pipeline.max_concurrent_scrapes),
                max_key_points: self
                    .max_key_points
                    .unwrap_or(defaults.pipeline.max_key_points),
                analyzer: self.analyzer.unwrap_or(defaults.pipeline.analyzer),
            },
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ResearchConfig::default();
        assert_eq!(config.pipeline.scrape_failure_policy, ScrapeFailurePolicy::Skip);
        assert_eq!(config.pipeline.analyzer, AnalyzerKind::Heuristic);
        assert_eq!(config.search.endpoint("search"), "https://api.search.example.com/search");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ResearchConfig::builder()
            .model("local-model")
            .search_base_url("http://localhost:8080/")
            .search_api_key("secret")
            .request_timeout(Duration::from_secs(5))
            .scrape_failure_policy(ScrapeFailurePolicy::Abort)
            .max_concurrent_scrapes(2)
            .build()
            .unwrap();

        assert_eq!(config.model.model, "local-model");
        assert_eq!(config.search.base_url, "http://localhost:8080");
        assert_eq!(config.search.api_key.as_deref(), Some("secret"));
        assert_eq!(config.search.timeout, Duration::from_secs(5));
        assert_eq!(config.news.timeout, Duration::from_secs(5));
        assert!(config.news.api_key.is_none());
        assert_eq!(config.pipeline.scrape_failure_policy, ScrapeFailurePolicy::Abort);
        assert_eq!(config.pipeline.max_concurrent_scrapes, 2);
    }

    #[test]
    fn test_validation_rejects_zero_concurrency() {
        let result = ResearchConfig::builder().max_concurrent_scrapes(0).build();
        assert!(matches!(result, Err(ResearchError::Config(_))));
    }

    #[test]
    fn test_validation_rejects_bad_base_url() {
        let result = ResearchConfig::builder().news_base_url("not a url").build();
        assert!(matches!(result, Err(ResearchError::Config(msg)) if msg.contains("news")));
    }

    #[test]
    fn test_validation_rejects_empty_model() {
        let result = ResearchConfig::builder().model("  ").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_config_from_env() {
        unsafe {
            std::env::set_var("RESEARCH_MODEL", "env-model");
            std::env::set_var("SEARCH_API_BASE", "https://search.internal/v1/");
            std::env::set_var("SEARCH_API_KEY", "search-key");
            std::env::set_var("NEWS_API_BASE", "https://news.internal/v1");
            std::env::set_var("NEWS_API_KEY", "   ");
        }

        let config = ResearchConfig::from_env().unwrap();
        assert_eq!(config.model.model, "env-model");
        assert_eq!(config.search.base_url, "https://search.internal/v1");
        assert_eq!(config.search.api_key.as_deref(), Some("search-key"));
        assert_eq!(config.news.base_url, "https://news.internal/v1");
        assert!(config.news.api_key.is_none(), "blank values are ignored");

        // Values set on the builder win over the environment
        let config = ResearchConfig::builder()
            .model("explicit-model")
            .search_api_key("explicit-key")
            .with_env()
            .build()
            .unwrap();
        assert_eq!(config.model.model, "explicit-model");
        assert_eq!(config.search.api_key.as_deref(), Some("explicit-key"));
        assert_eq!(config.search.base_url, "https://search.internal/v1");

        unsafe {
            std::env::remove_var("RESEARCH_MODEL");
            std::env::remove_var("SEARCH_API_BASE");
            std::env::remove_var("SEARCH_API_KEY");
            std::env::remove_var("NEWS_API_BASE");
            std::env::remove_var("NEWS_API_KEY");
        }
    }

    #[test]
    fn test_policy_serialization() {
        let json = serde_json::to_string(&ScrapeFailurePolicy::Abort).unwrap();
        assert_eq!(json, "\"abort\"");
    }
}
