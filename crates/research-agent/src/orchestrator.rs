//! Research orchestrator: runs the pipeline stages in order and builds the report

use crate::analysis::{ContentAnalyzer, HeuristicContentAnalyzer, LlmContentAnalyzer, QueryAnalyzer};
use crate::api::{NewsClient, NewsFeed, PageScraper, ScraperClient, SearchClient, WebSearch};
use crate::config::{AnalyzerKind, ModelSettings, PipelineSettings, ResearchConfig, ScrapeFailurePolicy};
use crate::error::{ResearchError, Result};
use crate::types::{AnalyzedContent, QueryAnalysis, ResearchReport, ScrapeFailure, ScrapedPage, SearchResult};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use research_llm::LLMProvider;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Coordinates one research call from query to report
///
/// Stages run in a fixed order:
///
/// 1. analyze the query
/// 2. search with the analysis' search terms
/// 3. scrape every result URL, a bounded number at a time
/// 4. analyze the scraped texts
/// 5. fetch news, only when the analysis asks for it
/// 6. synthesize the report
///
/// A failed search aborts the call with [`ResearchError::Search`]. Scrape
/// failures are recorded and skipped, or abort the call, depending on
/// [`ScrapeFailurePolicy`]. A failed news lookup is attached to the
/// analysis as-is and never aborts the call.
pub struct ResearchOrchestrator {
    query_analyzer: QueryAnalyzer,
    search: Arc<dyn WebSearch>,
    scraper: Arc<dyn PageScraper>,
    content_analyzer: Arc<dyn ContentAnalyzer>,
    news: Arc<dyn NewsFeed>,
    settings: PipelineSettings,
}

impl ResearchOrchestrator {
    /// Create a new orchestrator builder
    pub fn builder() -> ResearchOrchestratorBuilder {
        ResearchOrchestratorBuilder::default()
    }

    /// Wire the HTTP-backed clients from a configuration
    pub fn from_config(provider: Arc<dyn LLMProvider>, config: &ResearchConfig) -> Result<Self> {
        config.validate()?;

        let content_analyzer: Arc<dyn ContentAnalyzer> = match config.pipeline.analyzer {
            AnalyzerKind::Heuristic => {
                Arc::new(HeuristicContentAnalyzer::new(config.pipeline.max_key_points))
            }
            AnalyzerKind::Model => Arc::new(LlmContentAnalyzer::new(
                provider.clone(),
                config.model.clone(),
                config.pipeline.max_key_points,
            )),
        };

        Self::builder()
            .provider(provider)
            .model_settings(config.model.clone())
            .search(Arc::new(SearchClient::new(config.search.clone())?))
            .scraper(Arc::new(ScraperClient::new(&config.scraper)?))
            .content_analyzer(content_analyzer)
            .news(Arc::new(NewsClient::new(config.news.clone())?))
            .settings(config.pipeline.clone())
            .build()
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run the full pipeline for one query
    ///
    /// Errors from query analysis, scraping (under
    /// [`ScrapeFailurePolicy::Abort`]) and content analysis propagate
    /// unchanged. No partial report is produced on failure.
    #[instrument(skip(self), fields(run_id = tracing::field::Empty))]
    pub async fn conduct_research(&self, query: &str) -> Result<ResearchReport> {
        let run_id = Uuid::new_v4();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));
        info!("Starting research");

        let analysis = self.query_analyzer.analyze(query).await?;

        let search_result = self.search.search(&analysis.search_terms).await;
        if let Some(error) = search_result.error() {
            warn!(error, "Search returned an error, aborting research");
            return Err(ResearchError::Search(error.to_string()));
        }
        info!(urls = search_result.len(), "Search stage done");

        let (pages, scrape_failures) = self.scrape_all(search_result.urls()).await?;
        if pages.is_empty() {
            warn!(
                urls = search_result.len(),
                skipped = scrape_failures.len(),
                "Nothing was scraped, no content to analyze"
            );
            return Err(ResearchError::EmptyInput);
        }

        let mut content = self.content_analyzer.analyze(&pages).await?;
        content.key_points.truncate(self.settings.max_key_points);
        info!(
            key_points = content.key_points.len(),
            sentiment = %content.sentiment,
            "Content analyzed"
        );

        if analysis.needs_news {
            let news = self.news.get_news(&analysis.search_terms).await;
            match news.error() {
                Some(error) => warn!(error, "News lookup failed, continuing without articles"),
                None => info!(articles = news.articles().len(), "News attached"),
            }
            content.news = Some(news);
        }

        let report = synthesize(run_id, query, analysis, &search_result, content, scrape_failures);
        info!(sources = report.sources.len(), "Research complete");
        Ok(report)
    }

    /// Scrape `urls` with bounded concurrency, keeping search order
    async fn scrape_all(&self, urls: &[String]) -> Result<(Vec<ScrapedPage>, Vec<ScrapeFailure>)> {
        let mut pages = Vec::with_capacity(urls.len());
        let mut failures = Vec::new();

        let mut outcomes = stream::iter(urls)
            .map(move |url| async move { (url, self.scraper.scrape(url).await) })
            .buffered(self.settings.max_concurrent_scrapes.max(1));

        while let Some((url, outcome)) = outcomes.next().await {
            match outcome {
                Ok(page) => pages.push(page),
                Err(err) => match self.settings.scrape_failure_policy {
                    ScrapeFailurePolicy::Abort => {
                        warn!(%url, error = %err, "Scrape failed, aborting research");
                        return Err(err);
                    }
                    ScrapeFailurePolicy::Skip => {
                        warn!(%url, error = %err, kind = err.kind(), "Scrape failed, skipping");
                        failures.push(ScrapeFailure {
                            url: url.clone(),
                            reason: err.to_string(),
                        });
                    }
                },
            }
        }

        info!(scraped = pages.len(), skipped = failures.len(), "Scrape stage done");
        Ok((pages, failures))
    }
}

/// Build the final report from the stage outputs
///
/// Sources are the search URLs in rank order followed by the news article
/// identifiers, if news was attached.
pub fn synthesize(
    run_id: Uuid,
    query: &str,
    analysis: QueryAnalysis,
    search_result: &SearchResult,
    content: AnalyzedContent,
    scrape_failures: Vec<ScrapeFailure>,
) -> ResearchReport {
    let mut sources = search_result.urls().to_vec();
    if let Some(news) = &content.news {
        sources.extend(news.articles().iter().cloned());
    }

    let summary = render_summary(query, &analysis, &content, search_result.len(), scrape_failures.len());

    ResearchReport {
        run_id,
        query: query.to_string(),
        analysis,
        summary,
        sources,
        key_points: content.key_points,
        sentiment: content.sentiment,
        scrape_failures,
        generated_at: Utc::now(),
    }
}

fn render_summary(
    query: &str,
    analysis: &QueryAnalysis,
    content: &AnalyzedContent,
    searched: usize,
    skipped: usize,
) -> String {
    let mut lines = vec![format!("Research summary: {query}"), String::new()];

    if !analysis.main_topics.is_empty() {
        lines.push(format!("Topics: {}", analysis.main_topics.join(", ")));
    }
    lines.push(format!("Information sought: {}", analysis.info_type));
    lines.push(format!(
        "Pages analyzed: {} of {searched}",
        searched.saturating_sub(skipped)
    ));
    lines.push(String::new());

    if content.key_points.is_empty() {
        lines.push("No key points could be extracted.".to_string());
    } else {
        lines.push("Key points:".to_string());
        lines.extend(content.key_points.iter().map(|point| format!("- {point}")));
    }
    lines.push(String::new());
    lines.push(format!("Overall sentiment: {}", content.sentiment));

    if let Some(news) = &content.news {
        lines.push(match news.error() {
            Some(error) => format!("Recent news: unavailable ({error})"),
            None => format!("Recent news: {} articles", news.articles().len()),
        });
    }

    if skipped > 0 {
        lines.push(format!("Skipped sources: {skipped}"));
    }

    lines.join("\n")
}

/// Builder for [`ResearchOrchestrator`]
///
/// Every collaborator is required; `build` fails with
/// [`ResearchError::Config`] naming the first one missing.
#[derive(Default)]
pub struct ResearchOrchestratorBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    model_settings: ModelSettings,
    search: Option<Arc<dyn WebSearch>>,
    scraper: Option<Arc<dyn PageScraper>>,
    content_analyzer: Option<Arc<dyn ContentAnalyzer>>,
    news: Option<Arc<dyn NewsFeed>>,
    settings: PipelineSettings,
}

impl ResearchOrchestratorBuilder {
    /// Language model used for query analysis
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn model_settings(mut self, settings: ModelSettings) -> Self {
        self.model_settings = settings;
        self
    }

    pub fn search(mut self, search: Arc<dyn WebSearch>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn scraper(mut self, scraper: Arc<dyn PageScraper>) -> Self {
        self.scraper = Some(scraper);
        self
    }

    pub fn content_analyzer(mut self, analyzer: Arc<dyn ContentAnalyzer>) -> Self {
        self.content_analyzer = Some(analyzer);
        self
    }

    pub fn news(mut self, news: Arc<dyn NewsFeed>) -> Self {
        self.news = Some(news);
        self
    }

    pub fn settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the orchestrator
    pub fn build(self) -> Result<ResearchOrchestrator> {
        let missing = |what: &str| ResearchError::Config(format!("orchestrator requires a {what}"));

        if self.settings.max_concurrent_scrapes == 0 {
            return Err(ResearchError::Config(
                "max_concurrent_scrapes must be greater than 0".to_string(),
            ));
        }
        if self.settings.max_key_points == 0 {
            return Err(ResearchError::Config(
                "max_key_points must be greater than 0".to_string(),
            ));
        }

        let provider = self.provider.ok_or_else(|| missing("language model provider"))?;

        Ok(ResearchOrchestrator {
            query_analyzer: QueryAnalyzer::new(provider, self.model_settings),
            search: self.search.ok_or_else(|| missing("search client"))?,
            scraper: self.scraper.ok_or_else(|| missing("scraper"))?,
            content_analyzer: self.content_analyzer.ok_or_else(|| missing("content analyzer"))?,
            news: self.news.ok_or_else(|| missing("news client"))?,
            settings: self.settings,
        })
    }
}
