//! Web research pipeline
//!
//! This crate turns a natural-language research query into a short report.
//! The pipeline is linear:
//!
//! 1. [`QueryAnalyzer`] asks a language model to break the query into topics
//!    and search terms
//! 2. [`SearchClient`] runs the search terms against a search API
//! 3. [`ScraperClient`] fetches each result URL and extracts its text
//! 4. A [`ContentAnalyzer`] pulls key points and a sentiment label out of
//!    the scraped pages
//! 5. [`NewsClient`] adds recent articles when the query calls for news
//! 6. [`ResearchOrchestrator`] stitches everything into a [`ResearchReport`]
//!
//! Search and news failures are contained in their result values; query
//! analysis, scraping and content analysis surface typed errors.
//!
//! # Example
//!
//! ```rust,ignore
//! use research_agent::{ResearchConfig, ResearchOrchestrator};
//! use research_llm::providers::OpenAIProvider;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let provider = Arc::new(OpenAIProvider::from_env()?);
//!     let config = ResearchConfig::builder().with_env().build()?;
//!
//!     let orchestrator = ResearchOrchestrator::from_config(provider, &config)?;
//!     let report = orchestrator
//!         .conduct_research("What are the latest developments in quantum computing?")
//!         .await?;
//!
//!     println!("{}", report.summary);
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod prompts;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export main types for convenience
pub use analysis::{ContentAnalyzer, HeuristicContentAnalyzer, LlmContentAnalyzer, QueryAnalyzer};
pub use api::{NewsClient, NewsFeed, PageScraper, ScraperClient, SearchClient, WebSearch};
pub use config::{
    AnalyzerKind, EndpointSettings, ModelSettings, PipelineSettings, ResearchConfig,
    ScrapeFailurePolicy, ScraperSettings,
};
pub use error::{ResearchError, Result};
pub use orchestrator::{ResearchOrchestrator, ResearchOrchestratorBuilder};
pub use types::{
    AnalyzedContent, NewsResult, QueryAnalysis, ResearchReport, ScrapeFailure, ScrapedPage,
    SearchHit, SearchResult,
};
