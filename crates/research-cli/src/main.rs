//! Command-line interface for the research pipeline
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! export SEARCH_API_BASE=https://search.internal/v1 SEARCH_API_KEY=...
//! export NEWS_API_BASE=https://news.internal/v1 NEWS_API_KEY=...
//!
//! research "What are the latest developments in quantum computing?"
//! research --json --llm-analyzer "rust async runtimes"
//! ```

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use research_agent::{
    AnalyzerKind, ResearchConfig, ResearchOrchestrator, ResearchReport, ScrapeFailurePolicy,
    ScraperSettings,
};
use research_llm::LLMProvider;
use research_llm::providers::{AnthropicProvider, OpenAIConfig, OpenAIProvider};
use research_utils::{AppInfo, LogFormat};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProviderKind {
    /// OpenAI or any OpenAI-compatible server (OPENAI_API_KEY, OPENAI_API_BASE)
    Openai,
    /// Anthropic messages API (ANTHROPIC_API_KEY)
    Anthropic,
}

#[derive(Parser, Debug)]
#[command(name = "research")]
#[command(about = "Research a question on the web and summarize the findings", long_about = None)]
#[command(version)]
struct Args {
    /// The research query
    #[arg(required = true)]
    query: Vec<String>,

    /// Language model provider
    #[arg(long, value_enum, default_value_t = ProviderKind::Openai)]
    provider: ProviderKind,

    /// Model name (overrides RESEARCH_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Fail on the first page that cannot be scraped instead of skipping it
    #[arg(long)]
    abort_on_scrape_error: bool,

    /// Number of pages fetched at once
    #[arg(long, default_value_t = 4)]
    max_concurrent_scrapes: usize,

    /// Ask the language model for key points and sentiment
    #[arg(long)]
    llm_analyzer: bool,

    /// Log output format (pretty or json)
    #[arg(long, default_value = "pretty")]
    log_format: LogFormat,
}

impl Args {
    fn query(&self) -> String {
        self.query.join(" ")
    }

    fn config(&self, app: &AppInfo) -> anyhow::Result<ResearchConfig> {
        let mut builder = ResearchConfig::builder()
            .scraper(ScraperSettings {
                user_agent: app.user_agent(),
                ..ScraperSettings::default()
            })
            .max_concurrent_scrapes(self.max_concurrent_scrapes);

        if let Some(model) = &self.model {
            builder = builder.model(model);
        }
        if self.abort_on_scrape_error {
            builder = builder.scrape_failure_policy(ScrapeFailurePolicy::Abort);
        }
        if self.llm_analyzer {
            builder = builder.analyzer(AnalyzerKind::Model);
        }

        builder.with_env().build().context("invalid research configuration")
    }
}

fn build_provider(kind: ProviderKind) -> anyhow::Result<Arc<dyn LLMProvider>> {
    let provider: Arc<dyn LLMProvider> = match kind {
        ProviderKind::Openai => {
            let config = OpenAIConfig::from_env().context("OpenAI provider is not configured")?;
            Arc::new(OpenAIProvider::with_config(config)?)
        }
        ProviderKind::Anthropic => {
            Arc::new(AnthropicProvider::from_env().context("Anthropic provider is not configured")?)
        }
    };
    Ok(provider)
}

fn print_report(report: &ResearchReport) {
    println!("{}", report.summary);

    if !report.sources.is_empty() {
        println!();
        println!("Sources:");
        for (i, source) in report.sources.iter().enumerate() {
            println!("  {}. {source}", i + 1);
        }
    }

    if !report.scrape_failures.is_empty() {
        println!();
        println!("Skipped:");
        for failure in &report.scrape_failures {
            println!("  {} ({})", failure.url, failure.reason);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    research_utils::init_tracing_with(args.log_format);

    let app = AppInfo::new("research", env!("CARGO_PKG_VERSION"));
    info!(version = %app.version, environment = %app.environment, "Starting research CLI");

    let config = args.config(&app)?;
    let provider = build_provider(args.provider)?;
    let orchestrator = ResearchOrchestrator::from_config(provider, &config)?;

    let report = orchestrator.conduct_research(&args.query()).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_words_joined() {
        let args = Args::try_parse_from(["research", "quantum", "computing", "news"]).unwrap();
        assert_eq!(args.query(), "quantum computing news");
        assert_eq!(args.provider, ProviderKind::Openai);
        assert_eq!(args.log_format, LogFormat::Pretty);
        assert!(!args.json);
    }

    #[test]
    fn test_query_required() {
        assert!(Args::try_parse_from(["research"]).is_err());
    }

    #[test]
    fn test_flags_map_onto_config() {
        let args = Args::try_parse_from([
            "research",
            "--model",
            "local-model",
            "--abort-on-scrape-error",
            "--llm-analyzer",
            "--max-concurrent-scrapes",
            "2",
            "--log-format",
            "json",
            "rust",
        ])
        .unwrap();

        let config = args.config(&AppInfo::new("research", "1.2.3")).unwrap();

        assert_eq!(args.log_format, LogFormat::Json);
        assert_eq!(config.model.model, "local-model");
        assert_eq!(config.scraper.user_agent, "research/1.2.3");
        assert_eq!(config.pipeline.scrape_failure_policy, ScrapeFailurePolicy::Abort);
        assert_eq!(config.pipeline.analyzer, AnalyzerKind::Model);
        assert_eq!(config.pipeline.max_concurrent_scrapes, 2);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let args =
            Args::try_parse_from(["research", "--max-concurrent-scrapes", "0", "rust"]).unwrap();
        assert!(args.config(&AppInfo::default()).is_err());
    }
}
