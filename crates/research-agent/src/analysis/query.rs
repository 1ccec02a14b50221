//! Query analysis: break a research query into topics and search terms

use super::{completion_request, json};
use crate::config::ModelSettings;
use crate::error::{ResearchError, Result};
use crate::prompts;
use crate::types::QueryAnalysis;
use research_llm::LLMProvider;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

const DEFAULT_INFO_TYPE: &str = "general";

/// Words in `info_type` that imply news is wanted when the model omits `needs_news`
const NEWS_HINTS: [&str; 3] = ["news", "recent", "latest"];

/// Sends a query to the language model and parses the structured reply
pub struct QueryAnalyzer {
    provider: Arc<dyn LLMProvider>,
    settings: ModelSettings,
}

impl QueryAnalyzer {
    pub fn new(provider: Arc<dyn LLMProvider>, settings: ModelSettings) -> Self {
        Self { provider, settings }
    }

    /// Analyze a research query
    ///
    /// Fails with [`ResearchError::ModelUnavailable`] when the model call
    /// errors or returns nothing, and with [`ResearchError::AnalysisParse`]
    /// when the reply does not match the expected JSON shape.
    #[instrument(skip(self), fields(model = %self.settings.model))]
    pub async fn analyze(&self, query: &str) -> Result<QueryAnalysis> {
        let prompt = prompts::query_analysis(query)?;
        let request = completion_request(&self.settings, prompt);

        let response = self.provider.complete(request).await?;
        let reply = response.text().ok_or_else(|| {
            ResearchError::ModelUnavailable("model returned an empty reply".to_string())
        })?;
        debug!(reply_len = reply.len(), "Received query analysis reply");

        let analysis = parse_analysis(reply)?;
        info!(
            topics = analysis.main_topics.len(),
            terms = analysis.search_terms.len(),
            needs_news = analysis.needs_news,
            "Query analyzed"
        );
        Ok(analysis)
    }
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    main_topics: Vec<String>,
    #[serde(default)]
    info_type: Option<String>,
    #[serde(default)]
    search_terms: Vec<String>,
    #[serde(default)]
    needs_news: Option<bool>,
}

/// Parse a model reply into a [`QueryAnalysis`]
///
/// The reply must contain one JSON object with `main_topics` and
/// `search_terms` string arrays. `info_type` defaults to `"general"`.
/// A missing `needs_news` is inferred from `info_type`. When
/// `search_terms` is empty the topics are searched instead; when both are
/// empty the reply is rejected.
pub fn parse_analysis(reply: &str) -> Result<QueryAnalysis> {
    let object = json::extract_object(reply).ok_or_else(|| {
        ResearchError::AnalysisParse("reply does not contain a JSON object".to_string())
    })?;

    let raw: RawAnalysis = serde_json::from_str(object)
        .map_err(|e| ResearchError::AnalysisParse(format!("invalid analysis JSON: {e}")))?;

    let main_topics = json::clean_list(raw.main_topics);
    let mut search_terms = json::clean_list(raw.search_terms);
    if search_terms.is_empty() {
        search_terms.clone_from(&main_topics);
    }
    if search_terms.is_empty() {
        return Err(ResearchError::AnalysisParse(
            "reply has neither search terms nor topics".to_string(),
        ));
    }

    let info_type = raw
        .info_type
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_INFO_TYPE.to_string());

    let needs_news = raw.needs_news.unwrap_or_else(|| {
        let lowered = info_type.to_lowercase();
        NEWS_HINTS.iter().any(|hint| lowered.contains(hint))
    });

    Ok(QueryAnalysis {
        main_topics,
        info_type,
        search_terms,
        needs_news,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedProvider;

    fn analyzer(provider: Arc<ScriptedProvider>) -> QueryAnalyzer {
        QueryAnalyzer::new(provider, ModelSettings::default())
    }

    #[tokio::test]
    async fn test_analyze_query() {
        let provider = Arc::new(ScriptedProvider::replying(
            r#"{
                "main_topics": ["quantum computing", "recent developments"],
                "info_type": "recent news and facts",
                "search_terms": ["quantum computing breakthroughs", "recent quantum developments"]
            }"#,
        ));

        let result = analyzer(provider.clone())
            .analyze("What are the latest developments in quantum computing?")
            .await
            .unwrap();

        assert_eq!(result.main_topics.len(), 2);
        assert_eq!(result.info_type, "recent news and facts");
        assert_eq!(result.search_terms[0], "quantum computing breakthroughs");
        assert!(result.needs_news, "inferred from info_type");

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert!(
            requests[0].messages[0]
                .content
                .contains("latest developments in quantum computing")
        );
        assert!(requests[0].system.is_some());
    }

    #[tokio::test]
    async fn test_model_failure_is_model_unavailable() {
        let provider = Arc::new(ScriptedProvider::failing());
        let result = analyzer(provider).analyze("anything").await;
        assert!(matches!(result, Err(ResearchError::ModelUnavailable(_))));
    }

    #[tokio::test]
    async fn test_empty_reply_is_model_unavailable() {
        let provider = Arc::new(ScriptedProvider::replying("   "));
        let result = analyzer(provider).analyze("anything").await;
        assert!(matches!(result, Err(ResearchError::ModelUnavailable(_))));
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_parse_error() {
        let provider = Arc::new(ScriptedProvider::replying("I think you should search the web."));
        let result = analyzer(provider).analyze("anything").await;
        assert!(matches!(result, Err(ResearchError::AnalysisParse(_))));
    }

    #[test]
    fn test_fenced_reply_with_explicit_news_flag() {
        let reply = "Here you go:\n```json\n{\"main_topics\": [\"rust\"], \"info_type\": \"facts\", \
                     \"search_terms\": [\"rust async\"], \"needs_news\": true}\n```";
        let analysis = parse_analysis(reply).unwrap();

        assert_eq!(analysis.search_terms, vec!["rust async"]);
        assert!(analysis.needs_news);
    }

    #[test]
    fn test_explicit_false_overrides_news_hint() {
        let reply = r#"{"main_topics": ["a"], "info_type": "latest news", "search_terms": ["a"], "needs_news": false}"#;
        assert!(!parse_analysis(reply).unwrap().needs_news);
    }

    #[test]
    fn test_topics_used_when_terms_missing() {
        let analysis = parse_analysis(r#"{"main_topics": [" solar panels ", ""]}"#).unwrap();

        assert_eq!(analysis.search_terms, vec!["solar panels"]);
        assert_eq!(analysis.info_type, "general");
        assert!(!analysis.needs_news);
    }

    #[test]
    fn test_no_terms_no_topics_is_error() {
        let result = parse_analysis(r#"{"main_topics": [], "search_terms": ["  "]}"#);
        assert!(matches!(result, Err(ResearchError::AnalysisParse(_))));
    }

    #[test]
    fn test_wrong_field_type_is_error() {
        let result = parse_analysis(r#"{"search_terms": "not a list"}"#);
        assert!(matches!(result, Err(ResearchError::AnalysisParse(_))));
    }
}
