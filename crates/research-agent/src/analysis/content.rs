//! Content analysis: key points and sentiment from scraped pages

use super::{completion_request, json};
use crate::config::ModelSettings;
use crate::error::{ResearchError, Result};
use crate::prompts;
use crate::types::{AnalyzedContent, ScrapedPage};
use async_trait::async_trait;
use research_llm::LLMProvider;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Longest key point kept by the heuristic analyzer, in characters
const MAX_KEY_POINT_CHARS: usize = 280;

/// Characters of each page sent to the model
const MAX_DOCUMENT_CHARS: usize = 4_000;

const POSITIVE_WORDS: &[&str] = &[
    "advance", "benefit", "breakthrough", "gain", "good", "great", "growth", "improve",
    "improved", "innovative", "positive", "progress", "promising", "record", "strong",
    "success", "successful", "win",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "concern", "crisis", "decline", "fail", "failure", "fall", "fear", "loss",
    "negative", "poor", "problem", "risk", "setback", "threat", "weak", "worse", "worst",
];

/// Turns a set of page texts into key points and a sentiment label
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentAnalyzer: Send + Sync {
    /// Analyze the texts; fails with [`ResearchError::EmptyInput`] when there are none
    async fn analyze(&self, texts: &[ScrapedPage]) -> Result<AnalyzedContent>;
}

/// Local analyzer: extractive key points and lexicon sentiment
#[derive(Debug, Clone)]
pub struct HeuristicContentAnalyzer {
    max_key_points: usize,
}

impl HeuristicContentAnalyzer {
    pub fn new(max_key_points: usize) -> Self {
        Self {
            max_key_points: max_key_points.max(1),
        }
    }

    fn key_points(&self, texts: &[ScrapedPage]) -> Vec<String> {
        let mut seen = HashSet::new();
        texts
            .iter()
            .filter_map(|text| first_sentence(text))
            .filter(|point| seen.insert(point.clone()))
            .take(self.max_key_points)
            .collect()
    }
}

impl Default for HeuristicContentAnalyzer {
    fn default() -> Self {
        Self::new(8)
    }
}

#[async_trait]
impl ContentAnalyzer for HeuristicContentAnalyzer {
    #[instrument(skip_all, fields(texts = texts.len()))]
    async fn analyze(&self, texts: &[ScrapedPage]) -> Result<AnalyzedContent> {
        if texts.is_empty() {
            return Err(ResearchError::EmptyInput);
        }

        let key_points = self.key_points(texts);
        let sentiment = sentiment_label(lexicon_score(texts));
        debug!(key_points = key_points.len(), sentiment, "Heuristic analysis done");

        Ok(AnalyzedContent::new(key_points, sentiment))
    }
}

/// First sentence of a text, trimmed and capped in length
fn first_sentence(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let line = text.lines().map(str::trim).find(|l| !l.is_empty())?;
    let end = line
        .char_indices()
        .find(|&(i, c)| {
            matches!(c, '.' | '!' | '?')
                && line[i + c.len_utf8()..]
                    .chars()
                    .next()
                    .is_none_or(char::is_whitespace)
        })
        .map_or(line.len(), |(i, c)| i + c.len_utf8());

    let sentence: String = line[..end].chars().take(MAX_KEY_POINT_CHARS).collect();
    Some(sentence)
}

/// Net count of positive minus negative lexicon words
fn lexicon_score(texts: &[ScrapedPage]) -> i64 {
    texts
        .iter()
        .flat_map(|text| text.split(|c: char| !c.is_alphanumeric()))
        .filter(|word| !word.is_empty())
        .map(|word| {
            let word = word.to_lowercase();
            if POSITIVE_WORDS.contains(&word.as_str()) {
                1
            } else if NEGATIVE_WORDS.contains(&word.as_str()) {
                -1
            } else {
                0
            }
        })
        .sum()
}

fn sentiment_label(score: i64) -> &'static str {
    match score {
        s if s > 0 => "positive",
        s if s < 0 => "negative",
        _ => "neutral",
    }
}

/// Analyzer that asks the language model for key points and sentiment
pub struct LlmContentAnalyzer {
    provider: Arc<dyn LLMProvider>,
    settings: ModelSettings,
    max_key_points: usize,
}

impl LlmContentAnalyzer {
    pub fn new(provider: Arc<dyn LLMProvider>, settings: ModelSettings, max_key_points: usize) -> Self {
        Self {
            provider,
            settings,
            max_key_points: max_key_points.max(1),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawContentAnalysis {
    #[serde(default)]
    key_points: Vec<String>,
    #[serde(default)]
    sentiment: Option<String>,
}

#[async_trait]
impl ContentAnalyzer for LlmContentAnalyzer {
    #[instrument(skip_all, fields(texts = texts.len(), model = %self.settings.model))]
    async fn analyze(&self, texts: &[ScrapedPage]) -> Result<AnalyzedContent> {
        if texts.is_empty() {
            return Err(ResearchError::EmptyInput);
        }

        let documents: Vec<String> = texts
            .iter()
            .map(|t| t.chars().take(MAX_DOCUMENT_CHARS).collect())
            .collect();
        let prompt = prompts::content_analysis(&documents, self.max_key_points)?;

        let response = self
            .provider
            .complete(completion_request(&self.settings, prompt))
            .await?;
        let reply = response.text().ok_or_else(|| {
            ResearchError::ModelUnavailable("model returned an empty reply".to_string())
        })?;

        let object = json::extract_object(reply).ok_or_else(|| {
            ResearchError::AnalysisParse("reply does not contain a JSON object".to_string())
        })?;
        let raw: RawContentAnalysis = serde_json::from_str(object)
            .map_err(|e| ResearchError::AnalysisParse(format!("invalid content JSON: {e}")))?;

        let mut key_points = json::clean_list(raw.key_points);
        key_points.truncate(self.max_key_points);
        let sentiment = raw
            .sentiment
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "neutral".to_string());

        Ok(AnalyzedContent::new(key_points, sentiment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedProvider;

    fn pages(texts: &[&str]) -> Vec<ScrapedPage> {
        texts.iter().map(|t| (*t).to_string()).collect()
    }

    #[tokio::test]
    async fn test_analyze_content() {
        let analyzer = HeuristicContentAnalyzer::default();
        let result = analyzer
            .analyze(&pages(&["Sample content 1", "Sample content 2"]))
            .await
            .unwrap();

        assert_eq!(result.key_points, vec!["Sample content 1", "Sample content 2"]);
        assert_eq!(result.sentiment, "neutral");
        assert!(result.news.is_none());
    }

    #[test]
    fn test_empty_input_is_error() {
        let analyzer = HeuristicContentAnalyzer::default();
        let result = tokio_test::block_on(analyzer.analyze(&[]));
        assert!(matches!(result, Err(ResearchError::EmptyInput)));
    }

    #[tokio::test]
    async fn test_key_points_deduplicated_and_capped() {
        let analyzer = HeuristicContentAnalyzer::new(2);
        let result = analyzer
            .analyze(&pages(&[
                "Same start. More text.",
                "Same start. Different text.",
                "   ",
                "Another page! With more.",
                "Third distinct page.",
            ]))
            .await
            .unwrap();

        assert_eq!(result.key_points, vec!["Same start.", "Another page!"]);
    }

    #[tokio::test]
    async fn test_sentiment_labels() {
        let analyzer = HeuristicContentAnalyzer::default();

        let positive = analyzer
            .analyze(&pages(&["A major breakthrough shows strong progress."]))
            .await
            .unwrap();
        assert_eq!(positive.sentiment, "positive");

        let negative = analyzer
            .analyze(&pages(&["Analysts fear a decline and growing risk."]))
            .await
            .unwrap();
        assert_eq!(negative.sentiment, "negative");
    }

    #[test]
    fn test_first_sentence_keeps_decimals() {
        assert_eq!(
            first_sentence("Version 2.5 ships today. Details follow.").as_deref(),
            Some("Version 2.5 ships today.")
        );
        assert_eq!(first_sentence("\n\n  Heading\nBody.").as_deref(), Some("Heading"));
        assert_eq!(first_sentence("  "), None);
    }

    #[tokio::test]
    async fn test_llm_analyzer_parses_reply() {
        let provider = Arc::new(ScriptedProvider::replying(
            r#"{"key_points": ["a", " b ", "c"], "sentiment": " Positive "}"#,
        ));
        let analyzer = LlmContentAnalyzer::new(provider.clone(), ModelSettings::default(), 2);

        let result = analyzer.analyze(&pages(&["Doc one", "Doc two"])).await.unwrap();

        assert_eq!(result.key_points, vec!["a", "b"]);
        assert_eq!(result.sentiment, "positive");
        let requests = provider.requests();
        assert!(requests[0].messages[0].content.contains("Doc two"));
    }

    #[tokio::test]
    async fn test_llm_analyzer_empty_input_skips_model() {
        let provider = Arc::new(ScriptedProvider::replying("{}"));
        let analyzer = LlmContentAnalyzer::new(provider.clone(), ModelSettings::default(), 5);

        let result = analyzer.analyze(&[]).await;

        assert!(matches!(result, Err(ResearchError::EmptyInput)));
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_llm_analyzer_bad_reply() {
        let provider = Arc::new(ScriptedProvider::replying("no structure"));
        let analyzer = LlmContentAnalyzer::new(provider, ModelSettings::default(), 5);

        let result = analyzer.analyze(&pages(&["Doc"])).await;
        assert!(matches!(result, Err(ResearchError::AnalysisParse(_))));
    }
}
