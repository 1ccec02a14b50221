//! Prompt templates for the language-model stages
//!
//! Templates are rendered with minijinja. Both prompts ask the model for a
//! single JSON object so the reply can be parsed without guessing.

use crate::error::Result;
use minijinja::{Environment, context};

/// System prompt used when the configuration does not override it
pub const SYSTEM_PROMPT: &str = "You are a meticulous research planner. \
You always answer with exactly one JSON object and no other text.";

const QUERY_ANALYSIS_TEMPLATE: &str = r#"Analyze this research query and break it down.

Query: {{ query }}

Determine:
1. Main topics
2. Type of information needed (facts, opinions, news, etc.)
3. Key search terms
4. Whether recent news articles are needed

Reply with one JSON object in exactly this shape:
{"main_topics": ["..."], "info_type": "...", "search_terms": ["..."], "needs_news": true}"#;

const CONTENT_ANALYSIS_TEMPLATE: &str = r#"Read the following documents and extract the key points.

{% for doc in documents -%}
--- Document {{ loop.index }} ---
{{ doc }}

{% endfor -%}
Return at most {{ max_key_points }} key points, most important first, and the
overall sentiment of the documents as one of "positive", "negative" or "neutral".

Reply with one JSON object in exactly this shape:
{"key_points": ["..."], "sentiment": "neutral"}"#;

/// Prompt asking the model to break down a research query
pub fn query_analysis(query: &str) -> Result<String> {
    render(QUERY_ANALYSIS_TEMPLATE, context! { query => query.trim() })
}

/// Prompt asking the model for key points and sentiment of some documents
pub fn content_analysis(documents: &[String], max_key_points: usize) -> Result<String> {
    render(
        CONTENT_ANALYSIS_TEMPLATE,
        context! { documents => documents, max_key_points => max_key_points },
    )
}

fn render(template: &str, ctx: minijinja::Value) -> Result<String> {
    let env = Environment::new();
    Ok(env.render_str(template, ctx)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_analysis_embeds_query() {
        let prompt = query_analysis("  What is new in quantum computing?  ").unwrap();
        assert!(prompt.contains("Query: What is new in quantum computing?"));
        assert!(prompt.contains("\"needs_news\""));
    }

    #[test]
    fn test_query_is_not_html_escaped() {
        let prompt = query_analysis("R&D <budgets>").unwrap();
        assert!(prompt.contains("R&D <budgets>"));
    }

    #[test]
    fn test_content_analysis_numbers_documents() {
        let docs = vec!["First text".to_string(), "Second text".to_string()];
        let prompt = content_analysis(&docs, 3).unwrap();

        assert!(prompt.contains("--- Document 1 ---\nFirst text"));
        assert!(prompt.contains("--- Document 2 ---\nSecond text"));
        assert!(prompt.contains("at most 3 key points"));
    }
}
