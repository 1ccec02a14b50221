//! Language-model and local analysis stages

pub mod content;
mod json;
pub mod query;

pub use content::{ContentAnalyzer, HeuristicContentAnalyzer, LlmContentAnalyzer};
pub use query::{QueryAnalyzer, parse_analysis};

use crate::config::ModelSettings;
use crate::prompts::SYSTEM_PROMPT;
use research_llm::{CompletionRequest, Message};

/// Single-turn completion request for a rendered prompt
fn completion_request(settings: &ModelSettings, prompt: String) -> CompletionRequest {
    let system = settings
        .system_prompt
        .clone()
        .unwrap_or_else(|| SYSTEM_PROMPT.to_string());

    let mut builder = CompletionRequest::builder(&settings.model)
        .add_message(Message::user(prompt))
        .system(system)
        .max_tokens(settings.max_tokens);

    if let Some(temperature) = settings.temperature {
        builder = builder.temperature(temperature);
    }

    builder.build()
}
