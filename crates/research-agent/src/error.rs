//! Error types for research operations

use thiserror::Error;

/// Errors surfaced by the research pipeline
///
/// Search and news failures never appear here directly: those clients
/// report failures inside their result values. The orchestrator raises
/// [`ResearchError::Search`] itself when a search comes back failed.
#[derive(Debug, Error)]
pub enum ResearchError {
    /// The language model call failed or returned nothing
    #[error("Language model unavailable: {0}")]
    ModelUnavailable(String),

    /// The model reply could not be mapped onto the expected fields
    #[error("Could not parse model reply: {0}")]
    AnalysisParse(String),

    /// A page could not be fetched (transport error or non-2xx status)
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// A fetched page was not usable markup
    #[error("Failed to parse {url}: {reason}")]
    Parse { url: String, reason: String },

    /// The content analyzer was given no texts
    #[error("No content to analyze")]
    EmptyInput,

    /// The search step returned an error payload
    #[error("Search failed: {0}")]
    Search(String),

    /// A prompt template failed to render
    #[error("Prompt rendering failed: {0}")]
    Prompt(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ResearchError {
    /// Short, stable name of the error kind for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ModelUnavailable(_) => "model_unavailable",
            Self::AnalysisParse(_) => "analysis_parse",
            Self::Fetch { .. } => "fetch",
            Self::Parse { .. } => "parse",
            Self::EmptyInput => "empty_input",
            Self::Search(_) => "search",
            Self::Prompt(_) => "prompt",
            Self::Config(_) => "config",
        }
    }
}

/// Result type alias for research operations
pub type Result<T> = std::result::Result<T, ResearchError>;

impl From<research_llm::LLMError> for ResearchError {
    fn from(err: research_llm::LLMError) -> Self {
        ResearchError::ModelUnavailable(err.to_string())
    }
}

impl From<minijinja::Error> for ResearchError {
    fn from(err: minijinja::Error) -> Self {
        ResearchError::Prompt(err.to_string())
    }
}
