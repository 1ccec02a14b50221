//! Language-model collaborator for research-agent
//!
//! The research pipeline only needs "prompt in, text out" from a model, so
//! this crate keeps a small surface:
//!
//! - Message types for a single-turn or multi-turn exchange
//! - Completion request/response types
//! - The [`LLMProvider`] trait the pipeline depends on
//! - Concrete provider implementations (behind feature flags)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;

// Provider implementations (feature-gated)
#[cfg(any(feature = "openai", feature = "anthropic"))]
pub mod providers;
