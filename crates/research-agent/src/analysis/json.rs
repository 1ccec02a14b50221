//! Locating the JSON object inside a model reply

use regex::Regex;
use std::sync::LazyLock;

static FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*(\{.*?\})\s*```").expect("fenced JSON pattern is valid")
});

/// Slice of `reply` holding the JSON object, if any
///
/// A fenced code block wins; otherwise the span from the first `{` to the
/// last `}` is taken.
pub(crate) fn extract_object(reply: &str) -> Option<&str> {
    if let Some(block) = FENCED_JSON.captures(reply).and_then(|c| c.get(1)) {
        return Some(block.as_str());
    }

    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (start < end).then(|| &reply[start..=end])
}

/// Trim entries and drop blank ones
pub(crate) fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
