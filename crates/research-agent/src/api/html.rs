//! Markup to visible text

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Tags whose start or end marks a line break in the visible text
const BLOCK_TAGS: &[&str] = &[
    "p", "br", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "tr", "section", "article",
    "header", "footer", "blockquote", "pre",
];

/// Tags whose content is never visible
const HIDDEN_TAGS: &[&str] = &["head", "title", "script", "style", "noscript", "template"];

/// Named entities other than `&amp;`, which is decoded last
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&mdash;", "-"),
    ("&ndash;", "-"),
];

static NUMERIC_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&#(?:[xX]([0-9a-fA-F]{1,6})|([0-9]{1,7}));")
        .expect("numeric reference pattern is valid")
});

/// Whether a content type should be treated as markup or text
pub(super) fn is_textual(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime.is_empty()
        || mime.starts_with("text/")
        || mime == "application/xhtml+xml"
        || mime == "application/xml"
}

/// Whether a content type is HTML or XHTML
pub(super) fn is_html(content_type: &str) -> bool {
    let lowered = content_type.to_ascii_lowercase();
    lowered.contains("text/html") || lowered.contains("application/xhtml")
}

/// Extract the visible text of an HTML document
///
/// Drops tags and hidden elements, turns block tags into line breaks,
/// decodes common entities and collapses blank lines.
pub(super) fn extract_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len() / 2);
    let mut tag = String::new();
    let mut in_tag = false;
    let mut in_comment = false;
    let mut hidden_depth = 0usize;

    let mut chars = html.char_indices().peekable();
    while let Some((i, ch)) = chars.next() {
        if in_comment {
            if ch == '>' && html[..i].ends_with("--") {
                in_comment = false;
            }
            continue;
        }

        if in_tag {
            if ch == '>' {
                in_tag = false;
                let name = tag_name(&tag);
                let closing = tag.starts_with('/');

                if name == "body" && !closing {
                    // An unclosed <head> must not hide the body
                    hidden_depth = 0;
                } else if HIDDEN_TAGS.contains(&name.as_str()) {
                    if closing {
                        hidden_depth = hidden_depth.saturating_sub(1);
                    } else if !tag.ends_with('/') {
                        hidden_depth += 1;
                    }
                } else if hidden_depth == 0 && BLOCK_TAGS.contains(&name.as_str()) {
                    text.push('\n');
                }
            } else {
                tag.push(ch);
            }
            continue;
        }

        if ch == '<' {
            if html[i..].starts_with("<!--") {
                in_comment = true;
                continue;
            }
            // A lone '<' followed by something that can't open a tag is text
            let opens_tag = chars
                .peek()
                .is_some_and(|&(_, next)| next.is_ascii_alphabetic() || matches!(next, '/' | '!' | '?'));
            if opens_tag {
                in_tag = true;
                tag.clear();
                continue;
            }
        }

        if hidden_depth == 0 {
            text.push(ch);
        }
    }

    normalize_whitespace(&decode_entities(text))
}

/// Decode named and numeric character references
///
/// `&amp;` goes last so "&amp;lt;" decodes to "&lt;" and not "<".
fn decode_entities(text: String) -> String {
    let named = NAMED_ENTITIES
        .iter()
        .fold(text, |acc, (entity, replacement)| acc.replace(entity, replacement));

    let numeric = NUMERIC_REF.replace_all(&named, |caps: &Captures<'_>| {
        let code = match (caps.get(1), caps.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (None, Some(dec)) => dec.as_str().parse().ok(),
            (None, None) => None,
        };
        code.and_then(char::from_u32)
            .map_or_else(|| caps[0].to_string(), String::from)
    });

    numeric.replace("&amp;", "&")
}

/// Lowercased element name of a raw tag body such as `/DIV class="x"`
fn tag_name(raw: &str) -> String {
    raw.trim_start_matches('/')
        .chars()
        .take_while(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Collapse runs of spaces within lines and drop blank lines
pub(super) fn normalize_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
