//! Defensive extraction of JSON from messy model output.
//!
//! Models asked for "JSON and nothing else" still wrap responses in prose
//! or markdown fences often enough that a strict `serde_json::from_str` is
//! not usable on its own. These helpers try, in order: direct parse,
//! fenced code block extraction, and embedded-object detection. A response
//! with no recoverable JSON is an error — the structured client treats it
//! as a failed attempt and retries.

use crate::error::Result;
use crate::GenerationError;
use serde_json::Value;

/// Truncate to at most `max_bytes`, backing up to a char boundary.
pub(crate) fn truncate(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Extract the contents of a markdown fenced code block.
///
/// Recognizes `` ```json ``, `` ```JSON ``, and plain `` ``` `` fences.
pub fn extract_json_block(text: &str) -> Option<String> {
    let markers = ["```json", "```JSON", "```"];
    for marker in markers {
        if let Some(start) = text.find(marker) {
            let content_start = start + marker.len();
            if let Some(end) = text[content_start..].find("```") {
                return Some(text[content_start..content_start + end].trim().to_string());
            }
        }
    }
    None
}

/// Locate a JSON object or array inside text that may contain surrounding
/// prose.
///
/// Tries, in order:
/// 1. Markdown code block extraction
/// 2. First `{` or `[` with a matching closer
pub fn extract_json_candidate(text: &str) -> Option<String> {
    let trimmed = text.trim();

    if let Some(block) = extract_json_block(trimmed) {
        return Some(block);
    }

    if let Some(idx) = trimmed.find('{').or_else(|| trimmed.find('[')) {
        let candidate = &trimmed[idx..];
        if serde_json::from_str::<Value>(candidate).is_ok() {
            return Some(candidate.to_string());
        }
        let open = candidate.as_bytes()[0];
        let close = if open == b'{' { b'}' } else { b']' };
        if let Some(end) = candidate.rfind(close as char) {
            let substr = &candidate[..=end];
            if serde_json::from_str::<Value>(substr).is_ok() {
                return Some(substr.to_string());
            }
        }
    }

    None
}

/// Parse text into a `serde_json::Value`, requiring valid JSON somewhere
/// in it.
pub fn parse_value(text: &str) -> Result<Value> {
    let trimmed = text.trim();

    if let Ok(val) = serde_json::from_str::<Value>(trimmed) {
        return Ok(val);
    }

    if let Some(candidate) = extract_json_candidate(trimmed) {
        if let Ok(val) = serde_json::from_str::<Value>(&candidate) {
            return Ok(val);
        }
    }

    Err(GenerationError::Other(format!(
        "no valid JSON found in model output (truncated): {}",
        truncate(trimmed, 200)
    )))
}
