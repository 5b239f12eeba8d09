//! JSON response parsing (§4.5 "JSON response parsing").
//!
//! Grounded in `original_source/src/utils/llm/parser.py`'s `parse_json`:
//! try fenced code blocks first, then the whole text, both via a
//! JSON5-tolerant parser so minor LLM formatting slips (trailing commas,
//! unquoted keys) don't trigger a retry. Arrays and scalars are rejected --
//! a decision must come back as an object.

use crate::error::LlmError;

/// Parse `text` into a JSON object, trying fenced code blocks before the
/// whole text, and tolerating JSON5 syntax at each step.
///
/// # Errors
///
/// Returns [`LlmError::Parse`] carrying the first 500 characters of `text`
/// if no strategy yields a JSON object.
pub fn parse_json_object(text: &str) -> Result<serde_json::Value, LlmError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(LlmError::Parse(String::new()));
    }

    for (lang, content) in extract_code_blocks(trimmed) {
        if lang.is_empty() || lang == "json" || lang == "json5" {
            if let Some(value) = try_parse_object(&content) {
                return Ok(value);
            }
        }
    }

    if let Some(value) = try_parse_object(trimmed) {
        return Ok(value);
    }

    Err(LlmError::Parse(trimmed.chars().take(500).collect()))
}

fn try_parse_object(text: &str) -> Option<serde_json::Value> {
    let value: serde_json::Value = json5::from_str(text).ok()?;
    value.is_object().then_some(value)
}

/// Extract every fenced code block (` ```lang\n...\n``` `) from `text`,
/// returning `(language, content)` pairs in document order.
fn extract_code_blocks(text: &str) -> Vec<(String, String)> {
    let mut blocks = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find("```") {
        let after_open = &rest[open + 3..];
        let newline = match after_open.find('\n') {
            Some(idx) => idx,
            None => break,
        };
        let lang = after_open[..newline].trim().to_lowercase();
        let body_start = newline + 1;
        let Some(close) = after_open[body_start..].find("```") else {
            break;
        };
        let content = after_open[body_start..body_start + close].trim().to_owned();
        blocks.push((lang, content));
        rest = &after_open[body_start + close + 3..];
    }
    blocks
}
