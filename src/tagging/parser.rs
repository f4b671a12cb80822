//! Lenient JSON-object extraction from model output.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::core::errors::RagError;
use crate::document::Metadata;

fn fence_pattern() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)```").expect("fence pattern is valid")
    })
}

/// Parses `text` as a JSON object. Accepts a bare object, an object inside a
/// markdown code fence, or an object surrounded by prose.
pub fn parse_json_object(text: &str) -> Result<Metadata, RagError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(RagError::Parse("empty response".to_string()));
    }

    let mut candidates: Vec<&str> = vec![trimmed];
    if let Some(captures) = fence_pattern().captures(trimmed) {
        if let Some(inner) = captures.get(1) {
            candidates.push(inner.as_str().trim());
        }
    }
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            candidates.push(&trimmed[start..=end]);
        }
    }

    let mut last_error = None;
    for candidate in candidates {
        match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Object(map)) => return Ok(map),
            Ok(other) => {
                last_error = Some(format!("expected a JSON object, got {}", kind_of(&other)));
            }
            Err(err) => last_error = Some(err.to_string()),
        }
    }

    Err(RagError::Parse(
        last_error.unwrap_or_else(|| "no JSON object found".to_string()),
    ))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
