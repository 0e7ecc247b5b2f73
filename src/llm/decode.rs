//! Decoding of the model's reply text into a [`GenerationResult`].
//!
//! Models routinely wrap JSON in markdown fences even when told not to, so the
//! text is cleaned before parsing. The parsed value is then checked field by
//! field instead of trusting its shape.

use serde_json::{Map, Value};

use crate::error::GenerationError;
use crate::llm::{GenerationResult, Mode};

const FENCE_JSON: &str = "```json";
const FENCE: &str = "```";

/// Trim the reply and drop every "```json" and "```" marker.
///
/// Single left-to-right pass; at each position the longer marker wins.
pub fn clean_response(raw: &str) -> String {
    let mut rest = raw.trim();
    let mut out = String::with_capacity(rest.len());

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix(FENCE_JSON) {
            rest = after;
        } else if let Some(after) = rest.strip_prefix(FENCE) {
            rest = after;
        } else {
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                out.push(c);
            }
            rest = chars.as_str();
        }
    }

    out
}

/// Clean, parse and validate a reply for the given mode.
pub fn decode(raw: &str, mode: Mode) -> Result<GenerationResult, GenerationError> {
    let cleaned = clean_response(raw);

    let value: Value = serde_json::from_str(&cleaned)
        .map_err(|e| GenerationError::malformed(format!("reply is not valid JSON: {e}")))?;

    let object = value
        .as_object()
        .ok_or_else(|| GenerationError::malformed("reply is not a JSON object"))?;

    match mode {
        Mode::Commit => Ok(GenerationResult::Commit {
            message: required_str(object, "message")?,
        }),
        Mode::PullRequest => Ok(GenerationResult::PullRequest {
            title: required_str(object, "title")?,
            description: required_str(object, "description")?,
        }),
    }
}

fn required_str(object: &Map<String, Value>, key: &str) -> Result<String, GenerationError> {
    match object.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(GenerationError::malformed(format!(
            "key `{key}` should be a string, got {}",
            kind_of(other)
        ))),
        None => Err(GenerationError::malformed(format!("missing key `{key}`"))),
    }
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
