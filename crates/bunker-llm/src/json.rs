//! Defensive parsing of JSON-mode output
//!
//! Models wrap JSON in code fences, prepend chatter, or return nothing at all.
//! These helpers never fail: unusable output becomes an empty map.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

fn fence_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```[a-zA-Z0-9_-]*\s*(.*?)\s*```").ok())
        .as_ref()
}

/// Remove a surrounding markdown code fence, if any
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    match fence_re()
        .and_then(|re| re.captures(trimmed))
        .and_then(|c| c.get(1))
    {
        Some(inner) => inner.as_str(),
        None => trimmed,
    }
}

/// Parse model output into a JSON object; anything else yields an empty map
pub fn parse_object(raw: &str) -> Map<String, Value> {
    let body = strip_code_fences(raw);
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        return map;
    }

    // Chatter around the object: take the outermost braces
    if let (Some(start), Some(end)) = (body.find('{'), body.rfind('}')) {
        if start < end {
            if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&body[start..=end]) {
                return map;
            }
        }
    }

    tracing::debug!(len = raw.len(), "Unparsable JSON-mode output");
    Map::new()
}

/// String field of a parsed object, trimmed; empty strings count as missing
pub fn str_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
