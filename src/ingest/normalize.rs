//! Message extraction from an arbitrary webhook body.
//!
//! The same logical payload shows up form-encoded, as JSON, as plain text,
//! or as a form whose only key *is* the message. Each step below is a
//! fallback for the one before it; none of them can fail.

use serde_json::Value;

use super::payload::{ParsedBody, parse_form, value_to_string};

const MESSAGE_KEY: &str = "message";

/// Extracts the single logical message string from a request body.
///
/// 1. A parsed mapping with a `message` key yields that value.
/// 2. A non-empty raw body is tried as form data, then as a JSON object,
///    and otherwise taken verbatim (trimmed).
/// 3. A parsed mapping with exactly one key yields the key's name.
/// 4. Otherwise the message is empty.
pub fn normalize(parsed: &ParsedBody, raw: &[u8]) -> String {
    let mapping = parsed.as_mapping();

    if let Some(value) = mapping.as_ref().and_then(|m| m.get(MESSAGE_KEY)) {
        return value_to_string(value);
    }

    let raw_text = String::from_utf8_lossy(raw);
    let trimmed = raw_text.trim();
    if !trimmed.is_empty() {
        return from_raw(trimmed);
    }

    if let Some(map) = mapping {
        if map.len() == 1 {
            if let Some(key) = map.keys().next() {
                return key.clone();
            }
        }
    }

    String::new()
}

fn from_raw(trimmed: &str) -> String {
    let from_form = parse_form(trimmed.as_bytes())
        .into_iter()
        .find(|(k, _)| k == MESSAGE_KEY)
        .map(|(_, v)| v)
        .filter(|v| !v.is_empty());
    if let Some(message) = from_form {
        return message;
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        if let Some(value) = map.get(MESSAGE_KEY) {
            return value_to_string(value);
        }
    }

    trimmed.to_string()
}
