//! Inbound webhook payloads.
//!
//! The upstream forwarder's `Content-Type` header is unreliable, so the body
//! is kept twice: as the raw bytes and as a best-effort `ParsedBody` derived
//! from the declared type. The normalizer consults both.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// The body as interpreted from its declared content type.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedBody {
    Empty,
    /// `application/x-www-form-urlencoded` pairs, in body order.
    Form(Vec<(String, String)>),
    Json(Value),
    Text(String),
}

impl ParsedBody {
    /// Parses `body` according to `content_type`. Never fails: a body that
    /// does not match its declared type degrades to `Text`.
    pub fn parse(content_type: Option<&str>, body: &[u8]) -> Self {
        if body.is_empty() {
            return Self::Empty;
        }

        match content_type.and_then(|ct| ct.parse::<mime::Mime>().ok()) {
            Some(m) if m.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() => {
                Self::Form(parse_form(body))
            }
            Some(m) if is_json(&m) => match serde_json::from_slice::<Value>(body) {
                Ok(value) => Self::Json(value),
                Err(_) => Self::Text(String::from_utf8_lossy(body).into_owned()),
            },
            _ => Self::Text(String::from_utf8_lossy(body).into_owned()),
        }
    }

    /// Returns the body as a key/value mapping when it is one: form data or
    /// a JSON object. Repeated form keys keep their first value.
    pub fn as_mapping(&self) -> Option<Map<String, Value>> {
        match self {
            Self::Form(pairs) => {
                let mut map = Map::new();
                for (key, value) in pairs {
                    if !map.contains_key(key) {
                        map.insert(key.clone(), Value::String(value.clone()));
                    }
                }
                Some(map)
            }
            Self::Json(Value::Object(map)) => Some(map.clone()),
            _ => None,
        }
    }

    /// JSON rendering kept with diagnostic records.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Form(_) => Value::Object(self.as_mapping().unwrap_or_default()),
            Self::Json(value) => value.clone(),
            Self::Text(text) => Value::String(text.clone()),
        }
    }
}

fn is_json(m: &mime::Mime) -> bool {
    m.type_() == mime::APPLICATION
        && (m.subtype() == mime::JSON || m.suffix() == Some(mime::JSON))
}

pub(crate) fn parse_form(body: &[u8]) -> Vec<(String, String)> {
    url::form_urlencoded::parse(body)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// One webhook request, read in full before normalization starts.
#[derive(Debug, Clone)]
pub struct InboundPayload {
    pub content_type: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub parsed: ParsedBody,
    pub raw: Vec<u8>,
}

impl InboundPayload {
    pub fn new(content_type: Option<String>, headers: BTreeMap<String, String>, raw: Vec<u8>) -> Self {
        let parsed = ParsedBody::parse(content_type.as_deref(), &raw);
        Self {
            content_type,
            headers,
            parsed,
            raw,
        }
    }

    /// Raw body as text; invalid UTF-8 is replaced rather than rejected.
    pub fn raw_text(&self) -> String {
        String::from_utf8_lossy(&self.raw).into_owned()
    }
}

/// Coerces a JSON value to the string stored in a message field.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
