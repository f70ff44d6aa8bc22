//! The `ingest` module turns a raw webhook request into message fields.
//!
//! Two profiles exist because forwarders in the wild disagree on the
//! payload shape:
//!
//! - `Delimited`: a single `message` value of the form
//!   `time##from##country##to##text`, found by [`normalize`] and split by
//!   [`decompose`].
//! - `KeyValue`: separate keys for the recipient (`to`/`mobile`/`number`)
//!   and the body (`text`/`message`/`key`).

pub mod decompose;
pub mod normalize;
pub mod payload;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use decompose::{DELIMITER, MessageFields, decompose};
pub use normalize::normalize;
pub use payload::{InboundPayload, ParsedBody};

use payload::{parse_form, value_to_string};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestProfile {
    #[default]
    Delimited,
    KeyValue,
}

/// What ingestion could determine from one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    /// The normalized message before decomposition.
    pub raw_message: String,
    pub fields: MessageFields,
}

const TO_KEYS: [&str; 3] = ["to", "mobile", "number"];
const TEXT_KEYS: [&str; 3] = ["text", "message", "key"];
const TIME_KEYS: [&str; 2] = ["time", "timestamp"];

/// Runs the configured profile over a payload.
pub fn extract(profile: IngestProfile, payload: &InboundPayload) -> Extracted {
    match profile {
        IngestProfile::Delimited => {
            let raw_message = normalize(&payload.parsed, &payload.raw);
            let fields = decompose(&raw_message);
            Extracted {
                raw_message,
                fields,
            }
        }
        IngestProfile::KeyValue => extract_key_value(payload),
    }
}

fn extract_key_value(payload: &InboundPayload) -> Extracted {
    let raw_text = payload.raw_text();
    let trimmed = raw_text.trim();

    let mapping = payload
        .parsed
        .as_mapping()
        .filter(has_known_key)
        .or_else(|| raw_mapping(trimmed));

    let fields = match mapping {
        Some(map) => MessageFields {
            time: first_of(&map, &TIME_KEYS),
            to: first_of(&map, &TO_KEYS),
            text: first_of(&map, &TEXT_KEYS),
            ..MessageFields::default()
        },
        None => MessageFields {
            text: trimmed.to_string(),
            ..MessageFields::default()
        },
    };

    Extracted {
        raw_message: fields.text.clone(),
        fields,
    }
}

fn has_known_key(map: &Map<String, Value>) -> bool {
    TO_KEYS
        .iter()
        .chain(TEXT_KEYS.iter())
        .any(|k| map.contains_key(*k))
}

/// Recovers a mapping from the raw body when the declared type was wrong.
fn raw_mapping(trimmed: &str) -> Option<Map<String, Value>> {
    if trimmed.is_empty() {
        return None;
    }

    let form = ParsedBody::Form(parse_form(trimmed.as_bytes()));
    if let Some(map) = form.as_mapping().filter(has_known_key) {
        return Some(map);
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) if has_known_key(&map) => Some(map),
        _ => None,
    }
}

fn first_of(map: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| map.get(*k))
        .map(value_to_string)
        .unwrap_or_default()
}
