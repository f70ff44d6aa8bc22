use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ingest::MessageFields;

pub type RecordId = String;

/// Request details kept only when diagnostic capture is enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub headers: BTreeMap<String, String>,
    pub raw_body: String,
    pub parsed_body: Value,
}

/// A stored SMS. Immutable once inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub id: RecordId,
    pub received_at: DateTime<Utc>,
    /// `None` under capacity-bound retention.
    pub expires_at: Option<DateTime<Utc>>,
    pub raw_message: String,
    pub fields: MessageFields,
    #[serde(flatten)]
    pub diagnostics: Option<Diagnostics>,
}

impl MessageRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Input to [`MessageStore::insert`](super::MessageStore::insert).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewRecord {
    pub raw_message: String,
    pub fields: MessageFields,
    pub diagnostics: Option<Diagnostics>,
}
