//! Events pushed to live viewers.
//!
//! `HubEvent` is the transport-neutral vocabulary. It serializes as a JSON
//! object tagged by `type`, which is also the SSE event name.

use serde::{Deserialize, Serialize};

use crate::store::{MessageRecord, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteReason {
    /// Removed through the API.
    Manual,
    /// Removed by a sweep after its time-to-live ran out.
    Expired,
    /// Pushed out by the capacity bound.
    Evicted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HubEvent {
    /// Full snapshot, sent once when a viewer connects (or asks again).
    Init { messages: Vec<MessageRecord> },
    New { message: MessageRecord },
    Delete { id: RecordId, reason: DeleteReason },
    /// The whole history was cleared in one go.
    Clear,
}

impl HubEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::New { .. } => "new",
            Self::Delete { .. } => "delete",
            Self::Clear => "clear",
        }
    }
}
