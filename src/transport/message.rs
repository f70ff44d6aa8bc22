use serde::{Deserialize, Serialize};

use crate::broker::event::{DeleteReason, HubEvent};
use crate::store::{MessageRecord, RecordId};

/// Frames a socket client may send.
#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Ask for a fresh `init` snapshot.
    #[serde(rename = "sync")]
    Sync,
    #[serde(rename = "delete")]
    Delete { id: RecordId },
    #[serde(rename = "clear")]
    Clear,
}

/// Frames pushed to socket clients.
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "init")]
    Init { messages: Vec<MessageRecord> },
    #[serde(rename = "newMessage")]
    NewMessage { message: MessageRecord },
    #[serde(rename = "messageDeleted")]
    MessageDeleted { id: RecordId, reason: DeleteReason },
    #[serde(rename = "messagesCleared")]
    MessagesCleared,
}

impl From<HubEvent> for ServerMessage {
    fn from(event: HubEvent) -> Self {
        match event {
            HubEvent::Init { messages } => Self::Init { messages },
            HubEvent::New { message } => Self::NewMessage { message },
            HubEvent::Delete { id, reason } => Self::MessageDeleted { id, reason },
            HubEvent::Clear => Self::MessagesCleared,
        }
    }
}
