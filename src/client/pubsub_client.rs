//! Subscriber representation
//!
//! `Client` models one connected live viewer and holds the sending side of
//! a per-viewer channel used by the broker to push events. The transport
//! that owns the receiving side (SSE stream or WebSocket connection)
//! decides how events are framed on the wire.
//!
//! The channel is bounded: a viewer that stops reading fills its queue and
//! is dropped by the broker instead of buffering without limit.

use tokio::sync::mpsc::{self, Receiver, Sender};
use uuid::Uuid;

use crate::broker::event::HubEvent;

pub type SubscriberId = String;

/// Events queued per viewer before it is considered stalled.
pub const SUBSCRIBER_BUFFER: usize = 256;

#[derive(Debug)]
pub struct Client {
    pub id: SubscriberId,
    pub sender: Sender<HubEvent>,
}

impl Client {
    /// Create a new client with a sender channel. The `id` is a UUID used
    /// to identify the client across broker operations.
    pub fn new(sender: Sender<HubEvent>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
        }
    }

    /// Create a client with a fresh `SUBSCRIBER_BUFFER`-sized channel.
    pub fn channel() -> (Self, Receiver<HubEvent>) {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        (Self::new(tx), rx)
    }
}
