//! Broker engine
//!
//! This module owns the message history and the set of live viewers, and is
//! responsible for:
//! - accepting ingested messages into the store and announcing them
//! - deleting records (one by one, all at once, or by expiry) and
//!   announcing each removal exactly once
//! - sending a snapshot to every viewer as it connects
//!
//! Concurrency and usage notes:
//! - The API is synchronous and designed to be held behind a lock
//!   (`SharedBroker`). Every mutation of the store and every publish happens
//!   under that one lock, so each viewer sees events in publish order and a
//!   new viewer's snapshot is consistent with the events that follow it.
//! - Delivery is a non-blocking `try_send` into each viewer's bounded
//!   channel; a viewer whose channel is closed or full is dropped. Callers
//!   must not hold the lock across network I/O.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::{Receiver, error::TrySendError};
use tracing::{debug, info, warn};

use crate::broker::event::{DeleteReason, HubEvent};
use crate::client::{Client, SubscriberId};
use crate::store::{MessageRecord, MessageStore, NewRecord, RecordId};

pub type SharedBroker = Arc<Mutex<Broker>>;

/// Locks the broker, recovering the guard if a previous holder panicked.
pub fn lock_broker(broker: &SharedBroker) -> MutexGuard<'_, Broker> {
    broker.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
pub struct Broker {
    pub clients: HashMap<SubscriberId, Client>,
    store: MessageStore,
}

impl Broker {
    pub fn new(store: MessageStore) -> Self {
        Self {
            clients: HashMap::new(),
            store,
        }
    }

    pub fn shared(self) -> SharedBroker {
        Arc::new(Mutex::new(self))
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Registers a viewer and sends it the current snapshot. A client whose
    /// channel is already closed (or full) is not registered.
    pub fn register_client(&mut self, client: Client, now: DateTime<Utc>) {
        let messages = self.snapshot(now);
        if client.sender.try_send(HubEvent::Init { messages }).is_err() {
            debug!(client = %client.id, "client gone before registration");
            return;
        }
        info!(client = %client.id, "client connected");
        self.clients.insert(client.id.clone(), client);
    }

    /// Creates a fresh channel-backed viewer and registers it.
    pub fn subscribe(
        &mut self,
        now: DateTime<Utc>,
    ) -> (SubscriberId, Receiver<HubEvent>) {
        let (client, rx) = Client::channel();
        let id = client.id.clone();
        self.register_client(client, now);
        (id, rx)
    }

    /// Removes a viewer. Safe to call repeatedly.
    pub fn remove_client(&mut self, client_id: &str) -> bool {
        let removed = self.clients.remove(client_id).is_some();
        if removed {
            info!(client = %client_id, "client disconnected");
        }
        removed
    }

    /// Re-sends the snapshot to one registered viewer.
    pub fn send_snapshot(&mut self, client_id: &str, now: DateTime<Utc>) {
        let messages = self.snapshot(now);
        let failed = match self.clients.get(client_id) {
            Some(client) => client.sender.try_send(HubEvent::Init { messages }).is_err(),
            None => false,
        };
        if failed {
            self.remove_client(client_id);
        }
    }

    /// Sends `event` to every registered viewer and returns how many got
    /// it. A viewer whose channel is closed or full is dropped, never
    /// reported.
    pub fn publish(&mut self, event: HubEvent) -> usize {
        let mut delivered = 0;
        let mut failed = Vec::new();

        for (id, client) in &self.clients {
            match client.sender.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => failed.push((id.clone(), "client lagging")),
                Err(TrySendError::Closed(_)) => failed.push((id.clone(), "client unreachable")),
            }
        }

        for (id, cause) in failed {
            warn!(client = %id, event = event.name(), cause, "dropping client");
            self.clients.remove(&id);
        }

        debug!(event = event.name(), delivered, "published");
        delivered
    }

    /// Stores a message and announces it, followed by any records the
    /// capacity bound pushed out.
    pub fn ingest(&mut self, new: NewRecord, now: DateTime<Utc>) -> MessageRecord {
        let insertion = self.store.insert(new, now);
        info!(id = %insertion.record.id, from = %insertion.record.fields.from, "message stored");

        self.publish(HubEvent::New {
            message: insertion.record.clone(),
        });
        for id in insertion.evicted {
            self.publish(HubEvent::Delete {
                id,
                reason: DeleteReason::Evicted,
            });
        }

        insertion.record
    }

    /// Live records, newest first. Under a TTL policy expired records are
    /// swept (and announced) before the listing is taken.
    pub fn snapshot(&mut self, now: DateTime<Utc>) -> Vec<MessageRecord> {
        if self.store.policy().is_ttl() {
            self.sweep(now);
        }
        self.store.list_all(now)
    }

    /// Deletes one record. Unknown ids are a silent no-op.
    pub fn delete(&mut self, id: &str) -> bool {
        let removed = self.store.delete_by_id(id);
        if removed {
            self.publish(HubEvent::Delete {
                id: id.to_string(),
                reason: DeleteReason::Manual,
            });
        }
        removed
    }

    /// Clears the history with a single `clear` event.
    pub fn clear(&mut self) -> usize {
        let count = self.store.delete_all();
        info!(count, "history cleared");
        self.publish(HubEvent::Clear);
        count
    }

    /// Removes expired records, announcing each one.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> Vec<RecordId> {
        let removed = self.store.remove_expired(now);
        for id in &removed {
            self.publish(HubEvent::Delete {
                id: id.clone(),
                reason: DeleteReason::Expired,
            });
        }
        if !removed.is_empty() {
            info!(count = removed.len(), "expired records swept");
        }
        removed
    }
}

/// Unregisters a viewer when dropped, e.g. when an SSE stream is torn down
/// because the HTTP client went away.
#[derive(Debug)]
pub struct ClientGuard {
    broker: SharedBroker,
    client_id: SubscriberId,
}

impl ClientGuard {
    pub fn new(broker: SharedBroker, client_id: SubscriberId) -> Self {
        Self { broker, client_id }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}

impl Drop for ClientGuard {
    fn drop(&mut self) {
        lock_broker(&self.broker).remove_client(&self.client_id);
    }
}
