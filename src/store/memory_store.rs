//! Bounded in-memory message history.
//!
//! Records are kept newest first. Exactly one retention policy is active:
//! a time-to-live checked by sweeps, or a fixed capacity enforced at insert
//! time by dropping the oldest records.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;
use uuid::Uuid;

use super::record::{MessageRecord, NewRecord, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    Ttl(Duration),
    Capacity(usize),
}

impl RetentionPolicy {
    pub fn is_ttl(&self) -> bool {
        matches!(self, Self::Ttl(_))
    }
}

/// Result of an insert: the new record plus anything pushed out by the
/// capacity bound, oldest first.
#[derive(Debug, Clone)]
pub struct Insertion {
    pub record: MessageRecord,
    pub evicted: Vec<RecordId>,
}

#[derive(Debug)]
pub struct MessageStore {
    records: VecDeque<MessageRecord>,
    policy: RetentionPolicy,
}

impl MessageStore {
    pub fn new(policy: RetentionPolicy) -> Self {
        Self {
            records: VecDeque::new(),
            policy,
        }
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Stamps and stores a record. Never fails.
    pub fn insert(&mut self, new: NewRecord, now: DateTime<Utc>) -> Insertion {
        let expires_at = match self.policy {
            RetentionPolicy::Ttl(ttl) => TimeDelta::from_std(ttl)
                .ok()
                .and_then(|ttl| now.checked_add_signed(ttl))
                .or(Some(DateTime::<Utc>::MAX_UTC)),
            RetentionPolicy::Capacity(_) => None,
        };

        let record = MessageRecord {
            id: Uuid::new_v4().to_string(),
            received_at: now,
            expires_at,
            raw_message: new.raw_message,
            fields: new.fields,
            diagnostics: new.diagnostics,
        };
        self.records.push_front(record.clone());

        let mut evicted = Vec::new();
        if let RetentionPolicy::Capacity(max) = self.policy {
            while self.records.len() > max {
                if let Some(oldest) = self.records.pop_back() {
                    debug!(id = %oldest.id, "evicted oldest record over capacity");
                    evicted.push(oldest.id);
                }
            }
        }

        Insertion { record, evicted }
    }

    /// Live records, newest first. Records already past their expiry are
    /// left out even if no sweep has removed them yet.
    pub fn list_all(&self, now: DateTime<Utc>) -> Vec<MessageRecord> {
        self.records
            .iter()
            .filter(|r| !r.is_expired(now))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&MessageRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Removes one record. Returns `false` when the id is unknown.
    pub fn delete_by_id(&mut self, id: &str) -> bool {
        match self.records.iter().position(|r| r.id == id) {
            Some(index) => self.records.remove(index).is_some(),
            None => false,
        }
    }

    /// Empties the store, returning how many records were dropped.
    pub fn delete_all(&mut self) -> usize {
        let count = self.records.len();
        self.records.clear();
        count
    }

    /// Removes every record with `expires_at <= now`, returning their ids
    /// oldest first.
    pub fn remove_expired(&mut self, now: DateTime<Utc>) -> Vec<RecordId> {
        let mut removed = Vec::new();
        self.records.retain(|r| {
            if r.is_expired(now) {
                removed.push(r.id.clone());
                false
            } else {
                true
            }
        });
        removed.reverse();
        removed
    }
}
