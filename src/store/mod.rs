//! The `store` module holds the relay's message history.
//!
//! Nothing is persisted: the history lives for the lifetime of the process
//! and is bounded either by age or by count, see [`RetentionPolicy`].

pub mod memory_store;
pub mod record;

pub use memory_store::{Insertion, MessageStore, RetentionPolicy};
pub use record::{Diagnostics, MessageRecord, NewRecord, RecordId};

#[cfg(test)]
mod tests;
