//! The `client` module defines the representation of a live viewer.
//!
//! It provides the `Client` struct, which encapsulates the state of a single
//! connected subscriber: its unique identifier and the bounded channel the
//! broker pushes events into.

pub mod pubsub_client;
pub use pubsub_client::{Client, SUBSCRIBER_BUFFER, SubscriberId};

#[cfg(test)]
mod tests;
