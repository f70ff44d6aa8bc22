//! # sms-relay
//!
//! `sms-relay` receives webhook calls from an Android SMS-forwarding app,
//! turns whatever body the app sent into a structured message, keeps a
//! bounded in-memory history and pushes every change to live viewers.
//!
//! ## Core Modules
//!
//! - `ingest`: body parsing, message normalization and field decomposition.
//! - `store`: the bounded, optionally time-expiring message history.
//! - `broker`: the subscriber hub that owns the store, fans events out to
//!   viewers, and the expiry sweeper.
//! - `client`: a connected viewer.
//! - `config`: loading and merging settings.
//! - `transport`: the HTTP API, the SSE stream and the WebSocket channel.
//! - `utils`: error type and logging setup.

pub mod broker;
pub mod client;
pub mod config;
pub mod ingest;
pub mod store;
pub mod transport;
pub mod utils;
