//! The `transport` module exposes the relay over the network.
//!
//! - `http`: webhook ingestion, the pull API and the SSE push stream
//! - `websocket`: the socket-based push channel and its JSON protocol
//!   (`message`)
//! - `shutdown`: the signal that closes both push channels on shutdown
//!
//! Both push transports sit on the same broker subscription model; they
//! differ only in how events are framed.

pub mod http;
pub mod message;
pub mod shutdown;
pub mod websocket;

pub use http::{AppState, router};
pub use message::{ClientMessage, ServerMessage};
pub use websocket::start_websocket_server;
