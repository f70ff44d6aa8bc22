//! The `error` module defines the error types used within the `sms-relay`
//! application.
//!
//! Only startup paths can fail: loading configuration and binding sockets.
//! Request handling never surfaces an error to the webhook sender, so the
//! ingest, store and broker modules have no error type of their own.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    /// The configuration sources could not be read or deserialized.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// A configuration value was readable but unusable.
    #[error("invalid setting `{key}`: {reason}")]
    InvalidSetting { key: &'static str, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
}

pub type Result<T> = std::result::Result<T, RelayError>;
