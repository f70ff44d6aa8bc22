use std::time::Duration;

use serde::Deserialize;

use crate::ingest::IngestProfile;
use crate::store::RetentionPolicy;
use crate::utils::{RelayError, Result};

/// Top-level configuration settings for the application.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub ingest: IngestSettings,
    pub log: LogSettings,
}

/// Where the HTTP surface and the WebSocket channel listen.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub ws_enabled: bool,
    pub ws_port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RetentionKind {
    Ttl,
    Capacity,
}

/// Message history bounds. Only the fields of the selected `retention`
/// kind are used.
#[derive(Debug, Deserialize, Clone)]
pub struct StoreSettings {
    pub retention: RetentionKind,
    pub ttl_secs: u64,
    pub max_messages: usize,
    pub sweep_interval_secs: u64,
    pub capture_diagnostics: bool,
}

/// How `/sms` answers the forwarder.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AckMode {
    /// `text/plain` body `successful`.
    Text,
    /// `{"success": true, "id": .., "expiresAt": ..}`.
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestSettings {
    pub profile: IngestProfile,
    pub ack: AckMode,
    pub max_body_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values are filled from
/// `Settings::default()`.
#[derive(Debug, Deserialize, Default)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub store: Option<PartialStoreSettings>,
    pub ingest: Option<PartialIngestSettings>,
    pub log: Option<PartialLogSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub ws_enabled: Option<bool>,
    pub ws_port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct PartialStoreSettings {
    pub retention: Option<RetentionKind>,
    pub ttl_secs: Option<u64>,
    pub max_messages: Option<usize>,
    pub sweep_interval_secs: Option<u64>,
    pub capture_diagnostics: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct PartialIngestSettings {
    pub profile: Option<IngestProfile>,
    pub ack: Option<AckMode>,
    pub max_body_bytes: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLogSettings {
    pub level: Option<String>,
    pub json: Option<bool>,
}

/// Provides default values for `Settings`.
impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 3000,
                ws_enabled: true,
                ws_port: 8081,
            },
            store: StoreSettings {
                retention: RetentionKind::Ttl,
                ttl_secs: 600,
                max_messages: 200,
                sweep_interval_secs: 15,
                capture_diagnostics: false,
            },
            ingest: IngestSettings {
                profile: IngestProfile::Delimited,
                ack: AckMode::Text,
                max_body_bytes: 1024 * 1024,
            },
            log: LogSettings {
                level: "info".to_string(),
                json: false,
            },
        }
    }
}

impl ServerSettings {
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn ws_addr(&self) -> String {
        format!("{}:{}", self.host, self.ws_port)
    }
}

impl StoreSettings {
    /// The single retention policy this deployment runs with.
    pub fn retention_policy(&self) -> Result<RetentionPolicy> {
        match self.retention {
            RetentionKind::Ttl if self.ttl_secs == 0 => Err(RelayError::InvalidSetting {
                key: "store.ttl_secs",
                reason: "must be greater than zero".to_string(),
            }),
            RetentionKind::Ttl => Ok(RetentionPolicy::Ttl(Duration::from_secs(self.ttl_secs))),
            RetentionKind::Capacity if self.max_messages == 0 => Err(RelayError::InvalidSetting {
                key: "store.max_messages",
                reason: "must be greater than zero".to_string(),
            }),
            RetentionKind::Capacity => Ok(RetentionPolicy::Capacity(self.max_messages)),
        }
    }

    pub fn sweep_interval(&self) -> Result<Duration> {
        if self.sweep_interval_secs == 0 {
            return Err(RelayError::InvalidSetting {
                key: "store.sweep_interval_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(Duration::from_secs(self.sweep_interval_secs))
    }
}
