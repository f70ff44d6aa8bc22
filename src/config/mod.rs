mod settings;

use config::{Config, ConfigError, Environment, File};

use settings::PartialSettings;

pub use settings::{
    AckMode, IngestSettings, LogSettings, RetentionKind, ServerSettings, Settings, StoreSettings,
};

/// Prefix of environment overrides, e.g. `SMS_RELAY_SERVER__PORT=3000`.
pub const ENV_PREFIX: &str = "SMS_RELAY";

/// Loads the configuration from `config/default` (any supported format,
/// optional), a `.env` file and environment variables, merged onto defaults.
pub fn load_config() -> Result<Settings, ConfigError> {
    dotenvy::dotenv().ok();
    load_config_from("config/default")
}

/// Like [`load_config`] but reads the file source from `path` and does not
/// touch `.env`.
pub fn load_config_from(path: &str) -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(merge(partial, Settings::default()))
}

fn merge(partial: PartialSettings, default: Settings) -> Settings {
    Settings {
        server: ServerSettings {
            host: partial
                .server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(default.server.host),
            port: partial
                .server
                .as_ref()
                .and_then(|s| s.port)
                .unwrap_or(default.server.port),
            ws_enabled: partial
                .server
                .as_ref()
                .and_then(|s| s.ws_enabled)
                .unwrap_or(default.server.ws_enabled),
            ws_port: partial
                .server
                .as_ref()
                .and_then(|s| s.ws_port)
                .unwrap_or(default.server.ws_port),
        },
        store: StoreSettings {
            retention: partial
                .store
                .as_ref()
                .and_then(|s| s.retention)
                .unwrap_or(default.store.retention),
            ttl_secs: partial
                .store
                .as_ref()
                .and_then(|s| s.ttl_secs)
                .unwrap_or(default.store.ttl_secs),
            max_messages: partial
                .store
                .as_ref()
                .and_then(|s| s.max_messages)
                .unwrap_or(default.store.max_messages),
            sweep_interval_secs: partial
                .store
                .as_ref()
                .and_then(|s| s.sweep_interval_secs)
                .unwrap_or(default.store.sweep_interval_secs),
            capture_diagnostics: partial
                .store
                .as_ref()
                .and_then(|s| s.capture_diagnostics)
                .unwrap_or(default.store.capture_diagnostics),
        },
        ingest: IngestSettings {
            profile: partial
                .ingest
                .as_ref()
                .and_then(|i| i.profile)
                .unwrap_or(default.ingest.profile),
            ack: partial
                .ingest
                .as_ref()
                .and_then(|i| i.ack)
                .unwrap_or(default.ingest.ack),
            max_body_bytes: partial
                .ingest
                .as_ref()
                .and_then(|i| i.max_body_bytes)
                .unwrap_or(default.ingest.max_body_bytes),
        },
        log: LogSettings {
            level: partial
                .log
                .as_ref()
                .and_then(|l| l.level.clone())
                .unwrap_or(default.log.level),
            json: partial
                .log
                .as_ref()
                .and_then(|l| l.json)
                .unwrap_or(default.log.json),
        },
    }
}

#[cfg(test)]
mod tests;
