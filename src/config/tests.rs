use std::fs;
use std::time::Duration;

use serial_test::serial;
use tempfile::TempDir;

use super::*;
use crate::ingest::IngestProfile;
use crate::store::RetentionPolicy;

fn missing_file(tmp: &TempDir) -> String {
    tmp.path().join("absent").to_string_lossy().into_owned()
}

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 3000);
    assert!(settings.server.ws_enabled);
    assert_eq!(settings.server.ws_port, 8081);
    assert_eq!(settings.store.retention, RetentionKind::Ttl);
    assert_eq!(settings.store.ttl_secs, 600);
    assert_eq!(settings.store.max_messages, 200);
    assert_eq!(settings.store.sweep_interval_secs, 15);
    assert!(!settings.store.capture_diagnostics);
    assert_eq!(settings.ingest.profile, IngestProfile::Delimited);
    assert_eq!(settings.ingest.ack, AckMode::Text);
    assert_eq!(settings.log.level, "info");
}

#[test]
fn test_default_retention_policy_is_ttl() {
    let settings = Settings::default();
    assert_eq!(
        settings.store.retention_policy().unwrap(),
        RetentionPolicy::Ttl(Duration::from_secs(600))
    );
    assert_eq!(settings.store.sweep_interval().unwrap(), Duration::from_secs(15));
}

#[test]
fn test_zero_bounds_are_rejected() {
    let mut store = Settings::default().store;
    store.ttl_secs = 0;
    assert!(store.retention_policy().is_err());

    store.retention = RetentionKind::Capacity;
    assert!(store.retention_policy().is_ok());
    store.max_messages = 0;
    assert!(store.retention_policy().is_err());

    store.sweep_interval_secs = 0;
    assert!(store.sweep_interval().is_err());
}

#[test]
fn test_addresses() {
    let server = Settings::default().server;
    assert_eq!(server.http_addr(), "127.0.0.1:3000");
    assert_eq!(server.ws_addr(), "127.0.0.1:8081");
}

#[test]
#[serial]
fn test_missing_file_yields_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let cfg = temp_env::with_vars_unset(
        ["SMS_RELAY_SERVER__PORT", "SMS_RELAY_STORE__RETENTION"],
        || load_config_from(&missing_file(&tmp)),
    )
    .expect("load_config failed");
    assert_eq!(cfg.server.port, 3000);
    assert_eq!(cfg.store.retention, RetentionKind::Ttl);
}

#[test]
#[serial]
fn test_load_config_from_file_overrides_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("relay.toml");
    let toml = r#"
        [server]
        host = "0.0.0.0"
        port = 9000

        [store]
        retention = "capacity"
        max_messages = 50
        capture_diagnostics = true

        [ingest]
        profile = "key_value"
        ack = "json"
    "#;
    fs::write(&path, toml).expect("write config file");

    let cfg = load_config_from(path.to_str().unwrap()).expect("load_config failed");
    assert_eq!(cfg.server.host, "0.0.0.0");
    assert_eq!(cfg.server.port, 9000);
    assert_eq!(cfg.server.ws_port, 8081);
    assert_eq!(cfg.store.retention, RetentionKind::Capacity);
    assert_eq!(cfg.store.max_messages, 50);
    assert!(cfg.store.capture_diagnostics);
    assert_eq!(cfg.ingest.profile, IngestProfile::KeyValue);
    assert_eq!(cfg.ingest.ack, AckMode::Json);
    assert_eq!(
        cfg.store.retention_policy().unwrap(),
        RetentionPolicy::Capacity(50)
    );
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("relay.toml");
    fs::write(&path, "[server]\nport = 9000\n").expect("write config file");

    let cfg = temp_env::with_vars(
        [
            ("SMS_RELAY_SERVER__PORT", Some("9100")),
            ("SMS_RELAY_STORE__TTL_SECS", Some("30")),
            ("SMS_RELAY_SERVER__WS_ENABLED", Some("false")),
        ],
        || load_config_from(path.to_str().unwrap()),
    )
    .expect("load_config failed");

    assert_eq!(cfg.server.port, 9100);
    assert_eq!(cfg.store.ttl_secs, 30);
    assert!(!cfg.server.ws_enabled);
}
