use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use super::*;
use crate::ingest::decompose;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn new_record(message: &str) -> NewRecord {
    NewRecord {
        raw_message: message.to_string(),
        fields: decompose(message),
        diagnostics: None,
    }
}

fn ttl_store(secs: u64) -> MessageStore {
    MessageStore::new(RetentionPolicy::Ttl(Duration::from_secs(secs)))
}

#[test]
fn test_insert_then_list_puts_newest_first() {
    let mut store = ttl_store(60);
    let first = store.insert(new_record("a"), t0()).record;
    let second = store.insert(new_record("b"), t0()).record;

    let listed = store.list_all(t0());
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);
}

#[test]
fn test_list_is_reverse_insertion_order() {
    let mut store = MessageStore::new(RetentionPolicy::Capacity(100));
    let ids: Vec<_> = (0..10)
        .map(|i| store.insert(new_record(&format!("m{i}")), t0()).record.id)
        .collect();

    let listed: Vec<_> = store.list_all(t0()).into_iter().map(|r| r.id).collect();
    let mut expected = ids.clone();
    expected.reverse();
    assert_eq!(listed, expected);
}

#[test]
fn test_ids_are_unique() {
    let mut store = MessageStore::new(RetentionPolicy::Capacity(1000));
    let mut ids: Vec<_> = (0..500)
        .map(|_| store.insert(NewRecord::default(), t0()).record.id)
        .collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 500);
}

#[test]
fn test_insert_empty_fields_succeeds() {
    let mut store = ttl_store(60);
    let inserted = store.insert(NewRecord::default(), t0());
    assert_eq!(inserted.record.fields, Default::default());
    assert_eq!(store.len(), 1);
}

#[test]
fn test_ttl_stamps_expiry() {
    let mut store = ttl_store(30);
    let record = store.insert(new_record("x"), t0()).record;
    assert_eq!(record.received_at, t0());
    assert_eq!(record.expires_at, Some(t0() + TimeDelta::seconds(30)));
}

#[test]
fn test_capacity_has_no_expiry_and_evicts_oldest() {
    let mut store = MessageStore::new(RetentionPolicy::Capacity(3));
    let ids: Vec<_> = (0..3)
        .map(|i| store.insert(new_record(&format!("m{i}")), t0()).record.id)
        .collect();

    let fourth = store.insert(new_record("m3"), t0());
    assert_eq!(fourth.record.expires_at, None);
    assert_eq!(fourth.evicted, vec![ids[0].clone()]);
    assert_eq!(store.len(), 3);
    assert!(store.get(&ids[0]).is_none());
    assert!(store.get(&ids[1]).is_some());
}

#[test]
fn test_delete_by_id_is_idempotent() {
    let mut store = ttl_store(60);
    let id = store.insert(new_record("a"), t0()).record.id;
    let other = store.insert(new_record("b"), t0()).record.id;

    assert!(store.delete_by_id(&id));
    assert!(!store.delete_by_id(&id));
    assert_eq!(store.len(), 1);
    assert!(store.get(&other).is_some());
}

#[test]
fn test_delete_unknown_id() {
    let mut store = ttl_store(60);
    assert!(!store.delete_by_id("missing"));
}

#[test]
fn test_delete_all() {
    let mut store = ttl_store(60);
    store.insert(new_record("a"), t0());
    store.insert(new_record("b"), t0());
    assert_eq!(store.delete_all(), 2);
    assert!(store.is_empty());
    assert_eq!(store.delete_all(), 0);
}

#[test]
fn test_expiry_boundary() {
    let mut store = ttl_store(10);
    let id = store.insert(new_record("a"), t0()).record.id;
    let expiry = t0() + TimeDelta::seconds(10);

    let just_before = expiry - TimeDelta::milliseconds(1);
    assert_eq!(store.list_all(just_before).len(), 1);
    assert!(store.remove_expired(just_before).is_empty());

    // expires_at <= now counts as expired
    assert!(store.list_all(expiry).is_empty());
    assert_eq!(store.remove_expired(expiry), vec![id]);
    assert!(store.is_empty());
}

#[test]
fn test_remove_expired_only_takes_old_records() {
    let mut store = ttl_store(10);
    let first = store.insert(new_record("first"), t0()).record.id;
    let backdated = store
        .insert(new_record("backdated"), t0() - TimeDelta::seconds(1))
        .record
        .id;
    let fresh = store
        .insert(new_record("fresh"), t0() + TimeDelta::seconds(8))
        .record
        .id;

    let removed = store.remove_expired(t0() + TimeDelta::seconds(11));
    // insertion order, oldest first
    assert_eq!(removed, vec![first, backdated]);
    assert_eq!(store.list_all(t0() + TimeDelta::seconds(11))[0].id, fresh);
}

#[test]
fn test_capacity_store_never_expires() {
    let mut store = MessageStore::new(RetentionPolicy::Capacity(5));
    store.insert(new_record("a"), t0());
    let far_future = t0() + TimeDelta::days(365);
    assert!(store.remove_expired(far_future).is_empty());
    assert_eq!(store.list_all(far_future).len(), 1);
}

#[test]
fn test_record_serializes_camel_case_without_diagnostics() {
    let mut store = ttl_store(60);
    let record = store.insert(new_record("T##F##C##TO##hi"), t0()).record;
    let json = serde_json::to_value(&record).unwrap();

    assert!(json.get("receivedAt").is_some());
    assert!(json.get("expiresAt").is_some());
    assert_eq!(json["rawMessage"], "T##F##C##TO##hi");
    assert_eq!(json["fields"]["text"], "hi");
    assert!(json.get("headers").is_none());
    assert!(json.get("rawBody").is_none());
}

#[test]
fn test_record_serializes_diagnostics_when_present() {
    let mut store = ttl_store(60);
    let mut headers = std::collections::BTreeMap::new();
    headers.insert("user-agent".to_string(), "okhttp".to_string());
    let record = store
        .insert(
            NewRecord {
                diagnostics: Some(Diagnostics {
                    headers,
                    raw_body: "message=x".into(),
                    parsed_body: serde_json::json!({ "message": "x" }),
                }),
                ..new_record("x")
            },
            t0(),
        )
        .record;

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["headers"]["user-agent"], "okhttp");
    assert_eq!(json["rawBody"], "message=x");
    assert_eq!(json["parsedBody"]["message"], "x");
}
