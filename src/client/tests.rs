use super::pubsub_client::{Client, SUBSCRIBER_BUFFER};
use crate::broker::event::HubEvent;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

#[test]
fn test_client_new() {
    let (tx, _) = mpsc::channel::<HubEvent>(1);
    let client = Client::new(tx);
    assert!(!client.id.is_empty());
}

#[test]
fn test_client_ids_differ() {
    let (tx, _) = mpsc::channel::<HubEvent>(1);
    let a = Client::new(tx.clone());
    let b = Client::new(tx);
    assert_ne!(a.id, b.id);
}

#[test]
fn test_client_sender_delivers_in_order() {
    let (client, mut rx) = Client::channel();
    client.sender.try_send(HubEvent::Clear).unwrap();
    client
        .sender
        .try_send(HubEvent::Init { messages: vec![] })
        .unwrap();

    assert_eq!(rx.try_recv().unwrap(), HubEvent::Clear);
    assert_eq!(rx.try_recv().unwrap(), HubEvent::Init { messages: vec![] });
}

#[test]
fn test_client_channel_is_bounded() {
    let (client, _rx) = Client::channel();
    for _ in 0..SUBSCRIBER_BUFFER {
        client.sender.try_send(HubEvent::Clear).unwrap();
    }
    assert!(matches!(
        client.sender.try_send(HubEvent::Clear),
        Err(TrySendError::Full(_))
    ));
}
