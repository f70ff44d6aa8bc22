//! WebSocket transport
//!
//! A socket-based alternative to the SSE stream. Responsibilities:
//! - Accept TCP/WebSocket connections on a dedicated listener
//! - Create a `Client` for each connection and register it with the
//!   `Broker`, which immediately queues the `init` snapshot
//! - Forward hub events to the socket as `ServerMessage` JSON frames
//! - Translate `ClientMessage` frames (`sync`, `delete`, `clear`) into
//!   broker operations
//!
//! A connection is removed from the broker exactly once, whichever side
//! notices the disconnect first. On shutdown the listener stops accepting
//! and every open socket is sent a close frame.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn;
use tokio_tungstenite::accept_async;
use tracing::{debug, info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::engine::{SharedBroker, lock_broker};
use crate::client::Client;
use crate::transport::message::{ClientMessage, ServerMessage};
use crate::transport::shutdown::{self, ShutdownSignal};
use crate::utils::Result;

pub async fn bind(addr: &str) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "WebSocket channel listening");
    Ok(listener)
}

pub async fn start_websocket_server(listener: TcpListener, broker: SharedBroker, stop: ShutdownSignal) {
    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    debug!(%peer, "socket accepted");
                    spawn(handle_connection(stream, broker.clone(), stop.clone()));
                }
                Err(e) => warn!(error = %e, "failed to accept socket"),
            },
            _ = shutdown::requested(stop.clone()) => {
                info!("WebSocket channel stopped accepting");
                return;
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, broker: SharedBroker, stop: ShutdownSignal) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!(error = %e, "WebSocket handshake error");
            return;
        }
    };
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (client, mut rx) = Client::channel();
    let client_id = client.id.clone();

    lock_broker(&broker).register_client(client, Utc::now());

    let cleanup_called = Arc::new(AtomicBool::new(false));

    let do_cleanup = {
        let broker = broker.clone();
        let client_id = client_id.clone();
        let cleanup_called = cleanup_called.clone();

        move || {
            if !cleanup_called.swap(true, Ordering::SeqCst) {
                lock_broker(&broker).remove_client(&client_id);
            }
        }
    };

    {
        let client_id = client_id.clone();
        let do_cleanup = do_cleanup.clone();
        let stop = stop.clone();

        spawn(async move {
            loop {
                let event = tokio::select! {
                    event = rx.recv() => match event {
                        Some(event) => event,
                        None => break,
                    },
                    _ = shutdown::requested(stop.clone()) => {
                        debug!(client = %client_id, "closing socket on shutdown");
                        break;
                    }
                };
                let text = match serde_json::to_string(&ServerMessage::from(event)) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!(error = %e, "failed to serialize event");
                        continue;
                    }
                };
                if let Err(e) = ws_sender.send(WsMessage::text(text)).await {
                    debug!(client = %client_id, error = %e, "socket send failed");
                    break;
                }
            }

            do_cleanup();
            let _ = ws_sender.close().await;
            debug!(client = %client_id, "send loop closed");
        });
    }

    loop {
        let msg = tokio::select! {
            frame = ws_receiver.next() => match frame {
                Some(Ok(msg)) => msg,
                _ => break,
            },
            _ = shutdown::requested(stop.clone()) => break,
        };
        if !msg.is_text() {
            continue;
        }
        let Ok(text) = msg.to_text() else {
            continue;
        };

        match serde_json::from_str::<ClientMessage>(text) {
            Ok(ClientMessage::Sync) => {
                lock_broker(&broker).send_snapshot(&client_id, Utc::now());
            }
            Ok(ClientMessage::Delete { id }) => {
                lock_broker(&broker).delete(&id);
            }
            Ok(ClientMessage::Clear) => {
                lock_broker(&broker).clear();
            }
            Err(err) => {
                warn!(
                    client = %client_id,
                    error = %err,
                    frame = %text.chars().take(100).collect::<String>(),
                    "invalid client message"
                );
            }
        }
    }

    do_cleanup();
}
