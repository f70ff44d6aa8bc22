//! HTTP surface: webhook ingestion, the pull API and the SSE push stream.
//!
//! `/sms` answers 200 for every request that reaches it. Whatever the body
//! looks like, ingestion stores what it could determine and acknowledges.
//! Bodies longer than `ingest.max_body_bytes` are cut at the limit rather
//! than rejected.

use std::collections::BTreeMap;
use std::convert::Infallible;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, header};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use futures::future;
use futures::stream::{self, Stream, StreamExt};
use http_body_util::BodyExt;
use serde::Serialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::broker::engine::{ClientGuard, SharedBroker, lock_broker};
use crate::broker::event::HubEvent;
use crate::client::Client;
use crate::config::{AckMode, IngestSettings, Settings};
use crate::ingest::{self, InboundPayload};
use crate::store::{Diagnostics, MessageRecord, NewRecord};
use crate::transport::shutdown::{self, ShutdownSignal};

/// Path used by older forwarder builds.
pub const LEGACY_SMS_PATH: &str = "/android-sms/android-sms.php";

/// Body the forwarder app looks for to mark an upload as delivered.
pub const ACK_TOKEN: &str = "successful";

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub broker: SharedBroker,
    pub ingest: IngestSettings,
    pub capture_diagnostics: bool,
    pub shutdown: ShutdownSignal,
}

impl AppState {
    pub fn new(broker: SharedBroker, settings: &Settings) -> Self {
        Self {
            broker,
            ingest: settings.ingest.clone(),
            capture_diagnostics: settings.store.capture_diagnostics,
            shutdown: shutdown::never(),
        }
    }

    /// Ends open event streams once `signal` fires.
    pub fn with_shutdown(mut self, signal: ShutdownSignal) -> Self {
        self.shutdown = signal;
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/sms", post(receive_sms))
        .route(LEGACY_SMS_PATH, post(receive_sms))
        .route("/api/messages", get(list_messages).delete(clear_messages))
        .route("/api/messages/{id}", delete(delete_message))
        .route("/events", get(events))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IngestAck {
    success: bool,
    id: String,
    expires_at: Option<DateTime<Utc>>,
}

async fn receive_sms(State(state): State<AppState>, headers: HeaderMap, body: Body) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let raw = read_capped(body, state.ingest.max_body_bytes).await;
    let payload = InboundPayload::new(content_type, header_map(&headers), raw);
    let extracted = ingest::extract(state.ingest.profile, &payload);

    if extracted.raw_message.is_empty() {
        debug!(content_type = ?payload.content_type, bytes = payload.raw.len(), "no message in body");
    }

    let diagnostics = state.capture_diagnostics.then(|| Diagnostics {
        headers: payload.headers.clone(),
        raw_body: payload.raw_text(),
        parsed_body: payload.parsed.to_json(),
    });

    let record = lock_broker(&state.broker).ingest(
        NewRecord {
            raw_message: extracted.raw_message,
            fields: extracted.fields,
            diagnostics,
        },
        Utc::now(),
    );

    match state.ingest.ack {
        AckMode::Text => ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], ACK_TOKEN).into_response(),
        AckMode::Json => Json(IngestAck {
            success: true,
            id: record.id,
            expires_at: record.expires_at,
        })
        .into_response(),
    }
}

/// Reads at most `limit` bytes of `body`. Anything past the limit, and any
/// read error, ends the read with what was collected so far.
async fn read_capped(mut body: Body, limit: usize) -> Vec<u8> {
    let mut buf = Vec::new();
    while let Some(frame) = body.frame().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, bytes = buf.len(), "request body read failed");
                break;
            }
        };
        let Ok(data) = frame.into_data() else {
            continue;
        };
        let room = limit - buf.len();
        if data.len() > room {
            buf.extend_from_slice(&data[..room]);
            warn!(limit, "request body over limit, truncated");
            break;
        }
        buf.extend_from_slice(&data);
    }
    buf
}

fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        map.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    map
}

async fn list_messages(State(state): State<AppState>) -> Json<Vec<MessageRecord>> {
    Json(lock_broker(&state.broker).snapshot(Utc::now()))
}

async fn clear_messages(State(state): State<AppState>) -> impl IntoResponse {
    lock_broker(&state.broker).clear();
    Json(json!({ "ok": true }))
}

async fn delete_message(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    lock_broker(&state.broker).delete(&id);
    Json(json!({ "success": true }))
}

/// `GET /events`: an `init` snapshot, then `new`/`delete`/`clear` events
/// until the client goes away or the server shuts down.
async fn events(State(state): State<AppState>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (client, rx) = Client::channel();
    let guard = ClientGuard::new(state.broker.clone(), client.id.clone());
    lock_broker(&state.broker).register_client(client, Utc::now());

    // the guard lives as long as the stream and unregisters on drop
    let stream = stream::unfold((rx, guard), |(mut rx, guard)| async move {
        rx.recv().await.map(|event| (event, (rx, guard)))
    })
    .take_until(shutdown::requested(state.shutdown.clone()))
    .filter_map(|event| future::ready(sse_event(&event)))
    .map(Ok::<_, Infallible>);

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn sse_event(event: &HubEvent) -> Option<Event> {
    match serde_json::to_string(event) {
        Ok(data) => Some(Event::default().event(event.name()).data(data)),
        Err(e) => {
            warn!(error = %e, event = event.name(), "failed to serialize event");
            None
        }
    }
}
