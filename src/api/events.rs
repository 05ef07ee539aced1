//! Event log readout and live streaming.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::IntoResponse,
    Json,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;

use crate::api::handler::AppState;
use crate::events::{EventLog, EventRecord};

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// Return only entries with a strictly greater sequence number.
    pub since: Option<u64>,
}

/// GET /events
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Json<Vec<EventRecord>> {
    let records = match query.since {
        Some(sequence) => state.events.since(sequence),
        None => state.events.all(),
    };
    Json(records)
}

/// GET /events/stream
/// WebSocket feed of events as they are appended.
pub async fn stream_events(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_event_stream(socket, state.events.clone()))
}

async fn handle_event_stream(socket: WebSocket, events: Arc<EventLog>) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = events.subscribe();

    let mut send_task = tokio::spawn(async move {
        loop {
            let record = match rx.recv().await {
                Ok(record) => record,
                // A lagged subscriber can catch up via GET /events?since=.
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            };
            let Ok(text) = serde_json::to_string(&record) else {
                continue;
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if let Message::Close(_) = message {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
}
