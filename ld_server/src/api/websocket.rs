//! WebSocket relay for game event tags.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws/events?subscriber=<id>`
//! 2. Server opens a hub queue for this connection alone (see [`connection_id`])
//! 3. Every tag the engine publishes is forwarded as a text frame
//! 4. On disconnect the queue is released
//!
//! Several sockets may share one `subscriber` ID; each still sees every tag.
//!
//! Clients are expected to re-read `/api/v1/game/status` when a tag arrives.
//! Anything the client sends is ignored apart from close frames.
//!
//! # Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:3000/ws/events?subscriber=alice');
//! ws.onmessage = (event) => {
//!   // e.g. "claim:bob"
//!   refreshStatus();
//! };
//! ```

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use log::{error, info, warn};
use serde::Deserialize;
use uuid::Uuid;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    subscriber: Option<String>,
}

/// Upgrade HTTP connection to a WebSocket event stream.
pub async fn events_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<EventsQuery>,
    State(state): State<AppState>,
) -> Response {
    let subscriber = query
        .subscriber
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    ws.on_upgrade(move |socket| handle_socket(socket, subscriber, state))
}

/// Hub key for one connection: the client's ID plus a fresh UUID, so two
/// sockets never share (or release) the same queue.
pub fn connection_id(subscriber: &str) -> String {
    format!("{}#{}", subscriber, Uuid::new_v4())
}

/// Forward hub messages until either side goes away, then release.
async fn handle_socket(mut socket: WebSocket, subscriber: String, state: AppState) {
    let connection = connection_id(&subscriber);
    let subscription = match state.engine.subscribe(&connection).await {
        Ok(subscription) => subscription,
        Err(e) => {
            error!("Cannot subscribe {}: {}", connection, e);
            let _ = socket.send(Message::Close(None)).await;
            return;
        }
    };

    let (mut sender, mut receiver) = socket.split();
    info!("Event stream connected: subscriber={}", connection);

    loop {
        tokio::select! {
            event = subscription.recv() => {
                match event {
                    Some(tag) => {
                        if sender.send(Message::Text(tag.into())).await.is_err() {
                            break;
                        }
                    }
                    // Hub shut down
                    None => {
                        let _ = sender.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!("WebSocket error for subscriber {}: {}", connection, e);
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.engine.unsubscribe(&connection).await;
    info!("Event stream disconnected: subscriber={}", connection);
}
