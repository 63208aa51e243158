//! Realtime subscription over WebSocket.
//!
//! A subscriber receives the full snapshot on connect and again after every
//! change notice. Clients never patch local state themselves; they replace it
//! with whatever the server pushes.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;

use crate::models::Snapshot;
use crate::AppState;

#[derive(Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
enum ServerMessage {
    Snapshot(Snapshot),
}

/// GET /api/subscribe - Upgrade to a snapshot stream.
pub async fn subscribe(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| stream_snapshots(socket, state))
}

async fn stream_snapshots(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    // Subscribe before the first read so nothing slips between them.
    let mut notices = state.feed.subscribe();
    tracing::debug!("Subscriber connected");

    if send_snapshot(&state, &mut sender).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            notice = notices.recv() => match notice {
                Ok(_) | Err(RecvError::Lagged(_)) => {
                    // Collapse a burst of notices into one snapshot.
                    while notices.try_recv().is_ok() {}
                    if send_snapshot(&state, &mut sender).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::debug!("Subscriber disconnected");
}

async fn send_snapshot(
    state: &AppState,
    sender: &mut SplitSink<WebSocket, Message>,
) -> Result<(), axum::Error> {
    let snapshot = match state.repo.get_snapshot().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            // Keep the socket; the next notice retries.
            tracing::warn!("Failed to load snapshot for subscriber: {}", e);
            return Ok(());
        }
    };

    let payload = serde_json::to_string(&ServerMessage::Snapshot(snapshot)).map_err(axum::Error::new)?;
    sender.send(Message::text(payload)).await
}
