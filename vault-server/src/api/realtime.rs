//! Realtime change feed
//!
//! `GET /api/realtime/ws?token=` pushes `RealtimeMessage` frames for the
//! caller's own rows. Browsers cannot set headers on WebSocket requests, so
//! the session token may come in the query string.

use axum::{
    Router,
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::get,
};
use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::realtime::RealtimeMessage;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::auth::UserIdentity;
use crate::auth::session::{token_from_headers, verify_token};
use crate::state::AppState;

pub const MAX_SOCKETS_PER_USER: usize = 5;
const PING_INTERVAL: Duration = Duration::from_secs(30);

pub fn router() -> Router<AppState> {
    Router::new().route("/api/realtime/ws", get(realtime_ws))
}

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: Option<String>,
}

/// One open socket counted against its user; released on drop
pub struct SocketSlot {
    counts: Arc<DashMap<Uuid, AtomicUsize>>,
    user_id: Uuid,
}

impl SocketSlot {
    pub fn acquire(counts: &Arc<DashMap<Uuid, AtomicUsize>>, user_id: Uuid) -> Option<Self> {
        let entry = counts.entry(user_id).or_default();
        let previous = entry.fetch_add(1, Ordering::SeqCst);
        if previous >= MAX_SOCKETS_PER_USER {
            entry.fetch_sub(1, Ordering::SeqCst);
            return None;
        }
        drop(entry);
        Some(Self {
            counts: counts.clone(),
            user_id,
        })
    }
}

impl Drop for SocketSlot {
    fn drop(&mut self) {
        if let Some(count) = self.counts.get(&self.user_id) {
            count.fetch_sub(1, Ordering::SeqCst);
        }
        self.counts
            .remove_if(&self.user_id, |_, c| c.load(Ordering::SeqCst) == 0);
    }
}

/// GET /api/realtime/ws
pub async fn realtime_ws(
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    let token = params
        .token
        .filter(|t| !t.is_empty())
        .or_else(|| token_from_headers(&headers))
        .ok_or_else(AppError::not_authenticated)?;
    let identity = verify_token(&token, &state.jwt_secret)?;

    let slot = SocketSlot::acquire(&state.ws_connections, identity.user_id).ok_or_else(|| {
        AppError::with_message(
            ErrorCode::ResourceLimitExceeded,
            format!("At most {MAX_SOCKETS_PER_USER} realtime connections per user"),
        )
    })?;

    Ok(ws
        .on_upgrade(move |socket| handle_socket(socket, state, identity, slot))
        .into_response())
}

fn encode(message: &RealtimeMessage) -> Option<Message> {
    match serde_json::to_string(message) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            tracing::error!("Failed to encode realtime message: {e}");
            None
        }
    }
}

async fn handle_socket(socket: WebSocket, state: AppState, identity: UserIdentity, slot: SocketSlot) {
    let user_id = identity.user_id;
    let mut changes = state.changes.subscribe(user_id);
    let (mut sink, mut stream) = socket.split();

    tracing::info!(%user_id, "Realtime socket connected");

    if let Some(ready) = encode(&RealtimeMessage::Ready)
        && sink.send(ready).await.is_err()
    {
        drop(changes);
        state.changes.release(user_id);
        return;
    }

    let mut ping = tokio::time::interval(PING_INTERVAL);
    ping.tick().await;

    loop {
        tokio::select! {
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(%user_id, "Realtime socket error: {e}");
                        break;
                    }
                    // Client frames carry nothing; pongs and pings are handled by the library
                    Some(Ok(_)) => {}
                }
            }
            event = changes.recv() => {
                let message = match event {
                    Ok(event) => RealtimeMessage::Change { event },
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!(%user_id, missed, "Realtime socket lagged, requesting resync");
                        RealtimeMessage::Resync
                    }
                    Err(RecvError::Closed) => break,
                };
                if let Some(frame) = encode(&message)
                    && sink.send(frame).await.is_err()
                {
                    break;
                }
            }
            _ = ping.tick() => {
                if sink.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }
        }
    }

    drop(changes);
    state.changes.release(user_id);
    drop(slot);
    tracing::info!(%user_id, "Realtime socket closed");
}
