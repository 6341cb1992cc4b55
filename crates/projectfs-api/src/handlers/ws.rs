//! WebSocket upgrade handler.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, info, warn};

use projectfs_realtime::message::OutboundMessage;
use projectfs_service::RequestContext;

use crate::extractors::ActingUser;
use crate::state::AppState;

/// Browsers cannot set headers on a WebSocket handshake, so the user id
/// may also come as a query parameter.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsQuery {
    /// Acting user id.
    pub user_id: Option<String>,
}

/// GET /ws
pub async fn ws_upgrade(
    State(state): State<AppState>,
    user: ActingUser,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let ctx = match query.user_id {
        Some(id) => RequestContext::new(id),
        None => user.0,
    };
    ws.on_upgrade(move |socket| handle_ws_connection(state, ctx, socket))
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(state: AppState, ctx: RequestContext, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let connections = state.realtime.connections.clone();

    let (handle, mut outbound_rx) = connections.register(&ctx.user_id);
    let conn_id = handle.id;

    info!(conn_id = %conn_id, user_id = %ctx.user_id, "WebSocket connection established");

    // Outbound forwarder plus keepalive pings
    let ping_every = Duration::from_secs(state.realtime.config.ping_interval_seconds.max(1));
    let outbound_task = tokio::spawn(async move {
        let mut ping = tokio::time::interval(ping_every);
        ping.tick().await;
        loop {
            let msg = tokio::select! {
                next = outbound_rx.recv() => match next {
                    Some(msg) => msg,
                    None => break,
                },
                _ = ping.tick() => OutboundMessage::Ping {
                    timestamp: chrono::Utc::now().timestamp(),
                },
            };
            let text = match serde_json::to_string(&msg) {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "Failed to serialize outbound message");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => {
                connections.handle_inbound(&conn_id, text.as_str()).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    outbound_task.abort();
    connections.unregister(&conn_id);

    info!(conn_id = %conn_id, user_id = %ctx.user_id, "WebSocket connection closed");
}
