//! Live WebSocket session
//!
//! ```text
//! upgrade ─► subscribe(hub) ─► Ready{snapshot(seq=S)} ─┐
//!                                                      ▼
//!            ┌──────────── select! ─────────────────────────────┐
//!            │ ping tick      → Ping                            │
//!            │ hub event      → seq > S && scope admits → Change │
//!            │   Lagged       → resubscribe + Ready             │
//!            │ client Resync  → Ready                           │
//!            │ Close / error  → end                             │
//!            └──────────────────────────────────────────────────┘
//! ```

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use shared::error::AppError;
use shared::live::{LiveClientCommand, LiveServerMessage, SubscriptionScope, decode_client_command};
use tokio::sync::broadcast;
use tokio::time::Duration;

use crate::api::ScopeQuery;
use crate::core::ServerState;
use crate::live::load_snapshot;
use crate::tables::require_store;

/// GET /api/stores/{store_id}/live?table_no=
pub async fn handle_live_ws(
    State(state): State<ServerState>,
    Path(store_id): Path<i64>,
    Query(query): Query<ScopeQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    // 升级前确认门店存在，未知门店直接返回 404
    require_store(&state.pool, store_id).await?;
    let scope = query.scope(store_id);
    Ok(ws.on_upgrade(move |socket| live_session(socket, state, scope)))
}

async fn live_session(socket: WebSocket, state: ServerState, scope: SubscriptionScope) {
    let (mut sink, mut stream) = socket.split();
    let store_id = scope.store_id();

    tracing::info!(store_id, table_no = ?scope.table_no(), "Live session connected");

    // 先订阅再取快照，快照之后的变更都在 receiver 中
    let mut hub_rx = state.hub.subscribe(store_id);
    let mut last_seq = match send_ready(&mut sink, &state, &scope).await {
        Some(seq) => seq,
        None => return,
    };

    let mut ping_interval =
        tokio::time::interval(Duration::from_secs(state.config.live_ping_interval_secs));
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            event = hub_rx.recv() => {
                match event {
                    Ok(envelope) => {
                        // 已包含在快照中的变更直接跳过
                        if envelope.seq <= last_seq {
                            continue;
                        }
                        last_seq = envelope.seq;
                        if !scope.admits(&envelope.event) {
                            continue;
                        }
                        let msg = LiveServerMessage::Change { envelope };
                        if send_message(&mut sink, &msg).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(store_id, lagged = n, "Live subscriber lagged, resending full snapshot");
                        // 重新订阅以获取从当前位置开始的新 receiver，避免事件间隙
                        hub_rx = state.hub.subscribe(store_id);
                        match send_ready(&mut sink, &state, &scope).await {
                            Some(seq) => last_seq = seq,
                            None => break,
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => match decode_client_command(&text) {
                        Ok(LiveClientCommand::Resync) => {
                            match send_ready(&mut sink, &state, &scope).await {
                                Some(seq) => last_seq = last_seq.max(seq),
                                None => break,
                            }
                        }
                        Err(e) => {
                            tracing::debug!(store_id, error = %e, "Ignoring malformed live command");
                        }
                    },
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    tracing::info!(store_id, table_no = ?scope.table_no(), "Live session disconnected");
}

/// 发送全量快照，返回快照序号；发送失败返回 None
async fn send_ready<S>(sink: &mut S, state: &ServerState, scope: &SubscriptionScope) -> Option<u64>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let msg = match load_snapshot(state, scope).await {
        Ok(snapshot) => {
            let seq = snapshot.seq;
            send_message(sink, &LiveServerMessage::Ready { snapshot })
                .await
                .ok()?;
            return Some(seq);
        }
        Err(e) => {
            tracing::error!(store_id = scope.store_id(), error = %e, "Failed to load live snapshot");
            LiveServerMessage::Error {
                code: e.code,
                message: e.message,
            }
        }
    };
    let _ = send_message(sink, &msg).await;
    None
}

async fn send_message<S>(sink: &mut S, msg: &LiveServerMessage) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(msg).map_err(|_| ())?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
