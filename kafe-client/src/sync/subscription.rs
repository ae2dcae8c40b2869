//! Live feed subscription worker
//!
//! ```text
//!  start ─► connect ─► Ready ─► Snapshot frame ─► Change frames ...
//!              ▲                                        │ close / error / heartbeat timeout
//!              └──── backoff (initial × 2, capped) ◄────┘
//! ```
//!
//! Every (re)connect begins with a full snapshot, so nothing missed while
//! disconnected survives into the mirrored state. Envelopes at or below the
//! last applied `seq` are dropped before they reach the stream.

use futures::channel::mpsc as frame_channel;
use futures::{SinkExt, Stream, StreamExt};
use reqwest::Url;
use shared::live::{LiveClientCommand, LiveServerMessage, SubscriptionScope, decode_server_message};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;

use super::{ConnectionStatus, SyncFrame, status_channel};
use crate::http::{endpoint, parse_base};
use crate::{ClientConfig, ClientError, ClientResult};

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// WebSocket URL of a scope's live feed
pub fn live_url(base_url: &str, scope: &SubscriptionScope) -> ClientResult<Url> {
    let base = parse_base(base_url)?;
    let store_id = scope.store_id().to_string();
    let mut url = endpoint(&base, &["api", "stores", &store_id, "live"])?;
    let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
    url.set_scheme(scheme)
        .map_err(|_| ClientError::InvalidUrl(base_url.to_string()))?;
    if let Some(table_no) = scope.table_no() {
        url.query_pairs_mut().append_pair("table_no", table_no);
    }
    Ok(url)
}

struct Worker {
    frames: frame_channel::UnboundedReceiver<SyncFrame>,
    commands: mpsc::UnboundedSender<LiveClientCommand>,
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

/// Handle to a running live feed; a [`Stream`] of [`SyncFrame`]s
pub struct LiveSubscription {
    config: ClientConfig,
    scope: SubscriptionScope,
    url: Url,
    status_tx: Arc<watch::Sender<ConnectionStatus>>,
    status_rx: watch::Receiver<ConnectionStatus>,
    worker: Option<Worker>,
}

impl LiveSubscription {
    /// Spawn the worker (requires a Tokio runtime)
    pub fn start(config: ClientConfig, scope: SubscriptionScope) -> ClientResult<Self> {
        let url = live_url(&config.base_url, &scope)?;
        let (status_tx, status_rx) = status_channel();
        let mut subscription = Self {
            config,
            scope,
            url,
            status_tx: Arc::new(status_tx),
            status_rx,
            worker: None,
        };
        subscription.spawn();
        Ok(subscription)
    }

    pub fn scope(&self) -> &SubscriptionScope {
        &self.scope
    }

    /// Status badge receiver
    pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_rx.clone()
    }

    /// Ask the server for a fresh snapshot; false when no worker runs
    pub fn resync(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|w| w.commands.send(LiveClientCommand::Resync).is_ok())
    }

    /// Drop the current connection and its pending frames, then connect anew
    pub fn restart(&mut self) {
        self.stop();
        self.spawn();
    }

    /// Stop the worker; the stream ends
    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.shutdown.cancel();
            // the worker closes its socket on cancellation
            drop(worker.handle);
        }
        self.status_tx.send_replace(ConnectionStatus::Closed);
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|w| !w.handle.is_finished())
    }

    fn spawn(&mut self) {
        let (frame_tx, frame_rx) = frame_channel::unbounded();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();

        let ctx = WorkerContext {
            url: self.url.to_string(),
            reconnect_initial: self.config.reconnect_initial,
            reconnect_max: self.config.reconnect_max,
            heartbeat_timeout: self.config.heartbeat_timeout,
            frames: frame_tx,
            commands: command_rx,
            status: self.status_tx.clone(),
            shutdown: shutdown.clone(),
        };
        let handle = tokio::spawn(ctx.run());

        self.worker = Some(Worker {
            frames: frame_rx,
            commands: command_tx,
            shutdown,
            handle,
        });
    }
}

impl Stream for LiveSubscription {
    type Item = SyncFrame;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.worker.as_mut() {
            Some(worker) => worker.frames.poll_next_unpin(cx),
            None => Poll::Ready(None),
        }
    }
}

impl Drop for LiveSubscription {
    fn drop(&mut self) {
        if let Some(worker) = &self.worker {
            worker.shutdown.cancel();
        }
    }
}

enum SessionEnd {
    /// Cancelled or nobody reads the frames any more
    Shutdown,
    /// Connection lost; reconnect after backoff
    Disconnected(ConnectionStatus),
}

struct WorkerContext {
    url: String,
    reconnect_initial: Duration,
    reconnect_max: Duration,
    heartbeat_timeout: Duration,
    frames: frame_channel::UnboundedSender<SyncFrame>,
    commands: mpsc::UnboundedReceiver<LiveClientCommand>,
    status: Arc<watch::Sender<ConnectionStatus>>,
    shutdown: CancellationToken,
}

impl WorkerContext {
    /// Status updates stop once cancelled; the handle owns the final state
    fn set_status(&self, status: ConnectionStatus) {
        if !self.shutdown.is_cancelled() {
            self.status.send_replace(status);
        }
    }

    /// Main run loop: connect, run the session, reconnect on failure
    async fn run(mut self) {
        tracing::info!(url = %self.url, "Live subscription started");
        let mut reconnect_delay = self.reconnect_initial;

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }
            self.set_status(ConnectionStatus::Connecting);

            let connected = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                result = connect_async(self.url.as_str()) => result,
            };

            match connected {
                Ok((ws, _)) => {
                    reconnect_delay = self.reconnect_initial;
                    match self.run_session(ws).await {
                        SessionEnd::Shutdown => break,
                        SessionEnd::Disconnected(status) => {
                            self.set_status(status);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        delay_ms = reconnect_delay.as_millis() as u64,
                        "Live feed connection failed: {e}"
                    );
                    self.set_status(ConnectionStatus::Error(e.to_string()));
                }
            }

            // Wait before reconnecting
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(reconnect_delay) => {},
            }
            reconnect_delay = (reconnect_delay * 2).min(self.reconnect_max);
        }

        self.set_status(ConnectionStatus::Closed);
        tracing::info!(url = %self.url, "Live subscription stopped");
    }

    /// Run a single WebSocket session until disconnect or shutdown
    async fn run_session(&mut self, ws: WsStream) -> SessionEnd {
        let (mut sink, mut stream) = ws.split();
        // nothing is forwarded before the first snapshot
        let mut last_seq: Option<u64> = None;
        let mut deadline = Instant::now() + self.heartbeat_timeout;
        let mut commands_open = true;

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    let _ = sink.close().await;
                    return SessionEnd::Shutdown;
                }

                _ = tokio::time::sleep_until(deadline) => {
                    tracing::warn!("Live feed silent past heartbeat timeout");
                    let _ = sink.close().await;
                    return SessionEnd::Disconnected(ConnectionStatus::TimedOut);
                }

                command = self.commands.recv(), if commands_open => {
                    let Some(command) = command else {
                        commands_open = false;
                        continue;
                    };
                    let text = match serde_json::to_string(&command) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::error!("Failed to encode live command: {e}");
                            continue;
                        }
                    };
                    if sink.send(Message::Text(text.into())).await.is_err() {
                        return SessionEnd::Disconnected(ConnectionStatus::Error(
                            "send failed".into(),
                        ));
                    }
                }

                msg = stream.next() => {
                    deadline = Instant::now() + self.heartbeat_timeout;
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            match decode_server_message(&text) {
                                Ok(LiveServerMessage::Ready { snapshot }) => {
                                    tracing::debug!(seq = snapshot.seq, "Live snapshot received");
                                    last_seq = Some(snapshot.seq);
                                    self.set_status(ConnectionStatus::Subscribed);
                                    if self.frames.unbounded_send(SyncFrame::Snapshot(snapshot)).is_err() {
                                        return SessionEnd::Shutdown;
                                    }
                                }
                                Ok(LiveServerMessage::Change { envelope }) => {
                                    match last_seq {
                                        Some(seq) if envelope.seq > seq => {
                                            last_seq = Some(envelope.seq);
                                            if self.frames.unbounded_send(SyncFrame::Change(envelope)).is_err() {
                                                return SessionEnd::Shutdown;
                                            }
                                        }
                                        _ => {
                                            tracing::debug!(seq = envelope.seq, "Stale live change dropped");
                                        }
                                    }
                                }
                                Ok(LiveServerMessage::Error { code, message }) => {
                                    tracing::warn!(%code, "Live feed rejected: {message}");
                                    return SessionEnd::Disconnected(ConnectionStatus::Error(message));
                                }
                                Err(e) => {
                                    tracing::warn!("Ignoring malformed live frame: {e}");
                                }
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if sink.send(Message::Pong(data)).await.is_err() {
                                return SessionEnd::Disconnected(ConnectionStatus::Error(
                                    "send failed".into(),
                                ));
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            tracing::info!("Live feed closed by server");
                            return SessionEnd::Disconnected(ConnectionStatus::Error(
                                "connection closed".into(),
                            ));
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::warn!("Live feed error: {e}");
                            return SessionEnd::Disconnected(ConnectionStatus::Error(e.to_string()));
                        }
                    }
                }
            }
        }
    }
}
