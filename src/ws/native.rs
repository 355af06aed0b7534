//! Native Socket.IO transport over `tokio-tungstenite`.
//!
//! - The first connection is made inline by `connect`, so its outcome is
//!   returned to the caller
//! - A background tokio task then owns the socket: it routes event packets
//!   to topic handlers and keeps the Engine.IO heartbeat
//! - When the socket breaks, the task reconnects with exponential backoff and
//!   jitter, reporting progress as [`LifecycleEvent`]s

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_lock::{Mutex, RwLock};
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::config::{ReconnectConfig, SessionConfig};
use crate::error::WsError;
use crate::ws::engine_io::{socket_url, EnginePacket, Handshake, SocketPacket};
use crate::ws::{LifecycleEvent, PushConnection, PushTransport, TopicHandler};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Handlers = Arc<RwLock<HashMap<String, TopicHandler>>>;

/// Lower bound on the ping period, whatever the server announces.
const MIN_PING_INTERVAL_MS: u64 = 1_000;

const LIFECYCLE_CHANNEL_SIZE: usize = 64;

// ─── Commands from the transport handle to the background task ───────────────

enum Command {
    Disconnect,
}

// ─── Disconnect reasons ──────────────────────────────────────────────────────

#[derive(Debug)]
enum DisconnectReason {
    UserRequested,
    ServerClosed(String),
    PongTimeout,
    Error(String),
}

struct Connection {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
    handshake: Handshake,
}

// ─── Background task state ───────────────────────────────────────────────────

struct TaskState {
    url: String,
    connect_timeout: Duration,
    reconnect: ReconnectConfig,
    handlers: Handlers,
    event_tx: mpsc::Sender<LifecycleEvent>,
    cmd_rx: mpsc::Receiver<Command>,
    reconnect_attempts: u32,
}

impl TaskState {
    fn emit(&self, event: LifecycleEvent) {
        if let Err(e) = self.event_tx.try_send(event) {
            tracing::warn!(error = %e, "lifecycle event dropped");
        }
    }

    fn should_reconnect(&self) -> bool {
        self.reconnect.enabled && self.reconnect_attempts < self.reconnect.max_attempts
    }
}

struct Control {
    cmd_tx: mpsc::Sender<Command>,
    task: JoinHandle<()>,
}

// ─── Public transport ────────────────────────────────────────────────────────

/// Socket.IO push transport. One instance serves one connection at a time;
/// connecting again first shuts the previous connection down.
pub struct SocketIoTransport {
    connect_timeout: Duration,
    reconnect: ReconnectConfig,
    handlers: Handlers,
    control: Mutex<Option<Control>>,
}

impl SocketIoTransport {
    pub fn new(connect_timeout: Duration, reconnect: ReconnectConfig) -> Self {
        Self {
            connect_timeout,
            reconnect,
            handlers: Arc::new(RwLock::new(HashMap::new())),
            control: Mutex::new(None),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.connect_timeout, config.reconnect.clone())
    }
}

#[async_trait]
impl PushTransport for SocketIoTransport {
    async fn connect(&self, host: &str, access_token: &str) -> Result<PushConnection, WsError> {
        let mut control = self.control.lock().await;
        if let Some(previous) = control.take() {
            shutdown(previous).await;
        }

        let url = socket_url(host, access_token);
        let connection = attempt_connect(&url, self.connect_timeout).await?;
        let session_id = connection.handshake.sid.clone();
        tracing::info!(session_id = %session_id, "push stream connected");

        let (event_tx, event_rx) = mpsc::channel(LIFECYCLE_CHANNEL_SIZE);
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let state = TaskState {
            url,
            connect_timeout: self.connect_timeout,
            reconnect: self.reconnect.clone(),
            handlers: Arc::clone(&self.handlers),
            event_tx,
            cmd_rx,
            reconnect_attempts: 0,
        };

        let task = tokio::spawn(run_task(state, connection));
        *control = Some(Control { cmd_tx, task });

        Ok(PushConnection {
            session_id,
            events: event_rx,
        })
    }

    async fn on(&self, topic: &str, handler: TopicHandler) {
        self.handlers.write().await.insert(topic.to_string(), handler);
    }

    async fn off(&self, topic: &str) {
        self.handlers.write().await.remove(topic);
    }

    async fn close(&self) {
        if let Some(control) = self.control.lock().await.take() {
            shutdown(control).await;
        }
        self.handlers.write().await.clear();
    }
}

impl Drop for SocketIoTransport {
    fn drop(&mut self) {
        if let Some(control) = self.control.get_mut().take() {
            control.task.abort();
        }
    }
}

/// Asks the task to close the socket, then waits for it briefly.
async fn shutdown(control: Control) {
    let _ = control.cmd_tx.send(Command::Disconnect).await;
    let mut task = control.task;
    if tokio::time::timeout(Duration::from_secs(5), &mut task)
        .await
        .is_err()
    {
        tracing::warn!("push task did not stop in time, aborting");
        task.abort();
    }
}

// ─── Background task ─────────────────────────────────────────────────────────

async fn run_task(mut state: TaskState, first: Connection) {
    let mut connection = first;
    loop {
        let reason = run_connected(&mut state, connection).await;
        match reason {
            DisconnectReason::UserRequested => return,
            other => tracing::warn!(reason = ?other, "push stream disconnected"),
        }

        match reconnect(&mut state).await {
            Some(next) => connection = next,
            None => return,
        }
    }
}

/// Runs reconnect attempts until one succeeds, the budget is spent, or the
/// transport is closed meanwhile.
async fn reconnect(state: &mut TaskState) -> Option<Connection> {
    state.reconnect_attempts = 0;
    while state.should_reconnect() {
        state.reconnect_attempts += 1;
        state.emit(LifecycleEvent::Reconnecting {
            attempt: state.reconnect_attempts,
        });

        if !backoff_sleep(state).await {
            return None;
        }

        match attempt_connect(&state.url, state.connect_timeout).await {
            Ok(connection) => {
                let session_id = connection.handshake.sid.clone();
                tracing::info!(
                    session_id = %session_id,
                    attempt = state.reconnect_attempts,
                    "push stream reconnected"
                );
                state.emit(LifecycleEvent::Connected { session_id });
                return Some(connection);
            }
            Err(e) => {
                tracing::warn!(attempt = state.reconnect_attempts, error = %e, "reconnect attempt failed");
            }
        }
    }

    tracing::error!(attempts = state.reconnect_attempts, "giving up on push stream");
    state.emit(LifecycleEvent::ReconnectFailed);
    None
}

/// The connected loop: runs until the socket breaks or the transport closes.
async fn run_connected(state: &mut TaskState, connection: Connection) -> DisconnectReason {
    let Connection {
        mut sink,
        mut stream,
        handshake,
    } = connection;

    let ping_dur = Duration::from_millis(handshake.ping_interval.max(MIN_PING_INTERVAL_MS));
    let pong_dur =
        Duration::from_millis(handshake.ping_timeout + state.reconnect.ping_timeout_grace_ms);

    let mut ping_interval = tokio::time::interval(ping_dur);
    ping_interval.reset();

    let mut pong_deadline: Option<tokio::time::Instant> = None;
    let far_future = tokio::time::Instant::now() + Duration::from_secs(86400);
    let pong_sleep = tokio::time::sleep_until(far_future);
    tokio::pin!(pong_sleep);

    loop {
        tokio::select! {
            // ── a) Incoming frame ────────────────────────────────────────
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let text_str: &str = text.as_ref();
                        match EnginePacket::decode(text_str) {
                            Ok(EnginePacket::Pong(_)) => {
                                pong_deadline = None;
                                pong_sleep.as_mut().reset(far_future);
                            }
                            Ok(EnginePacket::Ping(data)) => {
                                let _ = send_packet(&mut sink, &EnginePacket::Pong(data)).await;
                            }
                            Ok(EnginePacket::Message(SocketPacket::Event { topic, payload })) => {
                                deliver(&state.handlers, &topic, &payload).await;
                            }
                            Ok(EnginePacket::Message(SocketPacket::Error(message))) => {
                                tracing::warn!(message = %message, "socket.io error packet");
                            }
                            Ok(EnginePacket::Message(SocketPacket::Disconnect))
                            | Ok(EnginePacket::Close) => {
                                return DisconnectReason::ServerClosed("server disconnect".into());
                            }
                            Ok(_) => {}
                            Err(e) => {
                                tracing::warn!(error = %e, raw = text_str, "undecodable push packet");
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = extract_close(frame.as_ref());
                        return DisconnectReason::ServerClosed(format!("{}: {}", code, reason));
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return DisconnectReason::Error(e.to_string()),
                    None => return DisconnectReason::Error("Stream ended".into()),
                }
            }

            // ── b) Command from the transport handle ─────────────────────
            cmd = state.cmd_rx.recv() => {
                match cmd {
                    Some(Command::Disconnect) | None => {
                        let _ = send_packet(&mut sink, &EnginePacket::Close).await;
                        let _ = sink.send(Message::Close(Some(CloseFrame {
                            code: CloseCode::Normal,
                            reason: "Client disconnect".into(),
                        }))).await;
                        return DisconnectReason::UserRequested;
                    }
                }
            }

            // ── c) Heartbeat ─────────────────────────────────────────────
            _ = ping_interval.tick() => {
                if let Err(e) = send_packet(&mut sink, &EnginePacket::Ping(String::new())).await {
                    tracing::warn!(error = %e, "failed to send ping");
                } else if pong_deadline.is_none() {
                    let deadline = tokio::time::Instant::now() + pong_dur;
                    pong_deadline = Some(deadline);
                    pong_sleep.as_mut().reset(deadline);
                }
            }

            // ── d) Pong timeout ──────────────────────────────────────────
            () = &mut pong_sleep, if pong_deadline.is_some() => {
                tracing::warn!(timeout_ms = pong_dur.as_millis() as u64, "pong timeout");
                let _ = sink.close().await;
                return DisconnectReason::PongTimeout;
            }
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Opens the socket and waits for the Engine.IO handshake, both under `timeout`.
async fn attempt_connect(url: &str, timeout: Duration) -> Result<Connection, WsError> {
    let (ws_stream, _) = tokio::time::timeout(timeout, connect_async(url))
        .await
        .map_err(|_| WsError::ConnectionFailed("Connection timeout".into()))?
        .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

    let (sink, mut stream) = ws_stream.split();
    let handshake = tokio::time::timeout(timeout, read_handshake(&mut stream))
        .await
        .map_err(|_| WsError::ConnectionFailed("Handshake timeout".into()))??;

    Ok(Connection {
        sink,
        stream,
        handshake,
    })
}

async fn read_handshake(stream: &mut SplitStream<WsStream>) -> Result<Handshake, WsError> {
    while let Some(msg) = stream.next().await {
        match msg.map_err(|e| WsError::ConnectionFailed(e.to_string()))? {
            Message::Text(text) => {
                let text_str: &str = text.as_ref();
                if let EnginePacket::Open(handshake) = EnginePacket::decode(text_str)? {
                    return Ok(handshake);
                }
            }
            Message::Close(frame) => {
                let (code, reason) = extract_close(frame.as_ref());
                return Err(WsError::Closed {
                    code: Some(code),
                    reason,
                });
            }
            _ => {}
        }
    }
    Err(WsError::ConnectionFailed("Stream ended before handshake".into()))
}

/// Runs the topic's handler outside the handler-map lock.
async fn deliver(handlers: &Handlers, topic: &str, payload: &Value) {
    let handler = handlers.read().await.get(topic).cloned();
    match handler {
        Some(handler) => handler(payload),
        None => tracing::debug!(topic, "push event for unregistered topic"),
    }
}

async fn send_packet(
    sink: &mut SplitSink<WsStream, Message>,
    packet: &EnginePacket,
) -> Result<(), WsError> {
    sink.send(Message::Text(packet.encode().into()))
        .await
        .map_err(|e| WsError::SendFailed(e.to_string()))
}

fn extract_close(frame: Option<&CloseFrame>) -> (u16, String) {
    match frame {
        Some(f) => (f.code.into(), f.reason.to_string()),
        None => (1006, "No close frame".into()),
    }
}

// ─── Reconnection backoff ────────────────────────────────────────────────────

/// Exponential delay for `attempt` (1-based) plus up to 500ms jitter,
/// capped at `max_delay_ms`.
fn backoff_delay(config: &ReconnectConfig, attempt: u32) -> Duration {
    let exp = attempt.saturating_sub(1).min(10);
    let base = config.base_delay_ms.saturating_mul(1u64 << exp);
    let jitter = rand::random::<u64>() % 500;
    Duration::from_millis(base.saturating_add(jitter).min(config.max_delay_ms))
}

/// Sleeps before the next attempt. Returns `false` if the transport was
/// closed meanwhile.
async fn backoff_sleep(state: &mut TaskState) -> bool {
    let delay = backoff_delay(&state.reconnect, state.reconnect_attempts);
    tracing::info!(
        attempt = state.reconnect_attempts,
        max = state.reconnect.max_attempts,
        delay_ms = delay.as_millis() as u64,
        "reconnecting push stream"
    );

    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        cmd = state.cmd_rx.recv() => match cmd {
            Some(Command::Disconnect) | None => false,
        },
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
