//! Native WebSocket client — `tokio-tungstenite`.
//!
//! - Background tokio task for connection management
//! - Fixed-delay reconnection, forever, on every failure or close
//! - Malformed frames are logged and dropped without touching the connection
//! - Stream-based event delivery to consumer

use std::pin::Pin;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream, Stream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::WsError;
use crate::ws::{decode_frame, ReadyState, WsConfig, WsEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Handshake timeout for a single connection attempt.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

const EVENT_BUFFER: usize = 256;

// ─── Commands from public API to background task ─────────────────────────────

enum Command {
    Disconnect,
}

// ─── Disconnect reasons for reconnection decision ────────────────────────────

enum DisconnectReason {
    UserRequested,
    Closed,
    Error(String),
}

// ─── Background task state ───────────────────────────────────────────────────

struct TaskState {
    config: WsConfig,
    event_tx: mpsc::Sender<WsEvent>,
    cmd_rx: mpsc::Receiver<Command>,
    reconnect_attempts: u32,
    ready_state: Arc<AtomicU16>,
}

impl TaskState {
    fn emit(&self, event: WsEvent) {
        if let Err(mpsc::error::TrySendError::Full(ev)) = self.event_tx.try_send(event) {
            tracing::warn!("Event channel full, dropping {:?}", ev);
        }
    }

    fn set_ready_state(&self, state: ReadyState) {
        self.ready_state.store(state as u16, Ordering::SeqCst);
    }
}

// ─── Public WsClient ─────────────────────────────────────────────────────────

/// Native WebSocket client using `tokio-tungstenite`.
///
/// Uses a background tokio task for connection management.
/// The public API communicates with it via mpsc channels.
pub struct WsClient {
    config: WsConfig,
    cmd_tx: Option<mpsc::Sender<Command>>,
    event_rx: tokio::sync::Mutex<mpsc::Receiver<WsEvent>>,
    event_tx: mpsc::Sender<WsEvent>,
    task_handle: Option<JoinHandle<()>>,
    ready_state: Arc<AtomicU16>,
}

impl WsClient {
    /// Create a new WS client. Does not connect yet.
    pub fn new(config: WsConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        Self {
            config,
            cmd_tx: None,
            event_rx: tokio::sync::Mutex::new(event_rx),
            event_tx,
            task_handle: None,
            ready_state: Arc::new(AtomicU16::new(ReadyState::Closed as u16)),
        }
    }

    pub fn config(&self) -> &WsConfig {
        &self.config
    }

    /// Connect to the feed.
    ///
    /// Spawns a background tokio task that owns the socket and keeps
    /// reconnecting after the configured fixed delay until `disconnect()`.
    /// Fails when called outside a tokio runtime.
    pub async fn connect(&mut self) -> Result<(), WsError> {
        if self.cmd_tx.is_some() {
            return Ok(());
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        self.cmd_tx = Some(cmd_tx);
        self.ready_state
            .store(ReadyState::Connecting as u16, Ordering::SeqCst);

        let state = TaskState {
            config: self.config.clone(),
            event_tx: self.event_tx.clone(),
            cmd_rx,
            reconnect_attempts: 0,
            ready_state: Arc::clone(&self.ready_state),
        };

        let handle = runtime.spawn(run_task(state));
        self.task_handle = Some(handle);

        Ok(())
    }

    /// Stop the background task, closing the socket gracefully if open.
    ///
    /// Returns `TaskFailed` if the task panicked. A task that does not stop
    /// within the shutdown timeout is aborted.
    pub async fn disconnect(&mut self) -> Result<(), WsError> {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(Command::Disconnect).await;
        }

        let result = match self.task_handle.take() {
            Some(mut handle) => match tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut handle).await {
                Ok(Err(e)) if e.is_panic() => Err(WsError::TaskFailed(e.to_string())),
                Ok(_) => Ok(()),
                Err(_) => {
                    tracing::warn!("Connection task did not stop in time, aborting");
                    handle.abort();
                    Ok(())
                }
            },
            None => Ok(()),
        };

        self.ready_state
            .store(ReadyState::Closed as u16, Ordering::SeqCst);
        result
    }

    /// Whether the WebSocket is currently open.
    pub fn is_connected(&self) -> bool {
        self.ready_state() == ReadyState::Open
    }

    /// Current connection state.
    pub fn ready_state(&self) -> ReadyState {
        ReadyState::from(self.ready_state.load(Ordering::SeqCst))
    }

    /// Wait for the next event.
    pub async fn next_event(&self) -> Option<WsEvent> {
        self.event_rx.lock().await.recv().await
    }

    /// Get a stream of events from the WebSocket connection.
    ///
    /// The returned stream borrows `self`, so it must be dropped
    /// before calling `disconnect()`.
    pub fn events(&self) -> Pin<Box<dyn Stream<Item = WsEvent> + Send + '_>> {
        Box::pin(futures_util::stream::unfold(self, |client| async move {
            client.next_event().await.map(|event| (event, client))
        }))
    }
}

impl Drop for WsClient {
    fn drop(&mut self) {
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
    }
}

// ─── Background task ─────────────────────────────────────────────────────────

async fn run_task(mut state: TaskState) {
    loop {
        // ── 1. Attempt connection ────────────────────────────────────────
        state.set_ready_state(ReadyState::Connecting);
        tracing::info!(url = %state.config.url, "Connecting to price feed");

        let attempt = tokio::select! {
            res = attempt_connect(&state.config.url) => Some(res),
            _ = state.cmd_rx.recv() => None,
        };

        match attempt {
            None => {
                state.set_ready_state(ReadyState::Closed);
                return;
            }
            Some(Err(e)) => {
                tracing::error!("WebSocket connection failed: {}", e);
                state.set_ready_state(ReadyState::Closed);
                state.emit(WsEvent::ConnectFailed(e));
            }
            Some(Ok((sink, stream))) => {
                // ── 2. Connected ─────────────────────────────────────────
                state.reconnect_attempts = 0;
                state.set_ready_state(ReadyState::Open);
                tracing::info!("WebSocket opened");
                state.emit(WsEvent::Connected);

                // ── 3. Read until the connection breaks ──────────────────
                let reason = run_connected(&mut state, sink, stream).await;
                state.set_ready_state(ReadyState::Closed);

                match reason {
                    DisconnectReason::UserRequested => return,
                    DisconnectReason::Closed => {}
                    DisconnectReason::Error(e) => {
                        tracing::warn!("Connection dropped: {}", e);
                    }
                }
            }
        }

        // ── 4. Fixed-delay reconnect ─────────────────────────────────────
        if !state.config.reconnect {
            tracing::info!("Reconnect disabled, stopping");
            return;
        }
        if !reconnect_sleep(&mut state).await {
            return;
        }
    }
}

/// The inner connected loop — runs until the connection breaks.
async fn run_connected(
    state: &mut TaskState,
    mut sink: SplitSink<WsStream, Message>,
    mut stream: SplitStream<WsStream>,
) -> DisconnectReason {
    loop {
        tokio::select! {
            // ── a) Incoming WS message ───────────────────────────────────
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let text_str: &str = text.as_ref();
                        state.emit(decode_frame(text_str));
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = extract_close(frame.as_ref());
                        tracing::info!("WebSocket closed: code={}, reason={}", code, reason);
                        state.emit(WsEvent::Disconnected {
                            code: Some(code),
                            reason,
                        });
                        return DisconnectReason::Closed;
                    }
                    Some(Ok(_)) => {} // Binary, Pong, Frame — ignore
                    Some(Err(e)) => {
                        let reason = e.to_string();
                        tracing::error!("WebSocket error: {}", reason);
                        state.emit(WsEvent::TransportError(reason.clone()));
                        state.emit(WsEvent::Disconnected {
                            code: None,
                            reason: reason.clone(),
                        });
                        return DisconnectReason::Error(reason);
                    }
                    None => {
                        state.emit(WsEvent::Disconnected {
                            code: None,
                            reason: "Stream ended".into(),
                        });
                        return DisconnectReason::Error("Stream ended".into());
                    }
                }
            }

            // ── b) Command from public API ───────────────────────────────
            cmd = state.cmd_rx.recv() => {
                match cmd {
                    Some(Command::Disconnect) | None => {
                        let _ = sink.send(Message::Close(Some(CloseFrame {
                            code: CloseCode::Normal,
                            reason: "Client disconnect".into(),
                        }))).await;
                        return DisconnectReason::UserRequested;
                    }
                }
            }
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Attempt to establish a WebSocket connection with a handshake timeout.
async fn attempt_connect(
    url: &str,
) -> Result<(SplitSink<WsStream, Message>, SplitStream<WsStream>), String> {
    let (ws_stream, _) = tokio::time::timeout(CONNECT_TIMEOUT, connect_async(url))
        .await
        .map_err(|_| "Connection timeout".to_string())?
        .map_err(|e| e.to_string())?;

    Ok(ws_stream.split())
}

/// Extract close code and reason from an optional CloseFrame.
fn extract_close(frame: Option<&CloseFrame>) -> (u16, String) {
    match frame {
        Some(f) => (f.code.into(), f.reason.to_string()),
        None => (1005, "No close frame".into()),
    }
}

// ─── Reconnection ────────────────────────────────────────────────────────────

/// Sleep for the fixed reconnect delay.
///
/// Returns `false` if a disconnect was requested while waiting.
async fn reconnect_sleep(state: &mut TaskState) -> bool {
    state.reconnect_attempts += 1;
    let delay = state
        .config
        .reconnect_policy()
        .delay_for_attempt(state.reconnect_attempts);

    tracing::info!(
        "Reconnect attempt {} in {}ms",
        state.reconnect_attempts,
        delay.as_millis()
    );

    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        _ = state.cmd_rx.recv() => false,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
