//! WebSocket layer — events, config, reconnect policy.
//!
//! The actual WS transport is compile-time dispatched:
//! - `ws-native` feature → `tokio-tungstenite` (native.rs)
//! - `ws-wasm` feature → `web-sys::WebSocket` (wasm.rs)
//!
//! Both emit the same `WsEvent`s. The feed is receive-only: the client never
//! sends application messages.

#[cfg(feature = "ws-native")]
pub mod native;

#[cfg(feature = "ws-wasm")]
pub mod wasm;

use crate::domain::asset::AssetPriceUpdate;
use std::time::Duration;

// ─── WsEvent ─────────────────────────────────────────────────────────────────

/// High-level events emitted by the WS client to the consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum WsEvent {
    /// Connection established.
    Connected,
    /// A parsed batch of price records.
    Message(Vec<AssetPriceUpdate>),
    /// Connection lost; a reconnect follows after the fixed delay.
    Disconnected { code: Option<u16>, reason: String },
    /// The transport reported an error on an established socket.
    TransportError(String),
    /// The transport could not be created or the handshake failed.
    ConnectFailed(String),
    /// An inbound frame was dropped because it could not be parsed.
    Error(String),
}

// ─── ReadyState ──────────────────────────────────────────────────────────────

/// Connection state, numbered like the browser's `WebSocket.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ReadyState {
    Connecting = 0,
    Open = 1,
    Closing = 2,
    Closed = 3,
}

impl From<u16> for ReadyState {
    fn from(value: u16) -> Self {
        match value {
            0 => ReadyState::Connecting,
            1 => ReadyState::Open,
            2 => ReadyState::Closing,
            _ => ReadyState::Closed,
        }
    }
}

// ─── Reconnect policy ────────────────────────────────────────────────────────

/// Reconnect timing: the same fixed delay after every failure, forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub delay: Duration,
}

impl ReconnectPolicy {
    pub fn fixed(delay: Duration) -> Self {
        Self { delay }
    }

    /// Delay before reconnect attempt `attempt` (1-based). No backoff, no jitter.
    pub fn delay_for_attempt(&self, _attempt: u32) -> Duration {
        self.delay
    }
}

// ─── WsConfig ────────────────────────────────────────────────────────────────

/// Configuration for the WS client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsConfig {
    pub url: String,
    pub reconnect: bool,
    pub reconnect_delay_ms: u32,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: crate::network::LOCAL_WS_URL.to_string(),
            reconnect: true,
            reconnect_delay_ms: 3_000,
        }
    }
}

impl WsConfig {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::fixed(Duration::from_millis(self.reconnect_delay_ms as u64))
    }
}

/// Turn one inbound text frame into an event.
///
/// A frame that fails to parse becomes `WsEvent::Error` and is otherwise
/// dropped; the connection is unaffected.
pub(crate) fn decode_frame(text: &str) -> WsEvent {
    match crate::domain::asset::wire::parse_batch(text) {
        Ok(batch) => WsEvent::Message(batch),
        Err(e) => {
            tracing::warn!(error = %e, len = text.len(), "Dropping malformed price frame");
            WsEvent::Error(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WsConfig::default();
        assert_eq!(config.url, "ws://localhost:8080/ws");
        assert!(config.reconnect);
        assert_eq!(config.reconnect_delay_ms, 3_000);
    }

    #[test]
    fn test_reconnect_delay_is_fixed() {
        let policy = WsConfig::default().reconnect_policy();
        for attempt in [1, 2, 5, 50, 10_000] {
            assert_eq!(policy.delay_for_attempt(attempt), Duration::from_secs(3));
        }
    }

    #[test]
    fn test_ready_state_from_u16() {
        assert_eq!(ReadyState::from(0), ReadyState::Connecting);
        assert_eq!(ReadyState::from(1), ReadyState::Open);
        assert_eq!(ReadyState::from(2), ReadyState::Closing);
        assert_eq!(ReadyState::from(3), ReadyState::Closed);
        assert_eq!(ReadyState::from(99), ReadyState::Closed);
    }

    #[test]
    fn test_decode_frame_valid() {
        let ev = decode_frame(
            r#"[{"id":"bitcoin","name":"Bitcoin","symbol":"btc","image":"","current_price":1}]"#,
        );
        match ev {
            WsEvent::Message(batch) => assert_eq!(batch.len(), 1),
            other => panic!("expected Message, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_frame_malformed_becomes_error() {
        assert!(matches!(decode_frame("{not json"), WsEvent::Error(_)));
    }
}
