//! Connection status indicator.

use crate::ws::WsEvent;

/// What the status indicator shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionStatus {
    Connected,
    #[default]
    Disconnected,
    ConnectionError,
    FailedToConnect,
}

impl ConnectionStatus {
    pub fn text(&self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Disconnected => "Disconnected",
            ConnectionStatus::ConnectionError => "Connection Error",
            ConnectionStatus::FailedToConnect => "Failed to Connect",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "connected",
            _ => "disconnected",
        }
    }

    /// Full class attribute for the indicator element.
    pub fn class_name(&self) -> String {
        format!("status {}", self.css_class())
    }

    /// Status after a transport event, or `None` if the event leaves it as is.
    pub fn after(event: &WsEvent) -> Option<Self> {
        match event {
            WsEvent::Connected => Some(ConnectionStatus::Connected),
            WsEvent::Disconnected { .. } => Some(ConnectionStatus::Disconnected),
            WsEvent::TransportError(_) => Some(ConnectionStatus::ConnectionError),
            WsEvent::ConnectFailed(_) => Some(ConnectionStatus::FailedToConnect),
            WsEvent::Message(_) | WsEvent::Error(_) => None,
        }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text())
    }
}
