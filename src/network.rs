//! Network endpoint constants and page-relative endpoint resolution.

/// Path of the price feed socket on the serving host.
pub const WS_PATH: &str = "/ws";

/// Host used when the page itself is served from `localhost`.
pub const LOCAL_DEV_HOST: &str = "localhost:8080";

/// Fixed local development endpoint.
pub const LOCAL_WS_URL: &str = "ws://localhost:8080/ws";

/// The parts of the page location that decide the socket endpoint.
///
/// Mirrors `window.location` so the resolution logic stays testable off the
/// browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    /// Scheme including the trailing colon, e.g. `"https:"`.
    pub protocol: String,
    /// Host name without port, e.g. `"prices.example.com"`.
    pub hostname: String,
    /// Host name with optional port, e.g. `"prices.example.com:8443"`.
    pub host: String,
}

impl PageLocation {
    pub fn new(
        protocol: impl Into<String>,
        hostname: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            protocol: protocol.into(),
            hostname: hostname.into(),
            host: host.into(),
        }
    }
}

/// Resolve the feed endpoint for a page.
///
/// The scheme follows the page (`https:` → `wss:`, anything else → `ws:`).
/// A page served from the literal hostname `localhost` talks to the fixed dev
/// port; every other page talks to its own host.
pub fn resolve_ws_url(location: &PageLocation) -> String {
    let scheme = if location.protocol == "https:" {
        "wss:"
    } else {
        "ws:"
    };
    let host = if location.hostname == "localhost" {
        LOCAL_DEV_HOST
    } else {
        location.host.as_str()
    };
    format!("{}//{}{}", scheme, host, WS_PATH)
}
