//! # coinboard
//!
//! A live cryptocurrency price grid fed by a reconnecting WebSocket, for both
//! native and WASM targets.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Core** — Asset records, the price board, formatting (always available, WASM-safe)
//! 2. **View** — Filter/sort, grid derivation, markup, status, keyboard shortcuts
//! 3. **WebSocket** — Compile-time dispatch: `tokio-tungstenite` (native) / `web-sys` (WASM)
//! 4. **App** — `Dashboard` controller plus a tokio runner and a DOM binding
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use coinboard::prelude::*;
//!
//! let mut dashboard = Dashboard::builder()
//!     .variant(Variant::Explorer)
//!     .ws_url("ws://localhost:8080/ws")
//!     .build()?;
//!
//! let mut client = WsClient::new(dashboard.config().ws.clone());
//! let shutdown = async {
//!     let _ = tokio::signal::ctrl_c().await;
//! };
//! coinboard::app::native::run(&mut dashboard, &mut client, |d| {
//!     if let Ok(html) = d.render_html() {
//!         println!("{html}");
//!     }
//! }, shutdown).await?;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes and formatting helpers.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, conversions, state.
pub mod domain;

/// Unified error types.
pub mod error;

/// Endpoint constants and URL resolution.
pub mod network;

// ── Layer 2: View ────────────────────────────────────────────────────────────

/// Grid derivation and rendering.
pub mod view;

// ── Layer 3: WebSocket ───────────────────────────────────────────────────────

/// WebSocket client: events, config, reconnect policy.
pub mod ws;

// ── Layer 4: App ─────────────────────────────────────────────────────────────

/// `Dashboard` — the application controller.
pub mod app;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes + formatting
    pub use crate::shared::{format_change_pct, format_price, format_price_delta, AssetId};

    // Domain types
    pub use crate::domain::asset::{
        AssetPrice, AssetPriceUpdate, ChangeMode, ChangeSign, FlashTicket, PriceBoard,
        PriceDirection,
    };

    // Errors
    pub use crate::error::{DashboardError, WsError};

    // Network
    pub use crate::network::{resolve_ws_url, PageLocation, LOCAL_WS_URL};

    // View
    pub use crate::view::{
        build_grid, keymap, render_html, Card, ConnectionStatus, GridView, KeyAction, KeyInput,
        SortKey, ViewState,
    };

    // WebSocket types
    pub use crate::ws::{ReadyState, ReconnectPolicy, WsConfig, WsEvent};
    #[cfg(feature = "ws-native")]
    pub use crate::ws::native::WsClient;
    #[cfg(feature = "ws-wasm")]
    pub use crate::ws::wasm::WsClient as WasmWsClient;

    // App
    pub use crate::app::{Dashboard, DashboardBuilder, DashboardConfig, Variant};
}
