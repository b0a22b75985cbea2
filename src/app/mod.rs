//! Application controller — `Dashboard` plus its config and builder.
//!
//! One `Dashboard` owns the price board, the view inputs, and the connection
//! status. Transports feed it `WsEvent`s; the hosting environment renders
//! whatever [`Dashboard::grid`] returns and hands back each [`FlashTicket`]
//! once the flash window has elapsed.

#[cfg(feature = "ws-native")]
pub mod native;

#[cfg(feature = "ws-wasm")]
pub mod web;

use std::str::FromStr;
use std::time::Duration;

use crate::domain::asset::{AssetPriceUpdate, ChangeMode, FlashTicket, PriceBoard};
use crate::error::DashboardError;
use crate::view::{
    build_grid, keymap, render_html, ConnectionStatus, GridView, KeyAction, KeyInput, SortKey,
    ViewState,
};
use crate::ws::{WsConfig, WsEvent};

// ─── Variant ─────────────────────────────────────────────────────────────────

/// Which dashboard flavour to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Variant {
    /// 24h percentage change, always sorted by name, directional splash.
    #[default]
    Live,
    /// Absolute price delta, with search and sort controls.
    Explorer,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Live => "live",
            Variant::Explorer => "explorer",
        }
    }

    pub fn change_mode(&self) -> ChangeMode {
        match self {
            Variant::Live => ChangeMode::Percent24h,
            Variant::Explorer => ChangeMode::PriceDelta,
        }
    }

    /// Whether cards carry the `price-splash-up|down` class.
    pub fn splash(&self) -> bool {
        matches!(self, Variant::Live)
    }

    /// Whether the search box and sort selector are honoured.
    pub fn interactive(&self) -> bool {
        matches!(self, Variant::Explorer)
    }
}

impl FromStr for Variant {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" | "a" => Ok(Variant::Live),
            "explorer" | "b" => Ok(Variant::Explorer),
            other => Err(DashboardError::Config(format!("unknown variant: {other}"))),
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── DashboardConfig ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub variant: Variant,
    /// How long the `updated` and direction flags stay set after a batch.
    pub flash_duration: Duration,
    pub ws: WsConfig,
}

impl DashboardConfig {
    pub fn live() -> Self {
        Self {
            variant: Variant::Live,
            flash_duration: Duration::from_millis(1_000),
            ws: WsConfig::default(),
        }
    }

    pub fn explorer() -> Self {
        Self {
            variant: Variant::Explorer,
            flash_duration: Duration::from_millis(500),
            ws: WsConfig::default(),
        }
    }

    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Live => Self::live(),
            Variant::Explorer => Self::explorer(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::live()
    }
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

/// Application state for one mounted price grid.
#[derive(Debug, Clone)]
pub struct Dashboard {
    config: DashboardConfig,
    board: PriceBoard,
    view: ViewState,
    status: ConnectionStatus,
}

impl Dashboard {
    pub fn builder() -> DashboardBuilder {
        DashboardBuilder::default()
    }

    pub fn new(config: DashboardConfig) -> Self {
        Self {
            board: PriceBoard::new(config.variant.change_mode()),
            config,
            view: ViewState::default(),
            status: ConnectionStatus::default(),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn variant(&self) -> Variant {
        self.config.variant
    }

    pub fn board(&self) -> &PriceBoard {
        &self.board
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Number of known assets, regardless of the search filter.
    pub fn count(&self) -> usize {
        self.board.len()
    }

    // ── Feed ─────────────────────────────────────────────────────────────

    /// Apply one transport event.
    ///
    /// Returns a ticket when the event carried a batch; schedule
    /// [`Dashboard::expire_flash`] with it after `flash_duration`.
    pub fn handle_event(&mut self, event: WsEvent) -> Option<FlashTicket> {
        if let Some(status) = ConnectionStatus::after(&event) {
            if status != self.status {
                tracing::info!(from = %self.status, to = %status, "Connection status changed");
            }
            self.status = status;
        }

        match event {
            WsEvent::Message(batch) => Some(self.apply_updates(batch)),
            WsEvent::Error(e) => {
                tracing::debug!("Ignoring dropped frame: {}", e);
                None
            }
            _ => None,
        }
    }

    pub fn apply_updates(&mut self, batch: Vec<AssetPriceUpdate>) -> FlashTicket {
        self.board.apply_batch(batch)
    }

    pub fn expire_flash(&mut self, ticket: &FlashTicket) -> usize {
        self.board.expire_flash(ticket)
    }

    // ── View inputs ──────────────────────────────────────────────────────

    /// Set the search term. Returns `false` (and changes nothing) for
    /// variants without a search box.
    pub fn set_search(&mut self, term: impl Into<String>) -> bool {
        if !self.config.variant.interactive() {
            return false;
        }
        self.view.search = term.into();
        true
    }

    /// Set the sort key. Returns `false` for variants without a selector.
    pub fn set_sort(&mut self, sort: SortKey) -> bool {
        if !self.config.variant.interactive() {
            return false;
        }
        self.view.sort = sort;
        true
    }

    /// Resolve a keypress. `ClearSearch` empties the term here; focus and
    /// blur are left to the caller.
    pub fn handle_key(&mut self, input: &KeyInput) -> KeyAction {
        if !self.config.variant.interactive() {
            return KeyAction::None;
        }
        let action = keymap(input);
        if action == KeyAction::ClearSearch {
            self.view.search.clear();
        }
        action
    }

    // ── Rendering ────────────────────────────────────────────────────────

    pub fn grid(&self) -> GridView {
        match self.config.variant {
            Variant::Live => build_grid(&self.board, &ViewState::default(), true),
            Variant::Explorer => build_grid(&self.board, &self.view, false),
        }
    }

    pub fn render_html(&self) -> Result<String, DashboardError> {
        Ok(render_html(&self.grid())?)
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default)]
pub struct DashboardBuilder {
    variant: Variant,
    ws_url: Option<String>,
    reconnect_delay: Option<Duration>,
    flash_duration: Option<Duration>,
    search: Option<String>,
    sort: Option<SortKey>,
}

impl DashboardBuilder {
    pub fn variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub fn ws_url(mut self, url: &str) -> Self {
        self.ws_url = Some(url.to_string());
        self
    }

    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = Some(delay);
        self
    }

    /// Override the variant's flash window.
    pub fn flash_duration(mut self, duration: Duration) -> Self {
        self.flash_duration = Some(duration);
        self
    }

    pub fn search(mut self, term: &str) -> Self {
        self.search = Some(term.to_string());
        self
    }

    pub fn sort(mut self, sort: SortKey) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn build(self) -> Result<Dashboard, DashboardError> {
        let mut config = DashboardConfig::for_variant(self.variant);

        if let Some(url) = self.ws_url {
            if !(url.starts_with("ws://") || url.starts_with("wss://")) {
                return Err(DashboardError::Config(format!(
                    "WebSocket URL must use ws:// or wss://, got {url}"
                )));
            }
            config.ws.url = url;
        }
        if let Some(delay) = self.reconnect_delay {
            config.ws.reconnect_delay_ms = u32::try_from(delay.as_millis()).map_err(|_| {
                DashboardError::Config(format!("reconnect delay too large: {delay:?}"))
            })?;
        }
        if let Some(duration) = self.flash_duration {
            config.flash_duration = duration;
        }

        let mut dashboard = Dashboard::new(config);
        if let Some(term) = self.search {
            dashboard.set_search(term);
        }
        if let Some(sort) = self.sort {
            dashboard.set_sort(sort);
        }
        Ok(dashboard)
    }
}
