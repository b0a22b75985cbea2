//! Tail a price feed and keep the rendered grid up to date.
//!
//! Usage:
//!   cargo run --features native --bin coinboard
//!
//! Environment variables (a `.env` file is loaded if present):
//!   COINBOARD_WS_URL   - feed endpoint (default ws://localhost:8080/ws)
//!   COINBOARD_VARIANT  - `live` or `explorer` (default live)
//!   COINBOARD_SEARCH   - search term, explorer only
//!   COINBOARD_SORT     - `name`, `price` or `symbol`, explorer only
//!   COINBOARD_HTML_OUT - file the grid markup is written to after each render
//!   RUST_LOG           - log filter (default info)

use std::path::PathBuf;
use std::str::FromStr;

use coinboard::app::native::run;
use coinboard::prelude::*;
use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn build_dashboard() -> Result<Dashboard, DashboardError> {
    let variant = match env_var("COINBOARD_VARIANT") {
        Some(v) => Variant::from_str(&v)?,
        None => Variant::Live,
    };

    let mut builder = Dashboard::builder().variant(variant);
    if let Some(url) = env_var("COINBOARD_WS_URL") {
        builder = builder.ws_url(&url);
    }
    if let Some(term) = env_var("COINBOARD_SEARCH") {
        builder = builder.search(&term);
    }
    if let Some(sort) = env_var("COINBOARD_SORT") {
        let key = SortKey::from_str(&sort).map_err(|e| DashboardError::Config(e.to_string()))?;
        builder = builder.sort(key);
    }
    builder.build()
}

/// Write the latest markup whenever it changes. Intermediate renders that
/// arrive while a write is in flight are skipped.
fn spawn_html_writer(path: PathBuf, mut rx: watch::Receiver<String>) {
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let html = rx.borrow_and_update().clone();
            if let Err(e) = tokio::fs::write(&path, html).await {
                tracing::warn!(path = %path.display(), "Failed to write grid: {}", e);
            }
        }
    });
}

/// Render `grid` and hand the markup to the writer. Nothing is sent when
/// rendering fails.
fn publish_html(tx: &watch::Sender<String>, grid: &GridView) -> bool {
    match render_html(grid) {
        Ok(html) => tx.send(html).is_ok(),
        Err(e) => {
            tracing::warn!("Failed to render grid: {}", e);
            false
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), DashboardError> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut dashboard = build_dashboard()?;
    tracing::info!(
        variant = %dashboard.variant(),
        url = %dashboard.config().ws.url,
        "Starting coinboard"
    );

    let html_tx = env_var("COINBOARD_HTML_OUT").map(|path| {
        let (tx, rx) = watch::channel(String::new());
        spawn_html_writer(PathBuf::from(path), rx);
        tx
    });

    let mut client = WsClient::new(dashboard.config().ws.clone());
    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    run(
        &mut dashboard,
        &mut client,
        |d| {
            let grid = d.grid();
            tracing::info!(
                status = %d.status(),
                count = d.count(),
                shown = grid.card_count(),
                "Rendered"
            );
            if let Some(tx) = &html_tx {
                publish_html(tx, &grid);
            }
        },
        shutdown,
    )
    .await?;

    tracing::info!("Stopped");
    Ok(())
}
