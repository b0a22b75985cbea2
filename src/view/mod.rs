//! View layer — filter, sort, and grid derivation over the price board.
//!
//! Everything here is a pure function of the board and the view state, so the
//! same grid can be written into a DOM, a file, or a test assertion.

pub mod html;
pub mod keymap;
pub mod status;

use crate::domain::asset::{AssetPrice, ChangeMode, PriceBoard};
use crate::shared::{format_change_pct, format_price, format_price_delta, AssetId};
use std::cmp::Ordering;
use std::str::FromStr;

pub use html::render_html;
pub use keymap::{keymap, KeyAction, KeyInput};
pub use status::ConnectionStatus;

// ─── SortKey ─────────────────────────────────────────────────────────────────

/// Grid ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Name, ascending.
    #[default]
    Name,
    /// Price, highest first.
    Price,
    /// Ticker symbol, ascending.
    Symbol,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Price => "price",
            SortKey::Symbol => "symbol",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "price" => Ok(SortKey::Price),
            "symbol" => Ok(SortKey::Symbol),
            other => Err(format!("Unknown sort key: {}", other)),
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ─── ViewState ───────────────────────────────────────────────────────────────

/// User-controlled view inputs: the search box and the sort selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub search: String,
    pub sort: SortKey,
}

impl ViewState {
    pub fn new(search: impl Into<String>, sort: SortKey) -> Self {
        Self {
            search: search.into(),
            sort,
        }
    }

    /// The search term as matched: trimmed and lower-cased.
    pub fn needle(&self) -> String {
        self.search.trim().to_lowercase()
    }
}

/// Case-insensitive substring match on name, symbol, or id.
///
/// An empty needle matches everything.
pub fn matches_search(record: &AssetPrice, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    record.name.to_lowercase().contains(needle)
        || record.symbol.to_lowercase().contains(needle)
        || record.id.as_str().to_lowercase().contains(needle)
}

/// Locale-style string ordering: case-insensitive first, raw text as tie-break.
fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn compare(a: &AssetPrice, b: &AssetPrice, key: SortKey) -> Ordering {
    let primary = match key {
        SortKey::Name => collate(&a.name, &b.name),
        SortKey::Symbol => collate(&a.symbol, &b.symbol),
        SortKey::Price => b.current_price.cmp(&a.current_price),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

/// Filter the board by the view's search term and order it by its sort key.
pub fn select<'a>(board: &'a PriceBoard, view: &ViewState) -> Vec<&'a AssetPrice> {
    let needle = view.needle();
    let mut rows: Vec<&AssetPrice> = board
        .records()
        .filter(|r| matches_search(r, &needle))
        .collect();
    rows.sort_by(|a, b| compare(a, b, view.sort));
    rows
}

// ─── Grid ────────────────────────────────────────────────────────────────────

/// One rendered card, with every display string already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: AssetId,
    pub name: String,
    pub symbol: String,
    pub image: String,
    pub price_text: String,
    pub change_text: String,
    pub change_class: &'static str,
    pub updated: bool,
    pub splash_class: Option<&'static str>,
}

impl Card {
    /// Format a record for display.
    ///
    /// `splash` enables the transient directional highlight class.
    pub fn from_record(record: &AssetPrice, mode: ChangeMode, splash: bool) -> Self {
        let change_text = match mode {
            ChangeMode::Percent24h => format_change_pct(&record.change),
            ChangeMode::PriceDelta => format_price_delta(&record.change),
        };
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            symbol: record.symbol.clone(),
            image: record.image.clone(),
            price_text: format!("${}", format_price(&record.current_price)),
            change_text,
            change_class: record.change_sign().css_class(),
            updated: record.updated,
            splash_class: if splash {
                record.direction.splash_class()
            } else {
                None
            },
        }
    }
}

/// The three mutually exclusive grid states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridView {
    /// Nothing has arrived from the feed yet.
    Loading,
    /// The board has records but none match the search term.
    NoResults { term: String },
    /// Cards in display order.
    Cards(Vec<Card>),
}

impl GridView {
    pub fn card_count(&self) -> usize {
        match self {
            GridView::Cards(cards) => cards.len(),
            _ => 0,
        }
    }
}

/// Derive the grid from the board and view state.
pub fn build_grid(board: &PriceBoard, view: &ViewState, splash: bool) -> GridView {
    if board.is_empty() {
        return GridView::Loading;
    }

    let rows = select(board, view);
    if rows.is_empty() {
        return GridView::NoResults {
            term: view.search.trim().to_string(),
        };
    }

    GridView::Cards(
        rows.into_iter()
            .map(|r| Card::from_record(r, board.mode(), splash))
            .collect(),
    )
}
