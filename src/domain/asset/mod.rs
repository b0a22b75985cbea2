//! Asset price domain — price records, movement direction, change sign.

mod convert;
pub mod state;
pub mod wire;

use crate::shared::AssetId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use state::{FlashTicket, PriceBoard};
pub use wire::AssetPriceUpdate;

// ─── PriceDirection ──────────────────────────────────────────────────────────

/// Direction of the most recent price movement for one asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceDirection {
    Up,
    Down,
    #[default]
    Neutral,
}

impl PriceDirection {
    /// Compare a new price against the previously stored one.
    ///
    /// First sight of an asset (no previous price) is neutral.
    pub fn between(previous: Option<&Decimal>, current: &Decimal) -> Self {
        match previous {
            Some(prev) if current > prev => PriceDirection::Up,
            Some(prev) if current < prev => PriceDirection::Down,
            _ => PriceDirection::Neutral,
        }
    }

    /// CSS hook for the transient splash highlight.
    pub fn splash_class(&self) -> Option<&'static str> {
        match self {
            PriceDirection::Up => Some("price-splash-up"),
            PriceDirection::Down => Some("price-splash-down"),
            PriceDirection::Neutral => None,
        }
    }
}

// ─── ChangeMode ──────────────────────────────────────────────────────────────

/// Where the displayed change value comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeMode {
    /// The feed-supplied 24h percentage change (absent → zero).
    #[default]
    Percent24h,
    /// Absolute delta against the previously stored price (first sight → zero).
    PriceDelta,
}

// ─── ChangeSign ──────────────────────────────────────────────────────────────

/// Sign of a change value, used for colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeSign {
    Positive,
    Negative,
    Neutral,
}

impl ChangeSign {
    pub fn of(value: &Decimal) -> Self {
        if value.is_zero() {
            ChangeSign::Neutral
        } else if value.is_sign_positive() {
            ChangeSign::Positive
        } else {
            ChangeSign::Negative
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            ChangeSign::Positive => "positive",
            ChangeSign::Negative => "negative",
            ChangeSign::Neutral => "neutral",
        }
    }
}

// ─── AssetPrice ──────────────────────────────────────────────────────────────

/// Latest known price record for one asset, with its transient UI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetPrice {
    pub id: AssetId,
    pub name: String,
    pub symbol: String,
    /// Icon URL.
    pub image: String,
    pub current_price: Decimal,
    /// 24h percentage or absolute delta, depending on the board's [`ChangeMode`].
    pub change: Decimal,
    /// True from the batch that touched this record until its flash expires.
    pub updated: bool,
    pub direction: PriceDirection,
    /// Touch counter; a flash expiry only applies if this is unchanged.
    pub(crate) generation: u64,
}

impl AssetPrice {
    pub fn change_sign(&self) -> ChangeSign {
        ChangeSign::of(&self.change)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Reset the transient flags to neutral.
    pub fn settle(&mut self) {
        self.updated = false;
        self.direction = PriceDirection::Neutral;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_direction_between() {
        assert_eq!(
            PriceDirection::between(Some(&dec("100")), &dec("101")),
            PriceDirection::Up
        );
        assert_eq!(
            PriceDirection::between(Some(&dec("100")), &dec("99.99")),
            PriceDirection::Down
        );
        assert_eq!(
            PriceDirection::between(Some(&dec("100")), &dec("100.00")),
            PriceDirection::Neutral
        );
        assert_eq!(
            PriceDirection::between(None, &dec("100")),
            PriceDirection::Neutral
        );
    }

    #[test]
    fn test_splash_class() {
        assert_eq!(PriceDirection::Up.splash_class(), Some("price-splash-up"));
        assert_eq!(PriceDirection::Down.splash_class(), Some("price-splash-down"));
        assert_eq!(PriceDirection::Neutral.splash_class(), None);
    }

    #[test]
    fn test_change_sign() {
        assert_eq!(ChangeSign::of(&dec("0.01")), ChangeSign::Positive);
        assert_eq!(ChangeSign::of(&dec("-3")), ChangeSign::Negative);
        assert_eq!(ChangeSign::of(&Decimal::ZERO), ChangeSign::Neutral);
        assert_eq!(ChangeSign::Negative.css_class(), "negative");
    }

    #[test]
    fn test_change_mode_serde() {
        let mode: ChangeMode = serde_json::from_str("\"price_delta\"").unwrap();
        assert_eq!(mode, ChangeMode::PriceDelta);
    }
}
