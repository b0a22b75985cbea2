//! Conversion: AssetPriceUpdate + previous record → AssetPrice.

use super::wire::AssetPriceUpdate;
use super::{AssetPrice, ChangeMode, PriceDirection};
use rust_decimal::Decimal;

impl AssetPrice {
    /// Build the stored record for an inbound update, deriving the change
    /// value and movement direction from the previously stored record.
    pub(crate) fn from_update(
        update: AssetPriceUpdate,
        previous: Option<&AssetPrice>,
        mode: ChangeMode,
        generation: u64,
    ) -> Self {
        let previous_price = previous.map(|p| &p.current_price);
        let direction = PriceDirection::between(previous_price, &update.current_price);

        let change = match mode {
            ChangeMode::Percent24h => update.price_change_24h.unwrap_or(Decimal::ZERO),
            ChangeMode::PriceDelta => previous_price
                .map(|prev| update.current_price - *prev)
                .unwrap_or(Decimal::ZERO),
        };

        Self {
            id: update.id,
            name: update.name,
            symbol: update.symbol,
            image: update.image,
            current_price: update.current_price,
            change,
            updated: true,
            direction,
            generation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::AssetId;
    use std::str::FromStr;

    fn update(price: &str, pct: Option<&str>) -> AssetPriceUpdate {
        AssetPriceUpdate {
            id: AssetId::from("bitcoin"),
            name: "Bitcoin".into(),
            symbol: "btc".into(),
            image: "https://img/btc.png".into(),
            current_price: Decimal::from_str(price).unwrap(),
            price_change_24h: pct.map(|p| Decimal::from_str(p).unwrap()),
        }
    }

    #[test]
    fn test_percent_mode_defaults_missing_change_to_zero() {
        let rec = AssetPrice::from_update(update("100", None), None, ChangeMode::Percent24h, 1);
        assert_eq!(rec.change, Decimal::ZERO);
        assert!(rec.updated);
        assert_eq!(rec.direction, PriceDirection::Neutral);
    }

    #[test]
    fn test_percent_mode_uses_feed_value() {
        let prev = AssetPrice::from_update(update("100", None), None, ChangeMode::Percent24h, 1);
        let rec = AssetPrice::from_update(
            update("90", Some("-2.5")),
            Some(&prev),
            ChangeMode::Percent24h,
            2,
        );
        assert_eq!(rec.change, Decimal::from_str("-2.5").unwrap());
        assert_eq!(rec.direction, PriceDirection::Down);
        assert_eq!(rec.generation, 2);
    }

    #[test]
    fn test_delta_mode_against_previous_price() {
        let prev = AssetPrice::from_update(update("100", Some("9")), None, ChangeMode::PriceDelta, 1);
        assert_eq!(prev.change, Decimal::ZERO);

        let rec = AssetPrice::from_update(
            update("112.5", Some("9")),
            Some(&prev),
            ChangeMode::PriceDelta,
            2,
        );
        assert_eq!(rec.change, Decimal::from_str("12.5").unwrap());
        assert_eq!(rec.direction, PriceDirection::Up);
    }
}
