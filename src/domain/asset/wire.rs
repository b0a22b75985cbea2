//! Wire types for the price feed (WS).

use crate::error::WsError;
use crate::shared::serde_util::{decimal_number, decimal_number_opt};
use crate::shared::AssetId;
use rust_decimal::Decimal;
use serde::Deserialize;

/// One price record as pushed by the feed.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AssetPriceUpdate {
    pub id: AssetId,
    pub name: String,
    pub symbol: String,
    pub image: String,
    #[serde(with = "decimal_number")]
    pub current_price: Decimal,
    #[serde(default, with = "decimal_number_opt")]
    pub price_change_24h: Option<Decimal>,
}

/// Parse one inbound text frame: a JSON array of price records.
///
/// Any frame that is not valid JSON or does not match the record shape is
/// rejected as a whole; the caller decides whether to drop it.
pub fn parse_batch(text: &str) -> Result<Vec<AssetPriceUpdate>, WsError> {
    Ok(serde_json::from_str::<Vec<AssetPriceUpdate>>(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_batch() {
        let raw = r#"[
            {"id":"bitcoin","name":"Bitcoin","symbol":"btc","image":"https://img/btc.png",
             "current_price":64000.5,"price_change_24h":-1.25},
            {"id":"ethereum","name":"Ethereum","symbol":"eth","image":"https://img/eth.png",
             "current_price":3100}
        ]"#;
        let batch = parse_batch(raw).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].id, AssetId::from("bitcoin"));
        assert_eq!(batch[0].current_price, Decimal::from_str("64000.5").unwrap());
        assert_eq!(batch[0].price_change_24h, Some(Decimal::from_str("-1.25").unwrap()));
        assert_eq!(batch[1].price_change_24h, None);
    }

    #[test]
    fn test_parse_batch_ignores_unknown_fields() {
        let raw = r#"[{"id":"a","name":"A","symbol":"a","image":"","current_price":1,
                       "market_cap":123456}]"#;
        assert_eq!(parse_batch(raw).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_batch_empty_array() {
        assert!(parse_batch("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_batch_rejects_non_json() {
        let err = parse_batch("hello").unwrap_err();
        assert!(matches!(err, WsError::DeserializationError(_)));
    }

    #[test]
    fn test_parse_batch_rejects_object_payload() {
        let raw = r#"{"id":"bitcoin","name":"Bitcoin","symbol":"btc","image":"","current_price":1}"#;
        assert!(parse_batch(raw).is_err());
    }

    #[test]
    fn test_parse_batch_rejects_missing_price() {
        let raw = r#"[{"id":"bitcoin","name":"Bitcoin","symbol":"btc","image":""}]"#;
        assert!(parse_batch(raw).is_err());
    }

    #[test]
    fn test_parse_batch_keeps_records_beside_extreme_values() {
        let raw = r#"[
            {"id":"dust","name":"Dust","symbol":"dst","image":"","current_price":1e-30},
            {"id":"moon","name":"Moon","symbol":"mn","image":"","current_price":1e30},
            {"id":"bitcoin","name":"Bitcoin","symbol":"btc","image":"","current_price":64000}
        ]"#;
        let batch = parse_batch(raw).unwrap();
        assert_eq!(batch.len(), 3);
        assert!(batch[0].current_price.is_zero());
        assert_eq!(batch[1].current_price, Decimal::MAX);
        assert_eq!(batch[2].current_price, Decimal::from(64000));
    }
}
