//! Custom serde helpers for feed wire formats.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a JSON number into a `Decimal`.
///
/// serde_json has already stored a float as an `f64`, so the text parsed here
/// is that float's shortest representation (`0.0001234` stays `0.0001234`).
/// Values that need more than 28 fractional digits are rounded, values below
/// the smallest representable step become zero, and magnitudes beyond
/// `Decimal::MAX` saturate.
fn decimal_from_number(number: &serde_json::Number) -> Result<Decimal, String> {
    let text = number.to_string();
    if let Ok(value) = Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text)) {
        return Ok(value);
    }

    let value = number
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("Invalid decimal {}", text))?;
    let max = Decimal::MAX.to_f64().unwrap_or(f64::MAX);
    if value.abs() >= max {
        tracing::warn!("Saturating out-of-range decimal {}", text);
        return Ok(if value < 0.0 { Decimal::MIN } else { Decimal::MAX });
    }
    if value.abs() < 1e-28 {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_f64(value).ok_or_else(|| format!("Invalid decimal {}", text))
}

/// Deserializes a JSON number (integer or float) into `Decimal`.
///
/// The feed sends prices as bare JSON numbers, not strings.
pub mod decimal_number {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let number = serde_json::Number::deserialize(deserializer)?;
        super::decimal_from_number(&number).map_err(serde::de::Error::custom)
    }
}

/// Like [`decimal_number`], but `null` or a missing field becomes `None`.
///
/// Use together with `#[serde(default)]`.
pub mod decimal_number_opt {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<serde_json::Number>::deserialize(deserializer)? {
            Some(number) => super::decimal_from_number(&number)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
