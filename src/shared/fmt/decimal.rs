//! Decimal formatting utilities for human-readable display.
//!
//! Prices of one unit or more show cents with thousands grouping. Prices below
//! one keep six fixed decimals so very low-value assets retain precision.

use rust_decimal::prelude::*;

use super::num::group_thousands;

const ROUNDING: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

fn fixed(value: &Decimal, decimals: u32) -> String {
    let rounded = value.round_dp_with_strategy(decimals, ROUNDING);
    format!("{:.prec$}", rounded, prec = decimals as usize)
}

/// Format a price for display (no currency symbol).
pub fn format_price(price: &Decimal) -> String {
    if *price >= Decimal::ONE {
        group_thousands(&fixed(price, 2))
    } else {
        fixed(price, 6)
    }
}

/// Format a 24h percentage change, e.g. `+1.23%`, `-0.50%`, `0.00%`.
pub fn format_change_pct(change: &Decimal) -> String {
    if change.is_zero() {
        return "0.00%".to_string();
    }
    let sign = if change.is_sign_positive() { "+" } else { "" };
    format!("{}{}%", sign, fixed(change, 2))
}

/// Format an absolute price delta, e.g. `+$12.34`, `-$0.000120`, `$0.00`.
pub fn format_price_delta(delta: &Decimal) -> String {
    if delta.is_zero() {
        return "$0.00".to_string();
    }
    let sign = if delta.is_sign_negative() { "-" } else { "+" };
    format!("{}${}", sign, format_price(&delta.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_format_price_sub_unit_six_decimals() {
        assert_eq!(format_price(&dec("0.0001234")), "0.000123");
        assert_eq!(format_price(&dec("0.5")), "0.500000");
        assert_eq!(format_price(&dec("0.9999994")), "0.999999");
        assert_eq!(format_price(&Decimal::ZERO), "0.000000");
    }

    #[test]
    fn test_format_price_grouped_two_decimals() {
        assert_eq!(format_price(&dec("45231.5")), "45,231.50");
        assert_eq!(format_price(&dec("1")), "1.00");
        assert_eq!(format_price(&dec("999.999")), "1,000.00");
        assert_eq!(format_price(&dec("1234567.891")), "1,234,567.89");
    }

    #[test]
    fn test_format_price_rounds_half_away_from_zero() {
        assert_eq!(format_price(&dec("2.345")), "2.35");
        assert_eq!(format_price(&dec("0.0000005")), "0.000001");
    }

    #[test]
    fn test_format_change_pct() {
        assert_eq!(format_change_pct(&dec("1.234")), "+1.23%");
        assert_eq!(format_change_pct(&dec("-0.5")), "-0.50%");
        assert_eq!(format_change_pct(&Decimal::ZERO), "0.00%");
        assert_eq!(format_change_pct(&dec("12")), "+12.00%");
    }

    #[test]
    fn test_format_price_delta() {
        assert_eq!(format_price_delta(&dec("12.345")), "+$12.35");
        assert_eq!(format_price_delta(&dec("-0.00012")), "-$0.000120");
        assert_eq!(format_price_delta(&dec("-1500")), "-$1,500.00");
        assert_eq!(format_price_delta(&Decimal::ZERO), "$0.00");
    }
}
