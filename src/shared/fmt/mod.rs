//! Display formatting for prices and price changes.

pub mod decimal;
pub mod num;

pub use decimal::{format_change_pct, format_price, format_price_delta};
pub use num::group_thousands;
