//! Binance `/api/v3/ticker/24hr` payload parsing.
//!
//! # Example
//!
//! ```json
//! {
//!   "symbol": "BTCUSDT",
//!   "priceChangePercent": "-1.234",
//!   "openPrice": "30100.00",
//!   "highPrice": "30500.00",
//!   "lowPrice": "29800.00",
//!   "lastPrice": "29728.55"
//! }
//! ```

use tb_core::Quote;

use crate::json_util::parse_f64_field;

/// Build a [`Quote`] from a 24h ticker object.
///
/// Returns `None` if any of the five fields is missing or not a number.
pub fn parse_ticker_24hr(v: &serde_json::Value) -> Option<Quote> {
    Some(Quote::new(
        parse_f64_field(v, "openPrice")?,
        parse_f64_field(v, "lowPrice")?,
        parse_f64_field(v, "highPrice")?,
        parse_f64_field(v, "lastPrice")?,
        parse_f64_field(v, "priceChangePercent")?,
    ))
}
