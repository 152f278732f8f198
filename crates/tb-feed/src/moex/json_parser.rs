//! MOEX ISS `securities.json` response parsing.
//!
//! The response carries two parallel tables in request order:
//!
//! ```json
//! {
//!   "securities": {"data": [[PREVPRICE], ...]},
//!   "marketdata": {"data": [[OPEN, LOW, HIGH, LAST], ...]}
//! }
//! ```
//!
//! Rows are zipped with the requested tickers up to the shortest of the three.

use tb_core::{Quote, TbError};

use crate::QuoteBatch;
use crate::json_util::{parse_str_f64, table_rows};

/// Zip the two ISS tables with `tickers`.
///
/// Fails only if either table is missing. Per-row problems (no previous
/// price, zero previous price, null prices) give `None` for that ticker, and
/// tickers past the end of the shorter table come back as `None` too.
pub fn parse_securities(tickers: &[String], body: &serde_json::Value) -> Result<QuoteBatch, TbError> {
    let securities = table_rows(body, "securities")
        .ok_or_else(|| TbError::Parse("missing securities.data".into()))?;
    let marketdata = table_rows(body, "marketdata")
        .ok_or_else(|| TbError::Parse("missing marketdata.data".into()))?;

    let mut rows = securities.iter().zip(marketdata.iter());
    Ok(tickers
        .iter()
        .map(|ticker| {
            let quote = rows.next().and_then(|(sec, md)| parse_row(sec, md));
            (ticker.clone(), quote)
        })
        .collect())
}

fn parse_row(securities_row: &serde_json::Value, marketdata_row: &serde_json::Value) -> Option<Quote> {
    let prev_price = parse_str_f64(securities_row.as_array()?.first())?;
    let md = marketdata_row.as_array()?;
    let open = parse_str_f64(md.first())?;
    let low = parse_str_f64(md.get(1))?;
    let high = parse_str_f64(md.get(2))?;
    let last = parse_str_f64(md.get(3))?;
    Quote::with_previous_close(open, low, high, last, prev_price)
}
