//! Binance 24h ticker adapter.
//!
//! Binance has no multi-symbol endpoint that returns the fields we need in one
//! shape, so each ticker gets its own request:
//!
//! ```text
//! GET {base}/api/v3/ticker/24hr?symbol=BTCUSDT
//! ```
//!
//! All requests run concurrently and are joined before `fetch` returns. A
//! failed request only blanks its own ticker.

pub mod json_parser;

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use tb_core::{Quote, TbError};
use tracing::debug;

use crate::http::JsonFetcher;
use crate::{QuoteBatch, QuoteProvider};

/// Public REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Per-symbol concurrent quote provider.
pub struct BinanceProvider {
    label: String,
    base_url: String,
    fetcher: Arc<dyn JsonFetcher>,
}

impl BinanceProvider {
    pub fn new(label: impl Into<String>, base_url: &str, fetcher: Arc<dyn JsonFetcher>) -> Self {
        Self {
            label: label.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            fetcher,
        }
    }

    /// Spot market on the public endpoint.
    pub fn spot(fetcher: Arc<dyn JsonFetcher>) -> Self {
        Self::new("binance", DEFAULT_BASE_URL, fetcher)
    }

    pub fn url_for(&self, ticker: &str) -> String {
        format!(
            "{}/api/v3/ticker/24hr?symbol={}",
            self.base_url,
            urlencoding::encode(ticker)
        )
    }

    async fn fetch_one(&self, ticker: &str) -> Result<Quote, TbError> {
        let body = self.fetcher.get_json(&self.url_for(ticker)).await?;
        json_parser::parse_ticker_24hr(&body)
            .ok_or_else(|| TbError::Parse(format!("incomplete 24hr ticker for {ticker}")))
    }
}

#[async_trait]
impl QuoteProvider for BinanceProvider {
    fn name(&self) -> &str {
        &self.label
    }

    /// Never fails as a whole; per-ticker errors become `None`.
    async fn fetch(&self, tickers: &[String]) -> Result<QuoteBatch, TbError> {
        let results = join_all(tickers.iter().map(|t| self.fetch_one(t))).await;

        Ok(tickers
            .iter()
            .zip(results)
            .map(|(ticker, result)| match result {
                Ok(quote) => (ticker.clone(), Some(quote)),
                Err(e) => {
                    debug!("[{}] {ticker}: {e}", self.label);
                    (ticker.clone(), None)
                }
            })
            .collect())
    }
}
