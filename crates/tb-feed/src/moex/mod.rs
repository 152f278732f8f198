//! MOEX ISS board adapter.
//!
//! One request per cycle asks a single board for every ticker at once:
//!
//! ```text
//! GET {base}/iss/engines/{engine}/markets/{market}/boards/{board}/securities.json
//!     ?iss.meta=off&iss.only=securities,marketdata
//!     &marketdata.columns=OPEN,LOW,HIGH,LAST&securities.columns=PREVPRICE
//!     &securities=USD000UTSTOM,CNYRUB_TOM
//! ```
//!
//! The change percent is derived from `PREVPRICE`, see [`json_parser`].

pub mod json_parser;

use std::sync::Arc;

use async_trait::async_trait;
use tb_core::TbError;
use tracing::debug;

use crate::http::JsonFetcher;
use crate::{QuoteBatch, QuoteProvider};

/// Public ISS endpoint.
pub const DEFAULT_BASE_URL: &str = "http://iss.moex.com";

/// Batch quote provider for one MOEX engine/market/board.
pub struct MoexProvider {
    label: String,
    /// Everything up to and including `securities=`.
    url_prefix: String,
    fetcher: Arc<dyn JsonFetcher>,
}

impl MoexProvider {
    pub fn new(
        label: impl Into<String>,
        base_url: &str,
        engine: &str,
        market: &str,
        board: &str,
        fetcher: Arc<dyn JsonFetcher>,
    ) -> Self {
        let url_prefix = format!(
            "{}/iss/engines/{engine}/markets/{market}/boards/{board}/securities.json\
             ?iss.meta=off&iss.only=securities,marketdata\
             &marketdata.columns=OPEN,LOW,HIGH,LAST&securities.columns=PREVPRICE\
             &securities=",
            base_url.trim_end_matches('/'),
        );
        Self {
            label: label.into(),
            url_prefix,
            fetcher,
        }
    }

    /// Currency board (`currency/selt/CETS`).
    pub fn currency(fetcher: Arc<dyn JsonFetcher>) -> Self {
        Self::new("moex_currency", DEFAULT_BASE_URL, "currency", "selt", "CETS", fetcher)
    }

    /// Futures board (`futures/forts/RFUD`).
    pub fn futures(fetcher: Arc<dyn JsonFetcher>) -> Self {
        Self::new("moex_futures", DEFAULT_BASE_URL, "futures", "forts", "RFUD", fetcher)
    }

    /// Full request URL for `tickers`.
    pub fn url_for(&self, tickers: &[String]) -> String {
        let joined = tickers
            .iter()
            .map(|t| urlencoding::encode(t))
            .collect::<Vec<_>>()
            .join(",");
        format!("{}{joined}", self.url_prefix)
    }
}

#[async_trait]
impl QuoteProvider for MoexProvider {
    fn name(&self) -> &str {
        &self.label
    }

    async fn fetch(&self, tickers: &[String]) -> Result<QuoteBatch, TbError> {
        let body = self.fetcher.get_json(&self.url_for(tickers)).await?;
        let batch = json_parser::parse_securities(tickers, &body)?;
        debug!(
            "[{}] {} of {} tickers priced",
            self.label,
            batch.iter().filter(|(_, q)| q.is_some()).count(),
            tickers.len()
        );
        Ok(batch)
    }
}
