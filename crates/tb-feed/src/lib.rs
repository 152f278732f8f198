//! # tb-feed
//!
//! Quote polling for tickerbar.
//!
//! ## Architecture
//!
//! ```text
//! ProviderRegistry ──► Aggregator (groups symbols by provider, once)
//!                         │ each cycle
//!                         ├─► QuoteProvider::fetch  (all groups concurrently)
//!                         ├─► merge into ResultTable (position-indexed)
//!                         ├─► render ──► Frame { line, tooltip }
//!                         └─► Clock::sleep(interval)
//! ```
//!
//! - [`http`]: `JsonFetcher` transport + reqwest implementation
//! - [`moex`]: batch adapter for the MOEX ISS board API
//! - [`binance`]: per-symbol concurrent adapter for Binance 24h tickers
//! - [`registry`]: provider name → adapter mapping
//! - [`aggregator`]: polling cycle and merge
//! - [`render`]: summary line and tooltip
//! - [`output`]: waybar / awesome sinks
//! - [`clock`]: sleep + wall-clock abstraction

pub mod aggregator;
pub mod binance;
pub mod clock;
pub mod http;
pub mod json_util;
pub mod moex;
pub mod output;
pub mod registry;
pub mod render;

use async_trait::async_trait;
use tb_core::{Quote, TbError};

/// Per-ticker results of one provider call, in request order.
pub type QuoteBatch = Vec<(String, Option<Quote>)>;

/// Trait implemented by all market data providers.
///
/// `fetch` returns one entry per requested ticker, in request order. A
/// ticker the provider has no data for is `None`, never an error. `Err` means
/// the whole batch failed (transport, status, malformed response) and carries
/// the reason.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable provider name, used in logs.
    fn name(&self) -> &str;

    /// Fetch quotes for `tickers`.
    async fn fetch(&self, tickers: &[String]) -> Result<QuoteBatch, TbError>;
}
