//! # tickerbar
//!
//! Polls market data providers and prints a status-bar widget line per cycle.
//!
//! # Usage
//!
//! ```bash
//! tickerbar --format waybar \
//!     --ticker moex_currency:USD000UTSTOM:USD \
//!     --ticker moex_futures:SiZ4:Si \
//!     --ticker binance:BTCUSDT:BTC \
//!     --update-interval 60
//! ```
//!
//! Logs go to stderr (and optionally `--log-dir`); stdout carries only the
//! status-bar protocol.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tb_core::config::{AppConfig, OutputFormat, TickerSpec};
use tb_feed::aggregator::{self, Aggregator};
use tb_feed::clock::TokioClock;
use tb_feed::http::ReqwestFetcher;
use tb_feed::output::WriterSink;
use tb_feed::registry::{ProviderRegistry, STANDARD_PROVIDERS};
use tracing::info;

/// Market quotes for waybar / awesome status bars.
#[derive(Parser)]
#[command(name = "tickerbar", about = "Market quotes for waybar / awesome status bars")]
struct Cli {
    /// Ticker as provider:ticker:symbol (repeatable, display order).
    #[arg(long = "ticker", value_name = "PROVIDER:TICKER:SYMBOL")]
    tickers: Vec<TickerSpec>,

    /// Output format.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Seconds between updates [default: 60].
    #[arg(long, value_name = "SECS")]
    update_interval: Option<u64>,

    /// Per-request HTTP timeout in seconds [default: 10].
    #[arg(long, value_name = "SECS")]
    request_timeout: Option<u64>,

    /// JSON config file; command-line flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Optional log directory for file output.
    #[arg(long)]
    log_dir: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<AppConfig> {
        let base = match &self.config {
            Some(path) => tb_core::config::load_config(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => AppConfig::default(),
        };
        Ok(base.overlay(AppConfig {
            tickers: self.tickers,
            format: self.format,
            update_interval_secs: self.update_interval,
            request_timeout_secs: self.request_timeout,
            log_level: self.log_level,
            log_dir: self.log_dir,
        }))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Cli::parse().into_config()?;

    // 1. Initialize logging
    let log_level = config.log_level.clone().unwrap_or_else(|| "info".to_string());
    tb_core::logging::init_logging(&log_level, config.log_dir.as_deref(), "tickerbar");

    // 2. Validation, then providers built from the validated settings
    let settings = config.validate(&STANDARD_PROVIDERS)?;
    let fetcher = Arc::new(ReqwestFetcher::new(settings.request_timeout)?);
    let registry = ProviderRegistry::standard(fetcher);

    info!(
        "tickerbar starting: {} ticker(s), format={:?}, interval={}s, timeout={}s",
        settings.tickers.len(),
        settings.format,
        settings.update_interval.as_secs(),
        settings.request_timeout.as_secs(),
    );

    // 3. Poll forever
    let aggregator = Aggregator::from_specs(&settings.tickers, &registry)?;
    let mut sink = WriterSink::new(settings.format, std::io::stdout());
    aggregator::run(
        aggregator,
        settings.update_interval,
        Arc::new(TokioClock),
        &mut sink,
        None,
    )
    .await?;

    info!("poll loop ended");
    Ok(())
}
