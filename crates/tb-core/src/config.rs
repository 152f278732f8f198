//! Configuration parsing for tickerbar.
//!
//! Settings come from the command line, optionally layered over a JSON config
//! file. Both produce an [`AppConfig`]; [`AppConfig::overlay`] merges them and
//! [`AppConfig::validate`] turns the result into [`Settings`], the
//! pre-validated object the polling loop consumes.
//!
//! # Example config
//!
//! ```json
//! {
//!   "tickers": [
//!     "moex_currency:USD000UTSTOM:USD",
//!     { "provider": "binance", "ticker": "BTCUSDT", "symbol": "BTC" }
//!   ],
//!   "format": "waybar",
//!   "update_interval_secs": 60,
//!   "request_timeout_secs": 10
//! }
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::TbError;

/// Default polling interval in seconds.
pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 60;

/// Default per-request HTTP timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

// ---------------------------------------------------------------------------
// TickerSpec
// ---------------------------------------------------------------------------

/// One configured ticker: which provider to ask, what to ask it for, and how
/// to label the result.
///
/// The compact form is `provider:ticker:symbol`, e.g. `binance:BTCUSDT:BTC`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawTickerSpec")]
pub struct TickerSpec {
    /// Provider registry key (e.g. `"moex_futures"`).
    pub provider: String,
    /// Ticker as the provider knows it (e.g. `"SiZ4"`).
    pub ticker: String,
    /// Label shown in the status bar.
    pub symbol: String,
}

impl TickerSpec {
    pub fn new(provider: &str, ticker: &str, symbol: &str) -> Result<Self, TbError> {
        let spec = Self {
            provider: provider.trim().to_string(),
            ticker: ticker.trim().to_string(),
            symbol: symbol.trim().to_string(),
        };
        if spec.provider.is_empty() || spec.ticker.is_empty() || spec.symbol.is_empty() {
            return Err(TbError::Config(format!(
                "ticker spec '{provider}:{ticker}:{symbol}' has an empty field"
            )));
        }
        Ok(spec)
    }
}

impl FromStr for TickerSpec {
    type Err = TbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [provider, ticker, symbol] => TickerSpec::new(provider, ticker, symbol),
            _ => Err(TbError::Config(format!(
                "invalid ticker '{s}', expected provider:ticker:symbol"
            ))),
        }
    }
}

impl fmt::Display for TickerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.provider, self.ticker, self.symbol)
    }
}

/// Either form accepted in the JSON config file.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTickerSpec {
    Compact(String),
    Full {
        provider: String,
        ticker: String,
        symbol: String,
    },
}

impl TryFrom<RawTickerSpec> for TickerSpec {
    type Error = TbError;

    fn try_from(raw: RawTickerSpec) -> Result<Self, Self::Error> {
        match raw {
            RawTickerSpec::Compact(s) => s.parse(),
            RawTickerSpec::Full {
                provider,
                ticker,
                symbol,
            } => TickerSpec::new(&provider, &ticker, &symbol),
        }
    }
}

// ---------------------------------------------------------------------------
// OutputFormat
// ---------------------------------------------------------------------------

/// Status-bar protocol written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON object per line (`text`, `tooltip`, `alt`).
    Waybar,
    /// Tab-separated `text` / `tooltipstart` / `tooltip` line protocol.
    Awesome,
}

// ---------------------------------------------------------------------------
// AppConfig / Settings
// ---------------------------------------------------------------------------

/// Unvalidated configuration, as read from a file or assembled from CLI flags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Tickers in display order.
    #[serde(default)]
    pub tickers: Vec<TickerSpec>,

    /// Output protocol.
    pub format: Option<OutputFormat>,

    /// Seconds to sleep between polling cycles (default: 60).
    pub update_interval_secs: Option<u64>,

    /// Per-request HTTP timeout in seconds (default: 10).
    pub request_timeout_secs: Option<u64>,

    /// Default log level when `RUST_LOG` is unset.
    pub log_level: Option<String>,

    /// Directory for daily-rotating log files.
    pub log_dir: Option<String>,
}

impl AppConfig {
    /// Layer `top` over `self`. Fields set in `top` win; a non-empty ticker
    /// list in `top` replaces the whole list.
    pub fn overlay(self, top: AppConfig) -> AppConfig {
        AppConfig {
            tickers: if top.tickers.is_empty() {
                self.tickers
            } else {
                top.tickers
            },
            format: top.format.or(self.format),
            update_interval_secs: top.update_interval_secs.or(self.update_interval_secs),
            request_timeout_secs: top.request_timeout_secs.or(self.request_timeout_secs),
            log_level: top.log_level.or(self.log_level),
            log_dir: top.log_dir.or(self.log_dir),
        }
    }

    pub fn effective_update_interval_secs(&self) -> u64 {
        self.update_interval_secs
            .unwrap_or(DEFAULT_UPDATE_INTERVAL_SECS)
    }

    pub fn effective_request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    /// Check everything the polling loop relies on.
    ///
    /// `known_providers` are the keys of the provider registry.
    pub fn validate(&self, known_providers: &[&str]) -> Result<Settings, TbError> {
        if self.tickers.is_empty() {
            return Err(TbError::Config("at least one ticker is required".into()));
        }
        for spec in &self.tickers {
            if !known_providers.contains(&spec.provider.as_str()) {
                return Err(TbError::Config(format!(
                    "unknown provider '{}' in '{spec}' (known: {})",
                    spec.provider,
                    known_providers.join(", ")
                )));
            }
        }
        let format = self
            .format
            .ok_or_else(|| TbError::Config("output format is required".into()))?;

        let interval = self.effective_update_interval_secs();
        if interval == 0 {
            return Err(TbError::Config("update interval must be at least 1 second".into()));
        }
        let timeout = self.effective_request_timeout_secs();
        if timeout == 0 {
            return Err(TbError::Config("request timeout must be at least 1 second".into()));
        }

        Ok(Settings {
            tickers: self.tickers.clone(),
            format,
            update_interval: Duration::from_secs(interval),
            request_timeout: Duration::from_secs(timeout),
        })
    }
}

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub tickers: Vec<TickerSpec>,
    pub format: OutputFormat,
    pub update_interval: Duration,
    pub request_timeout: Duration,
}

/// Load and parse a JSON config file.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}
