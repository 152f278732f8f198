//! Provider registry: name to adapter mapping, built once at startup.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::QuoteProvider;
use crate::binance::BinanceProvider;
use crate::http::JsonFetcher;
use crate::moex::MoexProvider;

/// Ids of the built-in providers registered by [`ProviderRegistry::standard`],
/// sorted.
pub const STANDARD_PROVIDERS: [&str; 3] = ["binance", "moex_currency", "moex_futures"];

/// Provider ids accepted in ticker specs.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn QuoteProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in providers, all sharing `fetcher`:
    ///
    /// | id              | adapter                         |
    /// |-----------------|---------------------------------|
    /// | `moex_currency` | MOEX `currency/selt/CETS`       |
    /// | `moex_futures`  | MOEX `futures/forts/RFUD`       |
    /// | `binance`       | Binance spot 24h ticker         |
    pub fn standard(fetcher: Arc<dyn JsonFetcher>) -> Self {
        let mut registry = Self::new();
        registry.register("moex_currency", Arc::new(MoexProvider::currency(fetcher.clone())));
        registry.register("moex_futures", Arc::new(MoexProvider::futures(fetcher.clone())));
        registry.register("binance", Arc::new(BinanceProvider::spot(fetcher)));
        registry
    }

    /// Add or replace a provider.
    pub fn register(&mut self, id: impl Into<String>, provider: Arc<dyn QuoteProvider>) {
        self.providers.insert(id.into(), provider);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn QuoteProvider>> {
        self.providers.get(id).cloned()
    }

    /// Registered ids, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }
}
