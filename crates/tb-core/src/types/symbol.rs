//! Tracked symbols, one per configured ticker, in configuration order.

use crate::config::TickerSpec;

/// One configured (provider, source ticker, display symbol) triple with a
/// fixed position in the result table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedSymbol {
    pub provider_id: String,
    pub source_ticker: String,
    pub display_symbol: String,
    pub position: usize,
}

impl TrackedSymbol {
    /// Assign positions `0..N-1` to the specs in the order given.
    pub fn from_specs(specs: &[TickerSpec]) -> Vec<TrackedSymbol> {
        specs
            .iter()
            .enumerate()
            .map(|(position, spec)| TrackedSymbol {
                provider_id: spec.provider.clone(),
                source_ticker: spec.ticker.clone(),
                display_symbol: spec.symbol.clone(),
                position,
            })
            .collect()
    }
}
