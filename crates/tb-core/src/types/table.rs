//! Fixed-size, position-indexed result table.
//!
//! The table is sized once from the tracked symbols and never resized. Each
//! entry holds the latest quote for its symbol, or `None` when absent.

use super::quote::Quote;
use super::symbol::TrackedSymbol;

/// One row of the [`ResultTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct TableEntry {
    pub symbol: TrackedSymbol,
    pub quote: Option<Quote>,
}

/// Ordered `(TrackedSymbol, Option<Quote>)` rows, indexed by position.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    entries: Vec<TableEntry>,
}

impl ResultTable {
    /// Create an all-absent table.
    ///
    /// Symbols are sorted by position; positions must form `0..N-1`.
    pub fn new(mut symbols: Vec<TrackedSymbol>) -> Self {
        symbols.sort_by_key(|s| s.position);
        debug_assert!(symbols.iter().enumerate().all(|(i, s)| s.position == i));
        Self {
            entries: symbols
                .into_iter()
                .map(|symbol| TableEntry {
                    symbol,
                    quote: None,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&TableEntry> {
        self.entries.get(position)
    }

    /// Overwrite the quote at `position`. Out-of-range positions are ignored
    /// and reported as `false`.
    pub fn set(&mut self, position: usize, quote: Option<Quote>) -> bool {
        match self.entries.get_mut(position) {
            Some(entry) => {
                entry.quote = quote;
                true
            }
            None => false,
        }
    }

    /// Rows in position order.
    pub fn iter(&self) -> std::slice::Iter<'_, TableEntry> {
        self.entries.iter()
    }

    /// Number of rows currently holding a quote.
    pub fn populated(&self) -> usize {
        self.entries.iter().filter(|e| e.quote.is_some()).count()
    }
}

impl<'a> IntoIterator for &'a ResultTable {
    type Item = &'a TableEntry;
    type IntoIter = std::slice::Iter<'a, TableEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
