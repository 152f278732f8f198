//! Price snapshot for one symbol.

/// Open/low/high/last price and percent change for one symbol at one point
/// in time.
///
/// Fields are private; a `Quote` never changes after construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    open_price: f64,
    low_price: f64,
    high_price: f64,
    last_price: f64,
    change_percent: f64,
}

impl Quote {
    /// Build a quote from a source that reports the change percent directly.
    pub fn new(
        open_price: f64,
        low_price: f64,
        high_price: f64,
        last_price: f64,
        change_percent: f64,
    ) -> Self {
        Self {
            open_price,
            low_price,
            high_price,
            last_price,
            change_percent,
        }
    }

    /// Build a quote deriving the change percent from the previous close.
    ///
    /// Returns `None` when `previous_close` is zero or not finite, since the
    /// percent change is undefined.
    pub fn with_previous_close(
        open_price: f64,
        low_price: f64,
        high_price: f64,
        last_price: f64,
        previous_close: f64,
    ) -> Option<Self> {
        if previous_close == 0.0 || !previous_close.is_finite() {
            return None;
        }
        let change_percent = (last_price - previous_close) * 100.0 / previous_close;
        Some(Self::new(open_price, low_price, high_price, last_price, change_percent))
    }

    #[inline]
    pub fn open_price(&self) -> f64 {
        self.open_price
    }

    #[inline]
    pub fn low_price(&self) -> f64 {
        self.low_price
    }

    #[inline]
    pub fn high_price(&self) -> f64 {
        self.high_price
    }

    #[inline]
    pub fn last_price(&self) -> f64 {
        self.last_price
    }

    #[inline]
    pub fn change_percent(&self) -> f64 {
        self.change_percent
    }

    /// `true` if the price went up since the reference point.
    #[inline]
    pub fn is_up(&self) -> bool {
        self.change_percent > 0.0
    }
}
