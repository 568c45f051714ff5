//! Tradable currency pair.

use serde::Serialize;
use std::fmt;

/// A base/quote combination such as BTC/JPY.
///
/// The framework describes markets as `(currency, asset)`, i.e. quote first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CurrencyPair {
    /// Quote currency (what prices are denominated in).
    pub currency: &'static str,
    /// Base asset (what amounts are denominated in).
    pub asset: &'static str,
}

impl CurrencyPair {
    /// BTC priced in JPY, the only pair this adapter trades.
    pub const BTC_JPY: Self = Self::new("JPY", "BTC");

    /// Create a pair from its quote currency and base asset.
    #[must_use]
    pub const fn new(currency: &'static str, asset: &'static str) -> Self {
        Self { currency, asset }
    }

    /// Venue symbol, lowercase `asset_currency` (e.g. `btc_jpy`).
    #[must_use]
    pub fn venue_symbol(&self) -> String {
        format!(
            "{}_{}",
            self.asset.to_lowercase(),
            self.currency.to_lowercase()
        )
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.asset, self.currency)
    }
}
