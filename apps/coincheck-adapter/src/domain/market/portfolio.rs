//! Portfolio balance entry.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Holding of one asset, as reported by the venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioEntry {
    /// Uppercase asset symbol (e.g. `BTC`).
    pub name: String,
    /// Amount held, never negative.
    pub amount: Decimal,
}

impl PortfolioEntry {
    /// Build an entry, upper-casing the raw asset key.
    #[must_use]
    pub fn new(asset: &str, amount: Decimal) -> Self {
        Self {
            name: asset.to_uppercase(),
            amount,
        }
    }
}
