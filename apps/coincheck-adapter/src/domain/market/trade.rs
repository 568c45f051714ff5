//! Public trade history records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::TradeId;

/// One executed public trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Venue trade id.
    pub id: TradeId,
    /// Traded amount in the base asset.
    pub amount: Decimal,
    /// Execution time, unix seconds (UTC).
    pub date: i64,
    /// Execution price in the quote currency.
    pub price: Decimal,
}

/// Parameters of a trade history fetch.
///
/// Neither field changes what the venue is asked for: the venue call is
/// always the latest page for the pair, and results are always ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TradeQuery {
    /// Marker of the last trade the caller already has.
    pub since: Option<DateTime<Utc>>,
    /// Requested ordering; accepted but has no effect on the output.
    pub descending: bool,
}

impl TradeQuery {
    /// Fetch the latest page without a marker.
    #[must_use]
    pub const fn latest() -> Self {
        Self {
            since: None,
            descending: false,
        }
    }

    /// Fetch with a `since` marker.
    #[must_use]
    pub const fn since(marker: DateTime<Utc>) -> Self {
        Self {
            since: Some(marker),
            descending: false,
        }
    }

    /// Set the ordering flag.
    #[must_use]
    pub const fn with_descending(mut self, descending: bool) -> Self {
        self.descending = descending;
        self
    }
}
