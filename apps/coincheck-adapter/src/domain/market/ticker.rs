//! Best bid/ask snapshot.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Top of book for the traded pair.
///
/// `bid <= ask` is the venue's business; the adapter passes values through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    /// Best bid.
    pub bid: Decimal,
    /// Best ask.
    pub ask: Decimal,
}
