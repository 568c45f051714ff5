//! Whether a submitted order is still listed by the venue.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of checking an order id against the venue's open-order list.
///
/// `Closed` covers both filled and externally cancelled orders; the open
/// list alone cannot tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderPresence {
    /// Present in the open-order list.
    Open,
    /// Absent from the open-order list.
    Closed,
    /// The open-order list could not be fetched.
    Unknown,
}

impl OrderPresence {
    /// Collapse to the boolean "still open" answer.
    ///
    /// `Unknown` maps to `false`: a failed query reads as "no longer open".
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for OrderPresence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Closed => write!(f, "CLOSED"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}
