//! Failure policy table.
//!
//! Every gateway operation maps to exactly one way of handling a failed
//! venue call. The mapping lives here, in one `const fn`, instead of being
//! spread over the call sites.
//!
//! | Operation | Policy |
//! |-----------|--------|
//! | `FetchPortfolio` | `Abort` |
//! | `FetchTicker` | `Retry` |
//! | `SubmitOrder` | `Retry` |
//! | `QueryOrder` | `Absorb` |
//! | `CancelOrder` | `Retry` |
//! | `FetchTrades` | `Retry` |

use serde::Serialize;
use std::fmt;

/// How a failed venue call is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailurePolicy {
    /// Re-dispatch the identical invocation after the retry delay.
    Retry,
    /// Escalate to the fatal handler without retrying.
    Abort,
    /// Report a neutral result to the caller without an error.
    Absorb,
}

/// A gateway operation that issues a venue call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Account balances.
    FetchPortfolio,
    /// Best bid/ask.
    FetchTicker,
    /// Limit order creation.
    SubmitOrder,
    /// Open-order membership check.
    QueryOrder,
    /// Order cancellation.
    CancelOrder,
    /// Public trade history.
    FetchTrades,
}

impl Operation {
    /// All operations, in table order.
    pub const ALL: [Self; 6] = [
        Self::FetchPortfolio,
        Self::FetchTicker,
        Self::SubmitOrder,
        Self::QueryOrder,
        Self::CancelOrder,
        Self::FetchTrades,
    ];

    /// The failure policy for this operation.
    #[must_use]
    pub const fn failure_policy(&self) -> FailurePolicy {
        match self {
            Self::FetchPortfolio => FailurePolicy::Abort,
            Self::QueryOrder => FailurePolicy::Absorb,
            Self::FetchTicker | Self::SubmitOrder | Self::CancelOrder | Self::FetchTrades => {
                FailurePolicy::Retry
            }
        }
    }

    /// Stable label for logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FetchPortfolio => "fetch_portfolio",
            Self::FetchTicker => "fetch_ticker",
            Self::SubmitOrder => "submit_order",
            Self::QueryOrder => "query_order",
            Self::CancelOrder => "cancel_order",
            Self::FetchTrades => "fetch_trades",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Operation::FetchPortfolio, FailurePolicy::Abort ; "portfolio aborts")]
    #[test_case(Operation::FetchTicker, FailurePolicy::Retry ; "ticker retries")]
    #[test_case(Operation::SubmitOrder, FailurePolicy::Retry ; "submit retries")]
    #[test_case(Operation::QueryOrder, FailurePolicy::Absorb ; "query absorbs")]
    #[test_case(Operation::CancelOrder, FailurePolicy::Retry ; "cancel retries")]
    #[test_case(Operation::FetchTrades, FailurePolicy::Retry ; "trades retry")]
    fn policy_table(operation: Operation, expected: FailurePolicy) {
        assert_eq!(operation.failure_policy(), expected);
    }

    #[test]
    fn only_portfolio_aborts() {
        let aborting: Vec<_> = Operation::ALL
            .iter()
            .filter(|op| op.failure_policy() == FailurePolicy::Abort)
            .collect();
        assert_eq!(aborting, vec![&Operation::FetchPortfolio]);
    }

    #[test]
    fn labels_are_snake_case() {
        assert_eq!(Operation::QueryOrder.to_string(), "query_order");
        let json = serde_json::to_string(&Operation::FetchTrades).unwrap();
        assert_eq!(json, "\"fetch_trades\"");
    }
}
