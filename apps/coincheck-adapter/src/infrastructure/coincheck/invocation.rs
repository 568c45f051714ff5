//! Captured gateway invocations.
//!
//! An `Invocation` is one gateway operation together with its original
//! arguments and the caller's continuation. The variant fixes the
//! operation, so a re-dispatched invocation can only ever re-run the call
//! it was captured from, with the same arguments.

use rust_decimal::Decimal;

use super::translator;
use crate::application::Operation;
use crate::domain::market::{OrderPresence, OrderSide, PortfolioEntry, Ticker, Trade, TradeQuery};
use crate::domain::shared::OrderId;
use crate::error::{GatewayError, TranslationError};

/// Caller-supplied completion, invoked at most once.
pub type Continuation<T> = Box<dyn FnOnce(Result<T, GatewayError>) + Send + 'static>;

/// One gateway operation, its arguments and its continuation.
pub enum Invocation {
    /// Account balances.
    FetchPortfolio {
        /// Completion.
        reply: Continuation<Vec<PortfolioEntry>>,
    },
    /// Best bid/ask.
    FetchTicker {
        /// Completion.
        reply: Continuation<Ticker>,
    },
    /// Limit order on the gateway's pair.
    SubmitOrder {
        /// Buy or sell.
        side: OrderSide,
        /// Amount in the base asset.
        amount: Decimal,
        /// Limit price.
        price: Decimal,
        /// Completion.
        reply: Continuation<OrderId>,
    },
    /// Open-order membership check.
    QueryOrder {
        /// Order to look for.
        order_id: OrderId,
        /// Completion.
        reply: Continuation<OrderPresence>,
    },
    /// Order cancellation.
    CancelOrder {
        /// Order to cancel.
        order_id: OrderId,
        /// Completion.
        reply: Continuation<()>,
    },
    /// Latest public trades.
    FetchTrades {
        /// Caller's query; does not change the venue call.
        query: TradeQuery,
        /// Completion.
        reply: Continuation<Vec<Trade>>,
    },
}

impl Invocation {
    /// The operation this invocation performs.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::FetchPortfolio { .. } => Operation::FetchPortfolio,
            Self::FetchTicker { .. } => Operation::FetchTicker,
            Self::SubmitOrder { .. } => Operation::SubmitOrder,
            Self::QueryOrder { .. } => Operation::QueryOrder,
            Self::CancelOrder { .. } => Operation::CancelOrder,
            Self::FetchTrades { .. } => Operation::FetchTrades,
        }
    }

    /// Translate a successful payload and hand the result to the caller.
    ///
    /// Returns the translation error, if any, after it has been delivered.
    /// An open-order payload that does not translate is reported as
    /// [`OrderPresence::Unknown`] instead.
    pub fn complete(self, payload: &str) -> Option<TranslationError> {
        match self {
            Self::FetchPortfolio { reply } => deliver(reply, translator::portfolio(payload)),
            Self::FetchTicker { reply } => deliver(reply, translator::ticker(payload)),
            Self::SubmitOrder { reply, .. } => deliver(reply, translator::order_id(payload)),
            Self::QueryOrder { order_id, reply } => match translator::open_order_ids(payload) {
                Ok(open) => {
                    let presence = if open.contains(&order_id) {
                        OrderPresence::Open
                    } else {
                        OrderPresence::Closed
                    };
                    reply(Ok(presence));
                    None
                }
                Err(err) => {
                    reply(Ok(OrderPresence::Unknown));
                    Some(err)
                }
            },
            // The acknowledgement carries nothing the caller needs.
            Self::CancelOrder { reply, .. } => {
                reply(Ok(()));
                None
            }
            Self::FetchTrades { reply, .. } => deliver(reply, translator::trades(payload)),
        }
    }

    /// Deliver an error to the caller.
    pub fn fail(self, error: GatewayError) {
        match self {
            Self::FetchPortfolio { reply } => reply(Err(error)),
            Self::FetchTicker { reply } => reply(Err(error)),
            Self::SubmitOrder { reply, .. } => reply(Err(error)),
            Self::QueryOrder { reply, .. } => reply(Err(error)),
            Self::CancelOrder { reply, .. } => reply(Err(error)),
            Self::FetchTrades { reply, .. } => reply(Err(error)),
        }
    }

    /// Report the neutral result for an absorbed failure.
    ///
    /// Only an open-order query has a neutral result; any other invocation
    /// receives `error` instead.
    pub fn absorb(self, error: GatewayError) {
        match self {
            Self::QueryOrder { reply, .. } => reply(Ok(OrderPresence::Unknown)),
            other => other.fail(error),
        }
    }
}

impl std::fmt::Debug for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SubmitOrder {
                side,
                amount,
                price,
                ..
            } => f
                .debug_struct("SubmitOrder")
                .field("side", side)
                .field("amount", amount)
                .field("price", price)
                .finish_non_exhaustive(),
            Self::QueryOrder { order_id, .. } | Self::CancelOrder { order_id, .. } => f
                .debug_struct(self.operation().as_str())
                .field("order_id", order_id)
                .finish_non_exhaustive(),
            Self::FetchTrades { query, .. } => f
                .debug_struct("FetchTrades")
                .field("query", query)
                .finish_non_exhaustive(),
            Self::FetchPortfolio { .. } | Self::FetchTicker { .. } => {
                f.debug_struct(self.operation().as_str()).finish_non_exhaustive()
            }
        }
    }
}

fn deliver<T>(reply: Continuation<T>, result: Result<T, TranslationError>) -> Option<TranslationError> {
    match result {
        Ok(value) => {
            reply(Ok(value));
            None
        }
        Err(err) => {
            reply(Err(GatewayError::Translation(err.clone())));
            Some(err)
        }
    }
}
