//! Venue Port (Driven Port)
//!
//! The remote venue as an opaque RPC capability. Each call either resolves
//! with the raw response body or fails; interpreting the body is the
//! translator's job.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::market::OrderSide;
use crate::domain::shared::OrderId;

/// Raw response body exactly as the venue returned it.
pub type RawPayload = String;

/// Request data for `order_create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderCreateRequest {
    /// Limit price.
    #[serde(with = "rust_decimal::serde::str")]
    pub rate: Decimal,
    /// Amount in the base asset.
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    /// `buy` or `sell`.
    pub order_type: &'static str,
    /// Venue pair symbol (e.g. `btc_jpy`).
    pub pair: String,
}

impl OrderCreateRequest {
    /// Build a limit order request.
    #[must_use]
    pub fn limit(side: OrderSide, amount: Decimal, rate: Decimal, pair: impl Into<String>) -> Self {
        Self {
            rate,
            amount,
            order_type: side.venue_order_type(),
            pair: pair.into(),
        }
    }
}

/// Request data for `trade_all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeAllRequest {
    /// Venue pair symbol.
    pub pair: String,
    /// Page size.
    pub limit: u32,
}

/// Venue port error.
///
/// The gateway's retry path treats every variant the same way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VenueError {
    /// The request never got a response.
    #[error("Venue network error: {message}")]
    Network {
        /// Error details.
        message: String,
    },

    /// The venue answered with a non-success status.
    #[error("Venue HTTP error {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The venue answered but reported the request as unsuccessful.
    #[error("Venue rejected request: {reason}")]
    Rejected {
        /// Reason given by the venue.
        reason: String,
    },

    /// Credentials were refused.
    #[error("Venue authentication failed")]
    Authentication,

    /// The client could not be set up or the request could not be built.
    #[error("Venue client configuration error: {message}")]
    Configuration {
        /// Error details.
        message: String,
    },
}

/// Port for the venue's RPC capability.
#[async_trait]
pub trait VenuePort: Send + Sync {
    /// Account balances.
    async fn balance(&self) -> Result<RawPayload, VenueError>;

    /// Ticker for the venue's default pair.
    async fn ticker_all(&self) -> Result<RawPayload, VenueError>;

    /// Create a limit order.
    async fn order_create(&self, request: &OrderCreateRequest) -> Result<RawPayload, VenueError>;

    /// Cancel an order by id.
    async fn order_cancel(&self, order_id: &OrderId) -> Result<RawPayload, VenueError>;

    /// List all open orders of the account.
    async fn order_opens(&self) -> Result<RawPayload, VenueError>;

    /// Latest public trades for a pair.
    async fn trade_all(&self, request: &TradeAllRequest) -> Result<RawPayload, VenueError>;
}
