//! Exchange Port (Driving Port)
//!
//! Awaitable form of the adapter surface for framework code that prefers
//! futures over continuations. Retry, abort and absorb semantics are the
//! same as the continuation-style gateway methods.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::market::{OrderPresence, OrderSide, PortfolioEntry, Ticker, Trade, TradeQuery};
use crate::domain::shared::OrderId;
use crate::error::GatewayError;
use crate::infrastructure::coincheck::Capabilities;

/// Port the framework drives the adapter through.
#[async_trait]
pub trait ExchangePort: Send + Sync {
    /// Static description of the venue.
    fn capabilities(&self) -> &'static Capabilities;

    /// Maker fee as a fraction. No venue call.
    fn fee(&self) -> Decimal;

    /// Account balances.
    async fn portfolio(&self) -> Result<Vec<PortfolioEntry>, GatewayError>;

    /// Best bid/ask.
    async fn ticker(&self) -> Result<Ticker, GatewayError>;

    /// Submit a limit order on the adapter's pair.
    async fn submit_order(
        &self,
        side: OrderSide,
        amount: Decimal,
        price: Decimal,
    ) -> Result<OrderId, GatewayError>;

    /// Whether the order is still in the venue's open-order list.
    async fn is_order_open(&self, order_id: &OrderId) -> Result<bool, GatewayError>;

    /// Tri-state form of `is_order_open`.
    async fn order_presence(&self, order_id: &OrderId) -> Result<OrderPresence, GatewayError>;

    /// Cancel an order.
    async fn cancel_order(&self, order_id: &OrderId) -> Result<(), GatewayError>;

    /// Latest trades, ascending by date.
    async fn trades(&self, query: TradeQuery) -> Result<Vec<Trade>, GatewayError>;
}
