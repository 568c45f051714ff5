//! Coincheck order gateway.
//!
//! Turns the framework's generic operations into venue calls. Every call is
//! spawned on the gateway's tokio runtime and the method returns immediately,
//! so operations may be started from threads outside the runtime. The
//! outcome, including an up-front rejection, always arrives through the
//! caller's continuation on a runtime task. A failed venue call
//! takes the path its operation's failure policy names:
//!
//! - `Retry`: re-dispatched with identical arguments after the retry delay,
//!   for as long as it keeps failing (or until the configured attempt cap)
//! - `Abort`: handed to the fatal handler, which by default exits the process
//! - `Absorb`: reported to the caller as a neutral result, never as an error

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::application::ports::{
    ExchangePort, OrderCreateRequest, RawPayload, TradeAllRequest, VenueError, VenuePort,
};
use crate::application::{FailurePolicy, Operation};
use crate::domain::market::{OrderPresence, OrderSide, PortfolioEntry, Ticker, Trade, TradeQuery};
use crate::domain::shared::OrderId;
use crate::error::GatewayError;
use crate::infrastructure::observability::{
    record_failure_absorbed, record_malformed_payload, record_retries_exhausted,
    record_retry_scheduled, record_venue_call,
};

use super::capabilities::{Capabilities, capabilities};
use super::config::GatewayConfig;
use super::fatal::{ExitProcess, FatalHandler};
use super::invocation::{Continuation, Invocation};
use super::retry::{InvocationTarget, RetryScheduler, RetryableInvocation};

/// Maker fee in percent.
const MAKER_FEE_PERCENT: Decimal = Decimal::ZERO;

/// A venue call with owned arguments.
#[derive(Debug)]
enum VenueRequest {
    Balance,
    TickerAll,
    OrderCreate(OrderCreateRequest),
    OrderCancel(OrderId),
    OrderOpens,
    TradeAll(TradeAllRequest),
}

/// Coincheck order gateway.
///
/// Shared as `Arc<OrderGateway<V>>`: operations and scheduled retries both
/// hold a reference to the gateway that issued them.
pub struct OrderGateway<V: VenuePort + 'static> {
    venue: V,
    config: GatewayConfig,
    pair_symbol: String,
    scheduler: RetryScheduler,
    runtime: Option<Handle>,
    fatal: Arc<dyn FatalHandler>,
}

impl<V: VenuePort + 'static> std::fmt::Debug for OrderGateway<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderGateway")
            .field("config", &self.config)
            .field("pair_symbol", &self.pair_symbol)
            .finish_non_exhaustive()
    }
}

impl<V: VenuePort + 'static> OrderGateway<V> {
    /// Create a gateway over a venue.
    ///
    /// Created inside a tokio runtime, the gateway keeps that runtime's
    /// handle. Otherwise supply one with [`Self::with_runtime`].
    #[must_use]
    pub fn new(venue: V, config: GatewayConfig) -> Self {
        let gateway = Self {
            venue,
            pair_symbol: config.pair.venue_symbol(),
            scheduler: RetryScheduler::new(config.retry.clone()),
            config,
            runtime: None,
            fatal: Arc::new(ExitProcess),
        };
        match Handle::try_current() {
            Ok(runtime) => gateway.with_runtime(runtime),
            Err(_) => gateway,
        }
    }

    /// Run venue calls and retry timers on `runtime`.
    #[must_use]
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.scheduler = self.scheduler.with_runtime(runtime.clone());
        self.runtime = Some(runtime);
        self
    }

    /// Replace the fatal handler.
    #[must_use]
    pub fn with_fatal_handler(mut self, handler: impl FatalHandler + 'static) -> Self {
        self.fatal = Arc::new(handler);
        self
    }

    /// The gateway's configuration.
    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Static description of the venue.
    #[must_use]
    pub fn capabilities(&self) -> &'static Capabilities {
        capabilities()
    }

    /// Maker fee as a fraction. No venue call.
    #[must_use]
    pub fn fetch_fee(&self) -> Decimal {
        MAKER_FEE_PERCENT / Decimal::ONE_HUNDRED
    }

    /// Fetch account balances.
    ///
    /// A failure is fatal: the fatal handler runs and nothing is retried.
    pub fn fetch_portfolio<F>(self: &Arc<Self>, reply: F)
    where
        F: FnOnce(Result<Vec<PortfolioEntry>, GatewayError>) + Send + 'static,
    {
        self.start(Invocation::FetchPortfolio {
            reply: Box::new(reply),
        });
    }

    /// Fetch the best bid/ask. Retried until it succeeds.
    pub fn fetch_ticker<F>(self: &Arc<Self>, reply: F)
    where
        F: FnOnce(Result<Ticker, GatewayError>) + Send + 'static,
    {
        self.start(Invocation::FetchTicker {
            reply: Box::new(reply),
        });
    }

    /// Submit a limit order. Retried with identical arguments until it succeeds.
    ///
    /// Non-positive amount or price is rejected without a venue call. A retry
    /// after an ambiguous failure may create a second order.
    pub fn submit_order<F>(self: &Arc<Self>, side: OrderSide, amount: Decimal, price: Decimal, reply: F)
    where
        F: FnOnce(Result<OrderId, GatewayError>) + Send + 'static,
    {
        let invocation = Invocation::SubmitOrder {
            side,
            amount,
            price,
            reply: Box::new(reply),
        };

        if amount <= Decimal::ZERO || price <= Decimal::ZERO {
            self.reject(
                invocation,
                GatewayError::InvalidOrder(format!(
                    "amount and price must be positive (amount {amount}, price {price})"
                )),
            );
            return;
        }

        if let Some(market) = capabilities().market(self.config.pair)
            && !market.meets_minimal_order(amount)
        {
            tracing::warn!(
                pair = %self.config.pair,
                amount = %amount,
                minimum = %market.minimal_order.amount,
                "Order amount below venue minimum"
            );
        }

        self.start(invocation);
    }

    /// Whether an order is still in the venue's open-order list.
    ///
    /// A failed lookup is reported as `false`, never as an error, and is not
    /// retried.
    pub fn query_order_open<F>(self: &Arc<Self>, order_id: OrderId, reply: F)
    where
        F: FnOnce(bool) + Send + 'static,
    {
        self.order_presence(order_id, move |presence| reply(presence.is_open()));
    }

    /// Tri-state form of [`Self::query_order_open`]: a failed lookup is
    /// [`OrderPresence::Unknown`].
    pub fn order_presence<F>(self: &Arc<Self>, order_id: OrderId, reply: F)
    where
        F: FnOnce(OrderPresence) + Send + 'static,
    {
        self.start(Invocation::QueryOrder {
            order_id,
            reply: Box::new(move |result: Result<OrderPresence, GatewayError>| {
                reply(result.unwrap_or(OrderPresence::Unknown));
            }),
        });
    }

    /// Cancel an order. Retried with the identical id until it succeeds.
    pub fn cancel_order<F>(self: &Arc<Self>, order_id: OrderId, reply: F)
    where
        F: FnOnce(Result<(), GatewayError>) + Send + 'static,
    {
        self.start(Invocation::CancelOrder {
            order_id,
            reply: Box::new(reply),
        });
    }

    /// Fetch the latest page of public trades, ascending by date. Retried
    /// until it succeeds.
    pub fn fetch_trades<F>(self: &Arc<Self>, query: TradeQuery, reply: F)
    where
        F: FnOnce(Result<Vec<Trade>, GatewayError>) + Send + 'static,
    {
        if query.descending {
            tracing::debug!("Descending trade order requested; trades are always returned ascending");
        }
        if let Some(since) = query.since {
            tracing::debug!(since = %since, "Trade marker ignored; fetching latest page");
        }

        self.start(Invocation::FetchTrades {
            query,
            reply: Box::new(reply),
        });
    }

    fn start(self: &Arc<Self>, invocation: Invocation) {
        Arc::clone(self).dispatch(invocation, 1);
    }

    fn runtime(&self) -> Option<Handle> {
        self.runtime.clone().or_else(|| Handle::try_current().ok())
    }

    /// Fail an invocation without a venue call, on a runtime task.
    fn reject(&self, invocation: Invocation, error: GatewayError) {
        match self.runtime() {
            Some(runtime) => {
                runtime.spawn(async move { invocation.fail(error) });
            }
            None => invocation.fail(error),
        }
    }

    fn request_for(&self, invocation: &Invocation) -> VenueRequest {
        match invocation {
            Invocation::FetchPortfolio { .. } => VenueRequest::Balance,
            Invocation::FetchTicker { .. } => VenueRequest::TickerAll,
            Invocation::SubmitOrder {
                side,
                amount,
                price,
                ..
            } => VenueRequest::OrderCreate(OrderCreateRequest::limit(
                *side,
                *amount,
                *price,
                self.pair_symbol.clone(),
            )),
            Invocation::QueryOrder { .. } => VenueRequest::OrderOpens,
            Invocation::CancelOrder { order_id, .. } => VenueRequest::OrderCancel(order_id.clone()),
            Invocation::FetchTrades { .. } => VenueRequest::TradeAll(TradeAllRequest {
                pair: self.pair_symbol.clone(),
                limit: self.config.trade_page_size,
            }),
        }
    }

    async fn send(&self, request: VenueRequest) -> Result<RawPayload, VenueError> {
        match &request {
            VenueRequest::Balance => self.venue.balance().await,
            VenueRequest::TickerAll => self.venue.ticker_all().await,
            VenueRequest::OrderCreate(order) => self.venue.order_create(order).await,
            VenueRequest::OrderCancel(order_id) => self.venue.order_cancel(order_id).await,
            VenueRequest::OrderOpens => self.venue.order_opens().await,
            VenueRequest::TradeAll(page) => self.venue.trade_all(page).await,
        }
    }

    async fn execute(self: Arc<Self>, invocation: Invocation, attempt: u32) {
        let operation = invocation.operation();
        let request = self.request_for(&invocation);

        if attempt > 1 {
            if let VenueRequest::OrderCreate(order) = &request {
                tracing::warn!(
                    attempt,
                    order_type = order.order_type,
                    amount = %order.amount,
                    rate = %order.rate,
                    "Resubmitting order; an earlier attempt may already be on the book"
                );
            } else {
                tracing::info!(operation = %operation, attempt, "Retrying venue call");
            }
        }

        match self.send(request).await {
            Ok(payload) => match invocation.complete(&payload) {
                None => {
                    record_venue_call(operation, "success");
                    tracing::debug!(operation = %operation, attempt, "Venue call succeeded");
                }
                Some(err) => {
                    record_malformed_payload(operation);
                    tracing::warn!(
                        operation = %operation,
                        attempt,
                        error = %err,
                        "Venue payload did not translate"
                    );
                }
            },
            Err(error) => {
                record_venue_call(operation, "failure");
                self.handle_failure(invocation, attempt, error);
            }
        }
    }

    fn handle_failure(self: &Arc<Self>, invocation: Invocation, attempt: u32, error: VenueError) {
        let operation = invocation.operation();

        match operation.failure_policy() {
            FailurePolicy::Retry => {
                let target: Arc<dyn InvocationTarget> = Arc::clone(self) as Arc<dyn InvocationTarget>;
                match self
                    .scheduler
                    .retry(RetryableInvocation::new(target, invocation, attempt))
                {
                    Ok(delay) => {
                        record_retry_scheduled(operation);
                        tracing::warn!(
                            operation = %operation,
                            attempt,
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            error = %error,
                            "Venue call failed, retry scheduled"
                        );
                    }
                    Err(retryable) => {
                        record_retries_exhausted(operation);
                        tracing::error!(
                            operation = %operation,
                            attempts = attempt,
                            error = %error,
                            "Venue call failed, retries exhausted"
                        );
                        retryable.invocation.fail(GatewayError::RetriesExhausted {
                            operation,
                            attempts: attempt,
                            last_error: error,
                        });
                    }
                }
            }
            FailurePolicy::Abort => {
                self.fatal.abort(operation, &error);
                invocation.fail(GatewayError::Fatal {
                    operation,
                    source: error,
                });
            }
            FailurePolicy::Absorb => {
                record_failure_absorbed(operation);
                tracing::info!(
                    operation = %operation,
                    error = %error,
                    "Venue call failed, reporting neutral result"
                );
                invocation.absorb(GatewayError::Venue(error));
            }
        }
    }
}

impl<V: VenuePort + 'static> InvocationTarget for OrderGateway<V> {
    fn dispatch(self: Arc<Self>, invocation: Invocation, attempt: u32) {
        let Some(runtime) = self.runtime() else {
            let operation = invocation.operation();
            tracing::error!(operation = %operation, attempt, "No tokio runtime to run venue call on");
            invocation.fail(GatewayError::RuntimeUnavailable(operation));
            return;
        };
        runtime.spawn(self.execute(invocation, attempt));
    }
}

/// Run a continuation-style operation and await its reply.
async fn await_reply<T, S>(operation: Operation, start: S) -> Result<T, GatewayError>
where
    T: Send + 'static,
    S: FnOnce(Continuation<T>),
{
    let (tx, rx) = oneshot::channel();
    start(Box::new(move |result: Result<T, GatewayError>| {
        let _ = tx.send(result);
    }));
    rx.await
        .unwrap_or(Err(GatewayError::ContinuationDropped(operation)))
}

#[async_trait]
impl<V: VenuePort + 'static> ExchangePort for Arc<OrderGateway<V>> {
    fn capabilities(&self) -> &'static Capabilities {
        capabilities()
    }

    fn fee(&self) -> Decimal {
        self.fetch_fee()
    }

    async fn portfolio(&self) -> Result<Vec<PortfolioEntry>, GatewayError> {
        await_reply(Operation::FetchPortfolio, |reply| self.fetch_portfolio(reply)).await
    }

    async fn ticker(&self) -> Result<Ticker, GatewayError> {
        await_reply(Operation::FetchTicker, |reply| self.fetch_ticker(reply)).await
    }

    async fn submit_order(
        &self,
        side: OrderSide,
        amount: Decimal,
        price: Decimal,
    ) -> Result<OrderId, GatewayError> {
        await_reply(Operation::SubmitOrder, |reply| {
            OrderGateway::submit_order(self, side, amount, price, reply);
        })
        .await
    }

    async fn is_order_open(&self, order_id: &OrderId) -> Result<bool, GatewayError> {
        let presence = ExchangePort::order_presence(self, order_id).await?;
        Ok(presence.is_open())
    }

    async fn order_presence(&self, order_id: &OrderId) -> Result<OrderPresence, GatewayError> {
        let (tx, rx) = oneshot::channel();
        OrderGateway::order_presence(self, order_id.clone(), move |presence| {
            let _ = tx.send(presence);
        });
        rx.await
            .map_err(|_| GatewayError::ContinuationDropped(Operation::QueryOrder))
    }

    async fn cancel_order(&self, order_id: &OrderId) -> Result<(), GatewayError> {
        let order_id = order_id.clone();
        await_reply(Operation::CancelOrder, |reply| {
            OrderGateway::cancel_order(self, order_id, reply);
        })
        .await
    }

    async fn trades(&self, query: TradeQuery) -> Result<Vec<Trade>, GatewayError> {
        await_reply(Operation::FetchTrades, |reply| self.fetch_trades(query, reply)).await
    }
}
