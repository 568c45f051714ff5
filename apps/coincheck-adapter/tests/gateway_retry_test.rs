//! Integration Tests for the Order Gateway
//!
//! Drives the gateway against a scripted venue with paused tokio time to
//! check the retry, abort and absorb contracts of every operation.

// Allow unwrap in tests - tests should panic on unexpected errors
#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::oneshot;
use tokio::time::Instant;

use coincheck_adapter::application::ports::{
    OrderCreateRequest, RawPayload, TradeAllRequest, VenueError, VenuePort,
};
use coincheck_adapter::infrastructure::coincheck::{FatalHandler, GatewayConfig, RetryPolicy};
use coincheck_adapter::{
    ExchangePort, GatewayError, Operation, OrderGateway, OrderId, OrderPresence, OrderSide,
    TradeQuery,
};

// =============================================================================
// Scripted venue
// =============================================================================

const BALANCE: &str = "balance";
const TICKER_ALL: &str = "ticker_all";
const ORDER_CREATE: &str = "order_create";
const ORDER_CANCEL: &str = "order_cancel";
const ORDER_OPENS: &str = "order_opens";
const TRADE_ALL: &str = "trade_all";

#[derive(Debug, Clone)]
struct Call {
    name: &'static str,
    at: Instant,
    order: Option<OrderCreateRequest>,
    order_id: Option<OrderId>,
    page: Option<TradeAllRequest>,
}

#[derive(Default)]
struct Script {
    responses: HashMap<&'static str, VecDeque<Result<RawPayload, VenueError>>>,
    calls: Vec<Call>,
}

/// Venue that answers from per-call queues and records every call.
/// An exhausted queue answers with a network error.
#[derive(Clone, Default)]
struct ScriptedVenue {
    script: Arc<Mutex<Script>>,
}

impl ScriptedVenue {
    fn respond(&self, name: &'static str, response: Result<&str, VenueError>) -> &Self {
        self.script
            .lock()
            .unwrap()
            .responses
            .entry(name)
            .or_default()
            .push_back(response.map(str::to_string));
        self
    }

    fn fail(&self, name: &'static str) -> &Self {
        self.respond(
            name,
            Err(VenueError::Network {
                message: "connection reset".to_string(),
            }),
        )
    }

    fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    fn answer(
        &self,
        name: &'static str,
        order: Option<OrderCreateRequest>,
        order_id: Option<OrderId>,
        page: Option<TradeAllRequest>,
    ) -> Result<RawPayload, VenueError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call {
            name,
            at: Instant::now(),
            order,
            order_id,
            page,
        });
        script
            .responses
            .get_mut(name)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(VenueError::Network {
                    message: "no response scripted".to_string(),
                })
            })
    }
}

#[async_trait]
impl VenuePort for ScriptedVenue {
    async fn balance(&self) -> Result<RawPayload, VenueError> {
        self.answer(BALANCE, None, None, None)
    }

    async fn ticker_all(&self) -> Result<RawPayload, VenueError> {
        self.answer(TICKER_ALL, None, None, None)
    }

    async fn order_create(&self, request: &OrderCreateRequest) -> Result<RawPayload, VenueError> {
        self.answer(ORDER_CREATE, Some(request.clone()), None, None)
    }

    async fn order_cancel(&self, order_id: &OrderId) -> Result<RawPayload, VenueError> {
        self.answer(ORDER_CANCEL, None, Some(order_id.clone()), None)
    }

    async fn order_opens(&self) -> Result<RawPayload, VenueError> {
        self.answer(ORDER_OPENS, None, None, None)
    }

    async fn trade_all(&self, request: &TradeAllRequest) -> Result<RawPayload, VenueError> {
        self.answer(TRADE_ALL, None, None, Some(request.clone()))
    }
}

/// Fatal handler that records instead of exiting.
#[derive(Clone, Default)]
struct RecordingFatal {
    aborted: Arc<Mutex<Vec<(Operation, VenueError)>>>,
}

impl FatalHandler for RecordingFatal {
    fn abort(&self, operation: Operation, error: &VenueError) {
        self.aborted.lock().unwrap().push((operation, error.clone()));
    }
}

fn gateway(venue: &ScriptedVenue) -> Arc<OrderGateway<ScriptedVenue>> {
    gateway_with(venue, GatewayConfig::default())
}

fn gateway_with(venue: &ScriptedVenue, config: GatewayConfig) -> Arc<OrderGateway<ScriptedVenue>> {
    Arc::new(OrderGateway::new(venue.clone(), config).with_fatal_handler(RecordingFatal::default()))
}

fn elapsed_between(calls: &[Call]) -> Vec<Duration> {
    calls.windows(2).map(|w| w[1].at - w[0].at).collect()
}

/// Timer deadlines round to the millisecond.
fn assert_offsets(actual: &[Duration], expected_secs: &[u64]) {
    assert_eq!(actual.len(), expected_secs.len(), "{actual:?}");
    for (offset, secs) in actual.iter().zip(expected_secs) {
        let expected = Duration::from_secs(*secs);
        let drift = offset.abs_diff(expected);
        assert!(drift <= Duration::from_millis(5), "{actual:?} vs {expected_secs:?}");
    }
}

const TICKER: &str = r#"{"last":500100,"bid":500000,"ask":500200}"#;

// =============================================================================
// Retried operations
// =============================================================================

#[tokio::test(start_paused = true)]
async fn buy_rejected_once_then_accepted_yields_one_order_id() {
    let venue = ScriptedVenue::default();
    venue
        .fail(ORDER_CREATE)
        .respond(ORDER_CREATE, Ok(r#"{"success":true,"id":98765}"#));
    let gateway = gateway(&venue);

    let (tx, rx) = oneshot::channel();
    gateway.submit_order(OrderSide::Buy, dec!(0.01), dec!(500000), move |result| {
        let _ = tx.send(result);
    });
    let order_id = rx.await.unwrap().unwrap();

    assert_eq!(order_id, OrderId::new("98765"));

    let calls = venue.calls();
    assert_eq!(calls.len(), 2);
    assert!(elapsed_between(&calls)[0] >= Duration::from_secs(10));

    let expected = OrderCreateRequest::limit(OrderSide::Buy, dec!(0.01), dec!(500000), "btc_jpy");
    for call in &calls {
        assert_eq!(call.name, ORDER_CREATE);
        assert_eq!(call.order.as_ref(), Some(&expected));
    }
}

#[tokio::test(start_paused = true)]
async fn ticker_retries_until_success() {
    let venue = ScriptedVenue::default();
    venue
        .fail(TICKER_ALL)
        .fail(TICKER_ALL)
        .respond(TICKER_ALL, Ok(TICKER));
    let gateway = gateway(&venue);

    let ticker = gateway.ticker().await.unwrap();

    assert_eq!(ticker.bid, dec!(500000));
    assert_eq!(ticker.ask, dec!(500200));
    let calls = venue.calls();
    assert_eq!(calls.len(), 3);
    assert!(elapsed_between(&calls).iter().all(|d| *d >= Duration::from_secs(10)));
}

#[tokio::test(start_paused = true)]
async fn cancel_retries_with_identical_id() {
    let venue = ScriptedVenue::default();
    venue
        .fail(ORDER_CANCEL)
        .respond(ORDER_CANCEL, Ok(r#"{"success":true,"id":4242}"#));
    let gateway = gateway(&venue);

    ExchangePort::cancel_order(&gateway, &OrderId::new("4242"))
        .await
        .unwrap();

    let calls = venue.calls();
    assert_eq!(calls.len(), 2);
    assert!(
        calls
            .iter()
            .all(|c| c.order_id.as_ref() == Some(&OrderId::new("4242")))
    );
}

#[tokio::test(start_paused = true)]
async fn trades_retry_and_come_back_ascending() {
    let venue = ScriptedVenue::default();
    venue.fail(TRADE_ALL).respond(
        TRADE_ALL,
        Ok(r#"{"success":true,"data":[
            {"id":3,"amount":"0.2","rate":"501000","created_at":"2024-05-01T00:00:02.000Z"},
            {"id":2,"amount":"0.1","rate":"500500","created_at":"2024-05-01T00:00:01.000Z"},
            {"id":1,"amount":"0.3","rate":"500000","created_at":"2024-05-01T00:00:00.000Z"}
        ]}"#),
    );
    let gateway = gateway(&venue);

    let trades = gateway
        .trades(TradeQuery::latest().with_descending(true))
        .await
        .unwrap();

    let dates: Vec<i64> = trades.iter().map(|t| t.date).collect();
    assert_eq!(dates, vec![1_714_521_600, 1_714_521_601, 1_714_521_602]);

    let calls = venue.calls();
    assert_eq!(calls.len(), 2);
    for call in calls {
        let page = call.page.unwrap();
        assert_eq!(page.pair, "btc_jpy");
        assert_eq!(page.limit, 2000);
    }
}

#[tokio::test(start_paused = true)]
async fn concurrent_retries_run_on_independent_timelines() {
    let venue = ScriptedVenue::default();
    venue.fail(TICKER_ALL).respond(TICKER_ALL, Ok(TICKER));
    venue
        .fail(ORDER_CANCEL)
        .respond(ORDER_CANCEL, Ok(r#"{"success":true}"#));
    let gateway = gateway(&venue);
    let start = Instant::now();

    let (ticker_tx, ticker_rx) = oneshot::channel();
    gateway.fetch_ticker(move |result| {
        let _ = ticker_tx.send(result);
    });
    tokio::time::sleep(Duration::from_secs(5)).await;
    let (cancel_tx, cancel_rx) = oneshot::channel();
    gateway.cancel_order(OrderId::new("7"), move |result| {
        let _ = cancel_tx.send(result);
    });

    ticker_rx.await.unwrap().unwrap();
    cancel_rx.await.unwrap().unwrap();

    let offsets = |name: &str| -> Vec<Duration> {
        venue
            .calls()
            .iter()
            .filter(|c| c.name == name)
            .map(|c| c.at - start)
            .collect()
    };
    assert_offsets(&offsets(TICKER_ALL), &[0, 10]);
    assert_offsets(&offsets(ORDER_CANCEL), &[5, 15]);
}

#[tokio::test(start_paused = true)]
async fn capped_retries_surface_retries_exhausted() {
    let venue = ScriptedVenue::default();
    let config = GatewayConfig::default().with_retry(RetryPolicy::default().with_max_attempts(3));
    let gateway = gateway_with(&venue, config);

    let err = gateway.ticker().await.unwrap_err();

    assert_eq!(
        err,
        GatewayError::RetriesExhausted {
            operation: Operation::FetchTicker,
            attempts: 3,
            last_error: VenueError::Network {
                message: "no response scripted".to_string()
            },
        }
    );
    assert_eq!(venue.calls().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn malformed_payload_is_not_retried() {
    let venue = ScriptedVenue::default();
    venue.respond(TICKER_ALL, Ok(r#"{"last":1}"#));
    let gateway = gateway(&venue);

    let err = gateway.ticker().await.unwrap_err();

    assert!(matches!(err, GatewayError::Translation(_)));
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(venue.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn rejected_request_is_retried_like_any_failure() {
    let venue = ScriptedVenue::default();
    venue
        .respond(
            ORDER_CREATE,
            Err(VenueError::Rejected {
                reason: "Nonce must be incremented".to_string(),
            }),
        )
        .respond(ORDER_CREATE, Ok(r#"{"success":true,"id":"abc"}"#));
    let gateway = gateway(&venue);

    let order_id = ExchangePort::submit_order(&gateway, OrderSide::Sell, dec!(0.5), dec!(510000))
        .await
        .unwrap();

    assert_eq!(order_id.as_str(), "abc");
    assert_eq!(venue.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn non_positive_order_is_rejected_without_venue_call() {
    let venue = ScriptedVenue::default();
    let gateway = gateway(&venue);

    let zero_amount =
        ExchangePort::submit_order(&gateway, OrderSide::Buy, Decimal::ZERO, dec!(500000)).await;
    let negative_price =
        ExchangePort::submit_order(&gateway, OrderSide::Sell, dec!(0.01), dec!(-1)).await;

    assert!(matches!(zero_amount, Err(GatewayError::InvalidOrder(_))));
    assert!(matches!(negative_price, Err(GatewayError::InvalidOrder(_))));
    assert!(venue.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn since_marker_leaves_trade_page_and_order_unchanged() {
    let venue = ScriptedVenue::default();
    venue.respond(
        TRADE_ALL,
        Ok(r#"{"success":true,"data":[
            {"id":2,"amount":"0.1","rate":"500500","created_at":"2024-05-01T00:00:01.000Z"},
            {"id":1,"amount":"0.3","rate":"500000","created_at":"2024-05-01T00:00:00.000Z"}
        ]}"#),
    );
    let gateway = gateway(&venue);
    let marker = chrono::DateTime::from_timestamp(1_714_521_601, 0).unwrap();

    let trades = gateway.trades(TradeQuery::since(marker)).await.unwrap();

    let dates: Vec<i64> = trades.iter().map(|t| t.date).collect();
    assert_eq!(dates, vec![1_714_521_600, 1_714_521_601]);

    let calls = venue.calls();
    assert_eq!(calls.len(), 1);
    let page = calls[0].page.clone().unwrap();
    assert_eq!(page.pair, "btc_jpy");
    assert_eq!(page.limit, gateway.config().trade_page_size);
}

#[tokio::test(start_paused = true)]
async fn invalid_order_reply_arrives_after_submit_returns() {
    let venue = ScriptedVenue::default();
    let gateway = gateway(&venue);
    let returned = Arc::new(AtomicBool::new(false));

    let (tx, rx) = oneshot::channel();
    let seen = Arc::clone(&returned);
    gateway.submit_order(OrderSide::Buy, Decimal::ZERO, dec!(500000), move |result| {
        let _ = tx.send((seen.load(Ordering::SeqCst), result));
    });
    returned.store(true, Ordering::SeqCst);

    let (submit_had_returned, result) = rx.await.unwrap();
    assert!(submit_had_returned);
    assert!(matches!(result, Err(GatewayError::InvalidOrder(_))));
    assert!(venue.calls().is_empty());
}

// =============================================================================
// Aborted operation
// =============================================================================

#[tokio::test(start_paused = true)]
async fn portfolio_failure_is_fatal_and_not_retried() {
    let venue = ScriptedVenue::default();
    venue.respond(BALANCE, Err(VenueError::Authentication));
    let fatal = RecordingFatal::default();
    let gateway = Arc::new(
        OrderGateway::new(venue.clone(), GatewayConfig::default()).with_fatal_handler(fatal.clone()),
    );

    let err = gateway.portfolio().await.unwrap_err();

    assert_eq!(
        err,
        GatewayError::Fatal {
            operation: Operation::FetchPortfolio,
            source: VenueError::Authentication,
        }
    );
    assert_eq!(
        *fatal.aborted.lock().unwrap(),
        vec![(Operation::FetchPortfolio, VenueError::Authentication)]
    );

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(venue.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn portfolio_success_excludes_reserved_keys() {
    let venue = ScriptedVenue::default();
    venue.respond(
        BALANCE,
        Ok(r#"{"success":true,"jpy":"120000","btc":"0.25","jpy_reserved":"5000","btc_lend_in_use":"0"}"#),
    );
    let gateway = gateway(&venue);

    let portfolio = gateway.portfolio().await.unwrap();

    let names: Vec<&str> = portfolio.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["BTC", "JPY"]);
    assert_eq!(portfolio[0].amount, dec!(0.25));
}

// =============================================================================
// Absorbed operation
// =============================================================================

#[tokio::test(start_paused = true)]
async fn query_reports_open_and_closed_orders() {
    let venue = ScriptedVenue::default();
    let opens = r#"{"success":true,"orders":[{"id":111},{"id":222}]}"#;
    venue.respond(ORDER_OPENS, Ok(opens)).respond(ORDER_OPENS, Ok(opens));
    let gateway = gateway(&venue);

    let (tx, rx) = oneshot::channel();
    gateway.query_order_open(OrderId::new("222"), move |open| {
        let _ = tx.send(open);
    });
    assert!(rx.await.unwrap());

    let (tx, rx) = oneshot::channel();
    gateway.query_order_open(OrderId::new("333"), move |open| {
        let _ = tx.send(open);
    });
    assert!(!rx.await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn query_failure_reports_not_open_without_retry() {
    let venue = ScriptedVenue::default();
    venue.fail(ORDER_OPENS);
    let gateway = gateway(&venue);

    assert!(!gateway.is_order_open(&OrderId::new("111")).await.unwrap());

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(venue.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn order_presence_distinguishes_unknown() {
    let venue = ScriptedVenue::default();
    venue
        .respond(ORDER_OPENS, Ok(r#"{"success":true,"orders":[]}"#))
        .fail(ORDER_OPENS);
    let gateway = gateway(&venue);

    let id = OrderId::new("111");
    assert_eq!(
        ExchangePort::order_presence(&gateway, &id).await.unwrap(),
        OrderPresence::Closed
    );
    assert_eq!(
        ExchangePort::order_presence(&gateway, &id).await.unwrap(),
        OrderPresence::Unknown
    );
}

// =============================================================================
// Fee and capabilities
// =============================================================================

#[tokio::test(start_paused = true)]
async fn fee_is_zero_without_venue_call() {
    let venue = ScriptedVenue::default();
    let gateway = gateway(&venue);

    assert_eq!(gateway.fetch_fee(), Decimal::ZERO);
    assert_eq!(gateway.fee(), Decimal::ZERO);
    assert!(venue.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn capabilities_are_static() {
    let venue = ScriptedVenue::default();
    let gateway = gateway(&venue);

    let caps = ExchangePort::capabilities(&gateway);
    assert_eq!(caps.slug, "coincheck");
    assert!(std::ptr::eq(caps, coincheck_adapter::capabilities()));
}

// =============================================================================
// Callers outside the runtime
// =============================================================================

fn worker_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap()
}

#[test]
fn plain_thread_caller_gets_reply_after_retry() {
    let runtime = worker_runtime();
    let venue = ScriptedVenue::default();
    venue.fail(TICKER_ALL).respond(TICKER_ALL, Ok(TICKER));
    let config = GatewayConfig::default().with_retry(RetryPolicy::fixed(Duration::from_millis(10)));
    let gateway = Arc::new(
        OrderGateway::new(venue.clone(), config)
            .with_fatal_handler(RecordingFatal::default())
            .with_runtime(runtime.handle().clone()),
    );

    let (tx, rx) = mpsc::channel();
    let caller = Arc::clone(&gateway);
    std::thread::spawn(move || {
        caller.fetch_ticker(move |result| {
            let _ = tx.send(result);
        });
    })
    .join()
    .unwrap();

    let ticker = rx.recv_timeout(Duration::from_secs(5)).unwrap().unwrap();
    assert_eq!(ticker.ask, dec!(500200));
    assert_eq!(venue.calls().len(), 2);
}

#[test]
fn gateway_built_in_runtime_serves_plain_threads() {
    let runtime = worker_runtime();
    let venue = ScriptedVenue::default();
    venue.respond(ORDER_OPENS, Ok(r#"{"success":true,"orders":[{"id":111}]}"#));
    let gateway = runtime.block_on(async { gateway(&venue) });

    let (tx, rx) = mpsc::channel();
    let caller = Arc::clone(&gateway);
    std::thread::spawn(move || {
        caller.query_order_open(OrderId::new("111"), move |open| {
            let _ = tx.send(open);
        });
    })
    .join()
    .unwrap();

    assert!(rx.recv_timeout(Duration::from_secs(5)).unwrap());
}

#[test]
fn gateway_without_runtime_reports_runtime_unavailable() {
    let venue = ScriptedVenue::default();
    let gateway = gateway(&venue);

    let (tx, rx) = mpsc::channel();
    gateway.cancel_order(OrderId::new("7"), move |result| {
        let _ = tx.send(result);
    });

    assert_eq!(
        rx.recv_timeout(Duration::from_secs(1)).unwrap(),
        Err(GatewayError::RuntimeUnavailable(Operation::CancelOrder))
    );
    assert!(venue.calls().is_empty());
}
