//! Coincheck Exchange Adapter
//!
//! Implementation of the framework's exchange surface for Coincheck with:
//! - Continuation-style gateway with a per-operation failure policy
//! - Fixed-delay retry scheduling (optionally capped and grown)
//! - Pure response translation into canonical records
//! - Signed HTTP client for the REST API
//! - Static capabilities descriptor

mod adapter;
mod api_types;
mod capabilities;
mod config;
mod fatal;
mod http_client;
mod invocation;
mod retry;
pub mod translator;

pub use adapter::OrderGateway;
pub use capabilities::{
    Capabilities, CredentialField, Credentials, HistoryKey, Market, MinimalOrder, OrderUnit,
    capabilities,
};
pub use config::{CoincheckConfig, DEFAULT_BASE_URL, DEFAULT_TRADE_PAGE_SIZE, GatewayConfig};
pub use fatal::{ExitProcess, FatalHandler};
pub use http_client::CoincheckHttpClient;
pub use invocation::{Continuation, Invocation};
pub use retry::{InvocationTarget, RetryPolicy, RetryScheduler, RetryableInvocation};
