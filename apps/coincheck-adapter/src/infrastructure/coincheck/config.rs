//! Coincheck adapter configuration.

use std::time::Duration;

use super::capabilities::Credentials;
use super::retry::RetryPolicy;
use crate::domain::market::CurrencyPair;

/// Production REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://coincheck.com";

/// Trades requested per history fetch.
pub const DEFAULT_TRADE_PAGE_SIZE: u32 = 2000;

/// Configuration for the HTTP venue client.
#[derive(Debug, Clone)]
pub struct CoincheckConfig {
    /// API credentials.
    pub credentials: Credentials,
    /// REST base URL, without trailing slash.
    pub base_url: String,
    /// HTTP request timeout.
    pub timeout: Duration,
}

impl CoincheckConfig {
    /// Create a configuration against the production endpoint.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Point the client at another base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Configuration for the order gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Pair orders and trade fetches go to.
    pub pair: CurrencyPair,
    /// Trades requested per history fetch.
    pub trade_page_size: u32,
    /// Delay policy for retried operations.
    pub retry: RetryPolicy,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            pair: CurrencyPair::BTC_JPY,
            trade_page_size: DEFAULT_TRADE_PAGE_SIZE,
            retry: RetryPolicy::default(),
        }
    }
}

impl GatewayConfig {
    /// Set the trade page size.
    #[must_use]
    pub const fn with_trade_page_size(mut self, trade_page_size: u32) -> Self {
        self.trade_page_size = trade_page_size;
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
