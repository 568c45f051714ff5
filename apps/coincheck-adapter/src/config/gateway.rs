//! Order gateway configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::infrastructure::coincheck::{DEFAULT_TRADE_PAGE_SIZE, GatewayConfig, RetryPolicy};

/// Gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySettings {
    /// Trades requested per history fetch.
    #[serde(default = "default_trade_page_size")]
    pub trade_page_size: u32,
    /// Retry settings.
    #[serde(default)]
    pub retry: RetrySettings,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            trade_page_size: default_trade_page_size(),
            retry: RetrySettings::default(),
        }
    }
}

impl GatewaySettings {
    /// Gateway configuration.
    #[must_use]
    pub fn to_gateway_config(&self) -> GatewayConfig {
        GatewayConfig::default()
            .with_trade_page_size(self.trade_page_size)
            .with_retry(self.retry.to_policy())
    }
}

/// Retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Delay before the first re-dispatch in seconds.
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
    /// Total attempts allowed, including the first; 0 = unlimited.
    #[serde(default)]
    pub max_attempts: u32,
    /// Delay growth per failed attempt; 1.0 = fixed.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Upper bound for a grown delay in seconds.
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            delay_secs: default_delay_secs(),
            max_attempts: 0,
            multiplier: default_multiplier(),
            max_delay_secs: default_max_delay_secs(),
        }
    }
}

impl RetrySettings {
    /// Retry policy.
    #[must_use]
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(Duration::from_secs(self.delay_secs))
            .with_max_attempts(self.max_attempts)
            .with_backoff(self.multiplier, Duration::from_secs(self.max_delay_secs))
    }
}

const fn default_trade_page_size() -> u32 {
    DEFAULT_TRADE_PAGE_SIZE
}

const fn default_delay_secs() -> u64 {
    10
}

const fn default_multiplier() -> f64 {
    1.0
}

const fn default_max_delay_secs() -> u64 {
    300
}
