// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements,
        clippy::cast_possible_wrap
    )
)]

//! Coincheck Adapter - Exchange adapter library
//!
//! Translates a trading framework's generic exchange operations into calls
//! against Coincheck and normalizes the venue's responses into canonical
//! records.
//!
//! # Architecture (Hexagonal)
//!
//! - **Domain**: Canonical market records (`PortfolioEntry`, `Ticker`,
//!   `Trade`) and identifiers
//! - **Application**: Ports (`VenuePort`, `ExchangePort`) and the failure
//!   policy table
//! - **Infrastructure**: The Coincheck gateway, retry scheduler, response
//!   translator, HTTP client, and observability
//!
//! # Failure policy
//!
//! | Operation | On venue failure |
//! |-----------|------------------|
//! | portfolio | fatal abort |
//! | ticker, submit, cancel, trades | fixed-delay retry |
//! | open-order query | reported as not open |

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Domain layer - canonical records with no external dependencies.
pub mod domain;

/// Application layer - port definitions and failure policy.
pub mod application;

/// Infrastructure layer - venue adapter and observability.
pub mod infrastructure;

/// Configuration loading and validation.
pub mod config;

/// Error types.
pub mod error;

// Domain re-exports
pub use domain::market::{
    CurrencyPair, OrderPresence, OrderSide, PortfolioEntry, Ticker, Trade, TradeQuery,
};
pub use domain::shared::{OrderId, TradeId};

// Application re-exports
pub use application::ports::{ExchangePort, VenueError, VenuePort};
pub use application::{FailurePolicy, Operation};

// Infrastructure re-exports
pub use infrastructure::coincheck::{
    Capabilities, CoincheckConfig, CoincheckHttpClient, Credentials, FatalHandler, GatewayConfig,
    OrderGateway, RetryPolicy, capabilities,
};

pub use error::{GatewayError, TranslationError};
