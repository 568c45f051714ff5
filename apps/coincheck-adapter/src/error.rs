//! Adapter error types.
//!
//! Errors reach the caller through a continuation's `Result`, except for the
//! two special paths of the failure policy table: an aborted portfolio fetch
//! (handed to the fatal handler first) and an absorbed open-order query
//! (never an error).

use thiserror::Error;

use crate::application::Operation;
use crate::application::ports::VenueError;

/// A venue payload that could not be mapped to a canonical record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    /// The body is not the JSON shape expected for this call.
    #[error("Malformed {payload} payload: {message}")]
    Json {
        /// Which payload was being translated.
        payload: &'static str,
        /// Parser message.
        message: String,
    },

    /// A numeric field does not parse as a decimal.
    #[error("Field '{field}' is not a decimal: {value}")]
    InvalidDecimal {
        /// Field or balance key.
        field: String,
        /// Raw value.
        value: String,
    },

    /// A timestamp field does not parse.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A balance came back negative.
    #[error("Negative balance for {asset}: {amount}")]
    NegativeAmount {
        /// Asset key.
        asset: String,
        /// Raw amount.
        amount: String,
    },
}

/// Error delivered to a gateway continuation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// A venue failure reported without retrying.
    #[error(transparent)]
    Venue(#[from] VenueError),

    /// The venue answered but the payload was malformed. Never retried.
    #[error(transparent)]
    Translation(#[from] TranslationError),

    /// The configured attempt cap was reached.
    #[error("{operation} failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// Operation that gave up.
        operation: Operation,
        /// Attempts made, including the first.
        attempts: u32,
        /// Error of the final attempt.
        last_error: VenueError,
    },

    /// The operation's failure is fatal to the hosting process.
    #[error("{operation} failed fatally: {source}")]
    Fatal {
        /// Operation that failed.
        operation: Operation,
        /// Venue error that triggered the abort.
        source: VenueError,
    },

    /// Order parameters rejected before any venue call.
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// The continuation was dropped without being called.
    #[error("Gateway dropped the continuation for {0}")]
    ContinuationDropped(Operation),

    /// No tokio runtime was available to run the venue call.
    #[error("No tokio runtime available to run {0}")]
    RuntimeUnavailable(Operation),
}

impl GatewayError {
    /// The venue error behind this failure, if any.
    #[must_use]
    pub const fn venue_error(&self) -> Option<&VenueError> {
        match self {
            Self::Venue(err)
            | Self::RetriesExhausted {
                last_error: err, ..
            }
            | Self::Fatal { source: err, .. } => Some(err),
            Self::Translation(_)
            | Self::InvalidOrder(_)
            | Self::ContinuationDropped(_)
            | Self::RuntimeUnavailable(_) => None,
        }
    }
}
