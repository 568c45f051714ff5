//! Shared Domain Types
//!
//! Identifiers shared across the market records.

pub mod identifiers;

pub use identifiers::{OrderId, TradeId};
