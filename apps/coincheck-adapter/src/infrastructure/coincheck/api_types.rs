//! Coincheck API response types.
//!
//! These types map directly to Coincheck's REST API format. Only the fields
//! the adapter reads are declared; everything else is ignored.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

// ============================================================================
// Market Data Types
// ============================================================================

/// Ticker response (`GET /api/ticker`).
#[derive(Debug, Clone, Deserialize)]
pub struct TickerResponse {
    /// Best bid.
    pub bid: Decimal,
    /// Best ask.
    pub ask: Decimal,
}

/// Trade list response (`GET /api/trades`).
#[derive(Debug, Clone, Deserialize)]
pub struct TradeListResponse {
    /// Trades, newest first.
    pub data: Vec<TradeRecord>,
}

/// One public trade.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeRecord {
    /// Trade id.
    #[serde(deserialize_with = "venue_id")]
    pub id: String,
    /// Amount in the base asset (string or number).
    pub amount: Decimal,
    /// Price in the quote currency.
    pub rate: Decimal,
    /// ISO 8601 execution time.
    pub created_at: String,
}

// ============================================================================
// Order Types
// ============================================================================

/// Order creation response (`POST /api/exchange/orders`).
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCreatedResponse {
    /// New order id.
    #[serde(deserialize_with = "venue_id")]
    pub id: String,
}

/// Open orders response (`GET /api/exchange/orders/opens`).
#[derive(Debug, Clone, Deserialize)]
pub struct OpenOrdersResponse {
    /// Orders still resting on the book.
    #[serde(default)]
    pub orders: Vec<OpenOrder>,
}

/// One open order; only the id matters for membership checks.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenOrder {
    /// Order id.
    #[serde(deserialize_with = "venue_id")]
    pub id: String,
}

// ============================================================================
// Status Envelope
// ============================================================================

/// The `success`/`error` fields every private endpoint includes.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusEnvelope {
    /// `false` when the venue refused the request.
    #[serde(default)]
    pub success: Option<bool>,
    /// Reason for a refusal.
    #[serde(default)]
    pub error: Option<String>,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Ids arrive as JSON numbers on most endpoints and as strings on a few.
fn venue_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}
