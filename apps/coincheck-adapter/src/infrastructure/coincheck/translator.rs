//! Response translation.
//!
//! Pure functions from raw venue payloads to canonical records. No I/O and
//! no state; a payload that does not translate is an error for the caller,
//! never a reason to retry.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDateTime};
use regex::Regex;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::market::{PortfolioEntry, Ticker, Trade};
use crate::domain::shared::{OrderId, TradeId};
use crate::error::TranslationError;

use super::api_types::{OpenOrdersResponse, OrderCreatedResponse, TickerResponse, TradeListResponse};

/// Balance keys matching this are status flags or per-asset sub-balances
/// (`success`, `jpy_reserved`, `btc_lend_in_use`, ...), not holdings.
pub const RESERVED_BALANCE_KEY: &str = r"success|_";

#[allow(clippy::expect_used)] // Pattern is a compile-time constant
fn reserved_key_regex() -> &'static Regex {
    static RESERVED: OnceLock<Regex> = OnceLock::new();
    RESERVED.get_or_init(|| Regex::new(RESERVED_BALANCE_KEY).expect("reserved key regex is valid"))
}

/// Whether a raw balance key is excluded from the portfolio.
#[must_use]
pub fn is_reserved_balance_key(key: &str) -> bool {
    reserved_key_regex().is_match(key)
}

/// Translate a balance payload into portfolio entries, sorted by asset key.
pub fn portfolio(payload: &str) -> Result<Vec<PortfolioEntry>, TranslationError> {
    let balances: BTreeMap<String, Value> = parse("balance", payload)?;

    balances
        .iter()
        .filter(|(asset, _)| !is_reserved_balance_key(asset))
        .map(|(asset, raw)| {
            let amount = decimal(asset, raw)?;
            if amount.is_sign_negative() && !amount.is_zero() {
                return Err(TranslationError::NegativeAmount {
                    asset: asset.clone(),
                    amount: raw.to_string(),
                });
            }
            Ok(PortfolioEntry::new(asset, amount))
        })
        .collect()
}

/// Translate a ticker payload.
pub fn ticker(payload: &str) -> Result<Ticker, TranslationError> {
    let response: TickerResponse = parse("ticker", payload)?;
    Ok(Ticker {
        bid: response.bid,
        ask: response.ask,
    })
}

/// Extract the id of a newly created order.
pub fn order_id(payload: &str) -> Result<OrderId, TranslationError> {
    let response: OrderCreatedResponse = parse("order", payload)?;
    Ok(OrderId::new(response.id))
}

/// Extract the ids of all open orders.
pub fn open_order_ids(payload: &str) -> Result<Vec<OrderId>, TranslationError> {
    let response: OpenOrdersResponse = parse("open orders", payload)?;
    Ok(response
        .orders
        .into_iter()
        .map(|order| OrderId::new(order.id))
        .collect())
}

/// Translate a trade page into trades ascending by date.
///
/// The venue lists newest first, so the page is reversed; the stable sort
/// afterwards keeps that order for equal timestamps and fixes any page that
/// was not strictly newest first.
pub fn trades(payload: &str) -> Result<Vec<Trade>, TranslationError> {
    let response: TradeListResponse = parse("trades", payload)?;

    let mut trades = response
        .data
        .into_iter()
        .map(|record| {
            Ok(Trade {
                id: TradeId::new(record.id),
                amount: record.amount,
                date: unix_seconds(&record.created_at)?,
                price: record.rate,
            })
        })
        .collect::<Result<Vec<_>, TranslationError>>()?;

    trades.reverse();
    trades.sort_by_key(|trade| trade.date);
    Ok(trades)
}

fn parse<T: DeserializeOwned>(payload_name: &'static str, payload: &str) -> Result<T, TranslationError> {
    serde_json::from_str(payload).map_err(|e| TranslationError::Json {
        payload: payload_name,
        message: e.to_string(),
    })
}

/// Decimal from a JSON string or number, following the venue's text.
fn decimal(field: &str, raw: &Value) -> Result<Decimal, TranslationError> {
    let invalid = || TranslationError::InvalidDecimal {
        field: field.to_string(),
        value: raw.to_string(),
    };

    let text = match raw {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return Err(invalid()),
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| invalid())
}

/// Unix seconds from an ISO 8601 timestamp, read as UTC when no offset is given.
fn unix_seconds(created_at: &str) -> Result<i64, TranslationError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(created_at) {
        return Ok(parsed.timestamp());
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(created_at, format).ok())
        .map(|naive| naive.and_utc().timestamp())
        .ok_or_else(|| TranslationError::InvalidTimestamp(created_at.to_string()))
}
