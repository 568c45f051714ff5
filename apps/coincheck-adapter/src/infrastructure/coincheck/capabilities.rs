//! Static capabilities descriptor.
//!
//! What the framework may assume about Coincheck without asking it: the
//! pairs it trades, the smallest order it accepts, which credentials it
//! needs and how its trade history is paged.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::market::CurrencyPair;

/// Which side of a pair a minimal order amount is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderUnit {
    /// Base asset (BTC for BTC/JPY).
    Asset,
    /// Quote currency.
    Currency,
}

/// Smallest order the venue accepts on a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimalOrder {
    /// Minimum amount.
    pub amount: Decimal,
    /// Unit of `amount`.
    pub unit: OrderUnit,
}

/// One tradable market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    /// Currency pair.
    pub pair: CurrencyPair,
    /// Venue minimum.
    pub minimal_order: MinimalOrder,
}

impl Market {
    /// Whether `amount` (in the minimal order's unit) is at least the venue minimum.
    #[must_use]
    pub fn meets_minimal_order(&self, amount: Decimal) -> bool {
        amount >= self.minimal_order.amount
    }
}

/// Credential names a venue can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialField {
    /// API key.
    Key,
    /// API secret.
    Secret,
}

impl CredentialField {
    /// Lowercase name, as the framework's configuration spells it.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Key => "key",
            Self::Secret => "secret",
        }
    }
}

/// The credential pair supplied at construction.
#[derive(Clone, Default)]
pub struct Credentials {
    /// API key.
    pub key: String,
    /// API secret.
    pub secret: String,
}

impl Credentials {
    /// Create a credential pair.
    #[must_use]
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    fn get(&self, field: CredentialField) -> &str {
        match field {
            CredentialField::Key => &self.key,
            CredentialField::Secret => &self.secret,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// How a venue keys its trade history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKey {
    /// Trades are fetched by date.
    Date,
    /// Trades are fetched by trade id.
    Tid,
}

/// Static description of a venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    /// Display name.
    pub name: &'static str,
    /// Identifier used in framework configuration.
    pub slug: &'static str,
    /// Quote currencies.
    pub currencies: &'static [&'static str],
    /// Base assets.
    pub assets: &'static [&'static str],
    /// Tradable markets.
    pub markets: &'static [Market],
    /// Credentials the venue needs for private calls.
    pub requires: &'static [CredentialField],
    /// How trade history is keyed.
    pub provides_history: HistoryKey,
    /// Whether the full history (not just the latest page) is available.
    pub provides_full_history: bool,
    /// Name of the trade id field.
    pub tid: &'static str,
    /// Whether live trading is supported.
    pub tradable: bool,
    /// Whether the framework must delay before re-ordering.
    pub force_reorder_delay: bool,
}

impl Capabilities {
    /// Market for a pair, if traded.
    #[must_use]
    pub fn market(&self, pair: CurrencyPair) -> Option<&'static Market> {
        self.markets.iter().find(|market| market.pair == pair)
    }

    /// Required credential fields that are empty in `credentials`.
    #[must_use]
    pub fn missing_credentials(&self, credentials: &Credentials) -> Vec<CredentialField> {
        self.requires
            .iter()
            .copied()
            .filter(|field| credentials.get(*field).trim().is_empty())
            .collect()
    }
}

static COINCHECK: Capabilities = Capabilities {
    name: "Coincheck",
    slug: "coincheck",
    currencies: &["JPY", "BTC"],
    assets: &["BTC"],
    markets: &[Market {
        pair: CurrencyPair::BTC_JPY,
        minimal_order: MinimalOrder {
            amount: Decimal::from_parts(5, 0, 0, false, 3),
            unit: OrderUnit::Asset,
        },
    }],
    requires: &[CredentialField::Key, CredentialField::Secret],
    provides_history: HistoryKey::Date,
    provides_full_history: false,
    tid: "tid",
    tradable: true,
    force_reorder_delay: false,
};

/// Coincheck's capabilities.
#[must_use]
pub fn capabilities() -> &'static Capabilities {
    &COINCHECK
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    #[test]
    fn descriptor_values() {
        let caps = capabilities();
        assert_eq!(caps.name, "Coincheck");
        assert_eq!(caps.slug, "coincheck");
        assert_eq!(caps.currencies, &["JPY", "BTC"]);
        assert_eq!(caps.assets, &["BTC"]);
        assert_eq!(caps.provides_history, HistoryKey::Date);
        assert!(!caps.provides_full_history);
        assert!(caps.tradable);
        assert!(!caps.force_reorder_delay);
    }

    #[test]
    fn btc_jpy_minimum_is_half_a_hundredth() {
        let market = capabilities().market(CurrencyPair::BTC_JPY).unwrap();
        assert_eq!(market.minimal_order.amount, dec!(0.005));
        assert_eq!(market.minimal_order.unit, OrderUnit::Asset);
    }

    #[test_case(dec!(0.005), true ; "exactly minimum")]
    #[test_case(dec!(0.01), true ; "above minimum")]
    #[test_case(dec!(0.0049), false ; "below minimum")]
    fn minimal_order(amount: Decimal, ok: bool) {
        let market = capabilities().market(CurrencyPair::BTC_JPY).unwrap();
        assert_eq!(market.meets_minimal_order(amount), ok);
    }

    #[test]
    fn unknown_pair_has_no_market() {
        assert!(capabilities().market(CurrencyPair::new("USD", "ETH")).is_none());
    }

    #[test]
    fn missing_credentials_lists_empty_fields() {
        let caps = capabilities();
        assert!(caps.missing_credentials(&Credentials::new("k", "s")).is_empty());
        assert_eq!(
            caps.missing_credentials(&Credentials::new("k", "  ")),
            vec![CredentialField::Secret]
        );
        assert_eq!(
            caps.missing_credentials(&Credentials::default()),
            vec![CredentialField::Key, CredentialField::Secret]
        );
    }

    #[test]
    fn serializes_for_the_framework() {
        let json = serde_json::to_value(capabilities()).unwrap();
        assert_eq!(json["requires"], serde_json::json!(["key", "secret"]));
        assert_eq!(json["providesHistory"], "date");
        assert_eq!(json["providesFullHistory"], false);
        assert_eq!(json["markets"][0]["pair"]["currency"], "JPY");
        assert_eq!(json["markets"][0]["minimalOrder"]["unit"], "asset");
    }

    #[test]
    fn credentials_debug_redacts_secret() {
        let debug = format!("{:?}", Credentials::new("key-1", "hunter2"));
        assert!(debug.contains("key-1"));
        assert!(!debug.contains("hunter2"));
    }
}
