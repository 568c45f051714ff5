//! Market records: the canonical shapes delivered to the framework.

mod currency_pair;
mod order_presence;
mod order_side;
mod portfolio;
mod ticker;
mod trade;

pub use currency_pair::CurrencyPair;
pub use order_presence::OrderPresence;
pub use order_side::OrderSide;
pub use portfolio::PortfolioEntry;
pub use ticker::Ticker;
pub use trade::{Trade, TradeQuery};
