//! Ports (interfaces) between the adapter and its collaborators.

mod exchange_port;
mod venue_port;

pub use exchange_port::ExchangePort;
pub use venue_port::{OrderCreateRequest, RawPayload, TradeAllRequest, VenueError, VenuePort};
