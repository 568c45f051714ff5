//! Infrastructure layer: the Coincheck adapter and its observability.

pub mod coincheck;
pub mod observability;
