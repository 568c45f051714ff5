//! Application layer.
//!
//! - `ports`: the venue RPC capability the adapter consumes and the
//!   awaitable surface it exposes to the framework
//! - `failure_policy`: which failure path each operation takes

pub mod failure_policy;
pub mod ports;

pub use failure_policy::{FailurePolicy, Operation};
