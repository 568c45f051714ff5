//! Domain layer.
//!
//! Canonical records the framework understands, independent of the venue's
//! wire format.

pub mod market;
pub mod shared;
