//! FleetRate Common Types
//!
//! Shared types used across FleetRate crates: currencies, monetary amounts,
//! the USD/BRL pair, and the clock abstraction used for rate freshness.

pub mod monetary;
pub mod time;

pub use monetary::*;
pub use time::*;
