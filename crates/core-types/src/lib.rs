//! # Core Types
//!
//! The shared vocabulary of the workspace: the raw records produced by the data
//! provider (`Protocol`, `Chain`, `HistoricalSeries`) and the small enums every
//! other crate agrees on (`Timeframe`, `Endpoint`).
//!
//! Records are immutable snapshots of one fetch cycle. Nothing in this crate
//! performs I/O.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Endpoint, Timeframe};
pub use error::CoreError;
pub use structs::{Chain, HistoricalSeries, Protocol, normalize_tag};

/// Minimum TVL for a protocol to be considered for trending and movers.
///
/// Also the default `minTvl` of those endpoints.
pub const LIQUIDITY_FLOOR: f64 = 1_000_000.0;
