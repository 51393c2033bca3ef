//! # Market Analytics Engine
//!
//! Quantitative analysis of DeFi market snapshots: dominance tables,
//! concentration indices, trending and mover rankings, emergence and
//! volatility scores, and market benchmarks.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** This crate has no knowledge of external systems. It depends
//!   only on `core-types` and never performs I/O.
//! - **Stateless Calculation:** The `AnalyticsEngine` is a stateless calculator. It
//!   takes provider records as input and returns report structs. Empty input
//!   yields empty or zeroed output, not an error.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: facade over the calculation modules.
//! - `ProtocolFilter`: the category/chain/TVL pre-filter shared by all endpoints.
//! - `report`: the serializable result types.

pub mod benchmarks;
pub mod concentration;
pub mod dominance;
pub mod engine;
pub mod filters;
pub mod movers;
pub mod report;
pub mod scoring;
pub mod trending;

pub use engine::{AnalyticsEngine, LIQUIDITY_FLOOR, enrich_chains, market_growth, safe_div};
pub use filters::ProtocolFilter;
pub use report::{
    Benchmarks, ConcentrationLevel, ConcentrationMetrics, DominanceEntry, EmergingProtocol,
    GroupDominanceEntry, MarketOverview, MarketPhase, MoverProtocol, MoverReason, Movers,
    TrendingProtocol, TrendingReport, VolatilityReport,
};
