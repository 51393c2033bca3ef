//! # Market Intelligence
//!
//! The request pipeline behind every analytics endpoint:
//! validate the raw query, derive a cache key, compute on a miss, then wrap
//! the payload with narrative insights, benchmarks and request metadata.
//!
//! `MarketIntelligence` owns no data of its own. The provider, the validator
//! and the cache store are injected at construction time.

pub mod assembler;
pub mod envelope;
pub mod error;
pub mod narrative;
pub mod views;

pub use assembler::MarketIntelligence;
pub use envelope::{
    Envelope, Intelligence, Metadata, Payload, Recommendation, RecommendationType, RiskLevel,
};
pub use error::IntelligenceError;
pub use views::MarketData;
