//! # Query Validation
//!
//! Converts untrusted, untyped query input into one strongly typed options
//! struct per analytics endpoint.
//!
//! Validation never stops at the first bad field: every field is checked, a
//! safe fallback is kept for each invalid one, and all violations are reported
//! together in a single `ValidationError`. No I/O happens here.

pub mod error;
pub mod options;
mod primitives;
pub mod raw;
pub mod rules;
mod validator;

pub use error::ValidationError;
pub use options::{
    ChainEcosystemOptions, ChainSort, ChainsOverviewOptions, Detail, DominanceOptions,
    DominanceSort, DominanceView, EndpointQuery, MoverDirection, MoversOptions, OverviewOptions,
    ProtocolSort, TrendingOptions, TrendingSort,
};
pub use primitives::Validated;
pub use raw::{QueryValue, RawQuery};
pub use rules::ValidationRules;
pub use validator::{QueryValidation, QueryValidator};
