use core_types::Timeframe;
use serde::Serialize;

/// How much of the computed payload a caller wants back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Detail {
    Minimal,
    #[default]
    Basic,
    Full,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DominanceView {
    #[default]
    Protocols,
    Categories,
    Chains,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoverDirection {
    Gainers,
    Losers,
    #[default]
    Both,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DominanceSort {
    #[default]
    Tvl,
    Dominance,
    Name,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendingSort {
    #[default]
    TrendingScore,
    GrowthRate,
    Momentum,
    Tvl,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolSort {
    #[default]
    Tvl,
    Change1d,
    Change7d,
    Name,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainSort {
    #[default]
    Tvl,
    Protocols,
    Change1d,
    Change7d,
    Dominance,
}

/// Validated query for `/overview`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewOptions {
    pub detail: Detail,
    pub timeframe: Timeframe,
    pub categories: Option<Vec<String>>,
    pub chains: Option<Vec<String>>,
    pub include_benchmarks: bool,
}

/// Validated query for `/dominance`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DominanceOptions {
    pub view: DominanceView,
    pub limit: usize,
    pub min_tvl: u64,
    pub categories: Option<Vec<String>>,
    pub chains: Option<Vec<String>>,
    pub sort_by: DominanceSort,
    pub include_concentration: bool,
}

/// Validated query for `/trending`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendingOptions {
    pub timeframes: Vec<Timeframe>,
    pub limit: usize,
    pub min_tvl: u64,
    pub categories: Option<Vec<String>>,
    pub chains: Option<Vec<String>>,
    pub sort_by: TrendingSort,
    pub detail: Detail,
}

/// Validated query for `/movers`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoversOptions {
    pub timeframe: Timeframe,
    pub direction: MoverDirection,
    pub limit: usize,
    pub min_tvl: u64,
    /// Minimum absolute percentage change for a protocol to count as a mover.
    pub min_change: f64,
    pub categories: Option<Vec<String>>,
    pub chains: Option<Vec<String>>,
}

/// Validated query for `/chain-ecosystem`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainEcosystemOptions {
    /// Canonical supported-chain id, aliases already resolved.
    pub chain: String,
    pub detail: Detail,
    pub limit: usize,
    pub sort_by: ProtocolSort,
    pub categories: Option<Vec<String>>,
}

/// Validated query for `/chains-overview`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainsOverviewOptions {
    pub limit: usize,
    pub min_tvl: u64,
    pub sort_by: ChainSort,
    pub detail: Detail,
    pub include_benchmarks: bool,
}

/// A validated query for any endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EndpointQuery {
    Overview(OverviewOptions),
    Dominance(DominanceOptions),
    Trending(TrendingOptions),
    Movers(MoversOptions),
    ChainEcosystem(ChainEcosystemOptions),
    ChainsOverview(ChainsOverviewOptions),
}
