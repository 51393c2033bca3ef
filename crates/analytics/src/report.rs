use core_types::Timeframe;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Headline market figures for one timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOverview {
    pub total_tvl: f64,
    pub protocol_count: usize,
    pub chain_count: usize,
    /// TVL-weighted mean protocol change over the timeframe.
    pub weighted_change: f64,
    /// Change of the historical total-TVL series over the timeframe; zero without data.
    pub market_growth: f64,
    pub gaining_protocols: usize,
    pub losing_protocols: usize,
}

/// One protocol's share of total TVL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DominanceEntry {
    pub id: String,
    pub name: String,
    pub tvl: f64,
    pub dominance_percentage: f64,
    pub category: String,
    pub chain_count: usize,
}

/// TVL aggregated over a group of protocols (a category or a chain).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDominanceEntry {
    pub name: String,
    pub tvl: f64,
    pub dominance_percentage: f64,
    pub protocol_count: usize,
    pub average_tvl_per_protocol: f64,
}

pub type CategoryDominanceEntry = GroupDominanceEntry;
pub type ChainDominanceEntry = GroupDominanceEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcentrationLevel {
    Low,
    Moderate,
    High,
}

/// Market concentration of one dominance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcentrationMetrics {
    /// Herfindahl-Hirschman index on shares in [0, 1].
    pub hhi: f64,
    pub shannon_index: f64,
    /// Cumulative dominance percentage of the five largest entries.
    pub top5_concentration: f64,
    pub entity_count: usize,
    pub level: ConcentrationLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingProtocol {
    pub id: String,
    pub name: String,
    pub category: String,
    pub tvl: f64,
    pub growth_rate: f64,
    pub momentum_score: f64,
    pub volume_score: f64,
    pub trending_score: f64,
    /// 1-based position after sorting by `trending_score`.
    pub rank: usize,
}

/// Per-timeframe trending tables plus their cross-timeframe merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingReport {
    pub by_timeframe: BTreeMap<Timeframe, Vec<TrendingProtocol>>,
    pub overall: Vec<TrendingProtocol>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoverReason {
    MajorProtocolUpdate,
    MarketSentiment,
    CompetitiveDynamics,
    NormalFluctuation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoverProtocol {
    pub id: String,
    pub name: String,
    pub category: String,
    pub tvl: f64,
    pub change_percent: f64,
    /// `tvl * change_percent / 100`, signed.
    pub absolute_change: f64,
    pub reason: MoverReason,
}

/// Disjoint, independently sorted views of one filtered candidate set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Movers {
    /// `change_percent > 0`, largest first.
    pub gainers: Vec<MoverProtocol>,
    /// `change_percent < 0`, most negative first.
    pub losers: Vec<MoverProtocol>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergingProtocol {
    pub id: String,
    pub name: String,
    pub category: String,
    pub tvl: f64,
    pub growth_component: f64,
    pub size_component: f64,
    pub activity_component: f64,
    pub emergence_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilityProtocol {
    pub id: String,
    pub name: String,
    pub tvl: f64,
    pub change_24h: f64,
    pub change_7d: f64,
    pub volatility_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolatilityReport {
    /// Highest scores first.
    pub high: Vec<VolatilityProtocol>,
    /// Lowest scores first; never overlaps `high`.
    pub low: Vec<VolatilityProtocol>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketPhase {
    BullMarket,
    Growth,
    Consolidation,
    Correction,
    BearMarket,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainComparison {
    pub name: String,
    pub tvl: f64,
    pub dominance_percentage: f64,
    pub protocols: usize,
    pub change_7d: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalContext {
    pub all_time_high_estimate: f64,
    pub distance_from_ath_pct: f64,
    pub year_to_date_growth: f64,
    pub market_phase: MarketPhase,
}

/// Reference figures a response can be compared against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Benchmarks {
    pub total_tvl: f64,
    pub sector_average_tvl: f64,
    pub average_growth_7d: f64,
    pub protocols_per_chain: f64,
    /// At most five chains, largest first.
    pub chain_comparison: Vec<ChainComparison>,
    pub historical_context: HistoricalContext,
}
