use crate::benchmarks;
use crate::concentration;
use crate::dominance;
use crate::movers;
use crate::report::{
    Benchmarks, ConcentrationMetrics, DominanceEntry, EmergingProtocol, GroupDominanceEntry,
    MarketOverview, Movers, TrendingReport, VolatilityReport,
};
use crate::scoring;
use crate::trending;
use chrono::Duration;
use core_types::{Chain, HistoricalSeries, Protocol, Timeframe};
use std::collections::BTreeMap;

pub use core_types::LIQUIDITY_FLOOR;

/// `numerator / denominator`, or zero when the denominator is zero or not finite.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        0.0
    } else {
        numerator / denominator
    }
}

/// Percentage change of the total-TVL series over `timeframe`.
///
/// The baseline is the latest point at least one window before the last point.
/// Missing data is not an error: it yields 0.
pub fn market_growth(historical: Option<&HistoricalSeries>, timeframe: Timeframe) -> f64 {
    let Some(series) = historical.filter(|s| !s.is_empty()) else {
        tracing::debug!(%timeframe, "Insufficient data for growth calculation: no historical series.");
        return 0.0;
    };
    let Some((last_ts, last)) = series.points.last() else {
        return 0.0;
    };

    let window = Duration::seconds((timeframe.days() * 86_400.0) as i64);
    let cutoff = *last_ts - window;
    match series.points.iter().rev().find(|(ts, _)| *ts <= cutoff) {
        Some((_, base)) if *base > 0.0 => (last - base) / base * 100.0,
        _ => {
            tracing::debug!(
                %timeframe,
                points = series.points.len(),
                "Insufficient data for growth calculation: series shorter than the window."
            );
            0.0
        }
    }
}

/// Fills in each chain's protocol count from the protocol list, plus any
/// change the provider left out as the TVL-weighted change of its protocols.
pub fn enrich_chains(chains: &[Chain], protocols: &[Protocol]) -> Vec<Chain> {
    chains
        .iter()
        .map(|chain| {
            let on_chain: Vec<&Protocol> =
                protocols.iter().filter(|p| p.is_on_chain(&chain.name)).collect();
            Chain {
                protocols: on_chain.len(),
                change_1d: chain
                    .change_1d
                    .or_else(|| weighted_change(&on_chain, |p| p.change_1d)),
                change_7d: chain
                    .change_7d
                    .or_else(|| weighted_change(&on_chain, |p| p.change_7d)),
                change_30d: chain
                    .change_30d
                    .or_else(|| weighted_change(&on_chain, |p| p.change_30d)),
                ..chain.clone()
            }
        })
        .collect()
}

/// TVL-weighted mean of a change field over the protocols that report it.
fn weighted_change(protocols: &[&Protocol], field: impl Fn(&Protocol) -> Option<f64>) -> Option<f64> {
    let (weighted, weight) = protocols
        .iter()
        .filter_map(|p| {
            let change = field(p).filter(|c| c.is_finite())?;
            Some((change * p.tvl_or_zero(), p.tvl_or_zero()))
        })
        .fold((0.0, 0.0), |(sum, total), (w, t)| (sum + w, total + t));
    (weight > 0.0).then(|| weighted / weight)
}

/// A stateless calculator for deriving market statistics from provider snapshots.
///
/// Every method is a pure function of its inputs. Empty input produces empty
/// tables and zeroed figures, never an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Headline figures for the overview endpoint.
    pub fn market_overview(
        &self,
        protocols: &[Protocol],
        chains: &[Chain],
        historical: Option<&HistoricalSeries>,
        timeframe: Timeframe,
    ) -> MarketOverview {
        let live: Vec<&Protocol> = protocols.iter().filter(|p| p.tvl_or_zero() > 0.0).collect();
        let total_tvl: f64 = live.iter().map(|p| p.tvl_or_zero()).sum();
        let weighted: f64 = live
            .iter()
            .map(|p| p.tvl_or_zero() * p.change_for(timeframe))
            .sum();

        MarketOverview {
            total_tvl,
            protocol_count: live.len(),
            chain_count: chains.iter().filter(|c| c.tvl_or_zero() > 0.0).count(),
            weighted_change: safe_div(weighted, total_tvl),
            market_growth: market_growth(historical, timeframe),
            gaining_protocols: live.iter().filter(|p| p.change_for(timeframe) > 0.0).count(),
            losing_protocols: live.iter().filter(|p| p.change_for(timeframe) < 0.0).count(),
        }
    }

    pub fn protocol_dominance(&self, protocols: &[Protocol]) -> Vec<DominanceEntry> {
        dominance::protocol_dominance(protocols)
    }

    pub fn category_dominance(&self, protocols: &[Protocol]) -> Vec<GroupDominanceEntry> {
        dominance::category_dominance(protocols)
    }

    pub fn chain_dominance(&self, protocols: &[Protocol]) -> Vec<GroupDominanceEntry> {
        dominance::chain_dominance(protocols)
    }

    pub fn chain_table_dominance(&self, chains: &[Chain]) -> Vec<GroupDominanceEntry> {
        dominance::chain_table_dominance(chains)
    }

    /// Concentration of a dominance table given as percentages, largest first.
    pub fn concentration(&self, percentages: &[f64]) -> ConcentrationMetrics {
        concentration::concentration_metrics(percentages)
    }

    /// One trending table per requested timeframe plus the averaged overall ranking.
    pub fn trending(&self, protocols: &[Protocol], timeframes: &[Timeframe]) -> TrendingReport {
        let by_timeframe: BTreeMap<Timeframe, _> = timeframes
            .iter()
            .map(|tf| (*tf, trending::trending_protocols(protocols, *tf)))
            .collect();
        let tables: Vec<_> = by_timeframe.values().cloned().collect();
        TrendingReport {
            overall: trending::overall_trending(&tables),
            by_timeframe,
        }
    }

    pub fn movers(&self, protocols: &[Protocol], timeframe: Timeframe, min_change: f64) -> Movers {
        movers::top_movers(protocols, timeframe, min_change)
    }

    pub fn emergence(&self, protocols: &[Protocol]) -> Vec<EmergingProtocol> {
        scoring::emergence_scores(protocols)
    }

    pub fn volatility(&self, protocols: &[Protocol]) -> VolatilityReport {
        scoring::volatility_report(protocols)
    }

    pub fn benchmarks(
        &self,
        protocols: &[Protocol],
        chains: &[Chain],
        historical: Option<&HistoricalSeries>,
    ) -> Benchmarks {
        benchmarks::benchmarks(protocols, chains, historical)
    }
}
