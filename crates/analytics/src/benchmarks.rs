use crate::dominance::chain_table_dominance;
use crate::engine::safe_div;
use crate::report::{Benchmarks, ChainComparison, HistoricalContext, MarketPhase};
use core_types::{Chain, HistoricalSeries, Protocol, Timeframe};

const COMPARISON_SIZE: usize = 5;

pub fn market_phase(average_growth: f64) -> MarketPhase {
    if average_growth > 15.0 {
        MarketPhase::BullMarket
    } else if average_growth < -15.0 {
        MarketPhase::BearMarket
    } else if average_growth > 5.0 {
        MarketPhase::Growth
    } else if average_growth > -5.0 {
        MarketPhase::Consolidation
    } else {
        MarketPhase::Correction
    }
}

/// Mean 7d change over the protocols that report one.
pub fn average_growth_7d(protocols: &[Protocol]) -> f64 {
    let changes: Vec<f64> = protocols
        .iter()
        .filter(|p| p.change_7d.is_some_and(f64::is_finite))
        .map(|p| p.change_for(Timeframe::SevenDays))
        .collect();
    safe_div(changes.iter().sum(), changes.len() as f64)
}

/// ATH estimate, distance from it and year-to-date growth.
///
/// The ATH is the larger of the series maximum and `current_total`, so a
/// missing series still yields a usable (zero-distance) context.
pub fn historical_context(
    current_total: f64,
    historical: Option<&HistoricalSeries>,
    average_growth: f64,
) -> HistoricalContext {
    let series_max = historical.and_then(HistoricalSeries::max_value).unwrap_or(0.0);
    let ath = series_max.max(current_total);
    HistoricalContext {
        all_time_high_estimate: ath,
        distance_from_ath_pct: safe_div(current_total - ath, ath) * 100.0,
        year_to_date_growth: historical
            .and_then(HistoricalSeries::year_to_date_growth_pct)
            .unwrap_or(0.0),
        market_phase: market_phase(average_growth),
    }
}

/// Reference figures over the whole (unfiltered) market.
///
/// `chains` should already carry protocol counts. Total TVL is the chain total
/// when chain records exist, the protocol total otherwise.
pub fn benchmarks(
    protocols: &[Protocol],
    chains: &[Chain],
    historical: Option<&HistoricalSeries>,
) -> Benchmarks {
    let live: Vec<&Protocol> = protocols.iter().filter(|p| p.tvl_or_zero() > 0.0).collect();
    let protocol_total: f64 = live.iter().map(|p| p.tvl_or_zero()).sum();
    let chain_total: f64 = chains.iter().map(Chain::tvl_or_zero).sum();
    let total_tvl = if chain_total > 0.0 { chain_total } else { protocol_total };

    let average_growth = average_growth_7d(protocols);

    let chain_comparison = chain_table_dominance(chains)
        .into_iter()
        .take(COMPARISON_SIZE)
        .map(|entry| {
            let change_7d = chains
                .iter()
                .find(|c| c.name == entry.name)
                .map(|c| c.change_for(Timeframe::SevenDays))
                .unwrap_or(0.0);
            ChainComparison {
                name: entry.name,
                tvl: entry.tvl,
                dominance_percentage: entry.dominance_percentage,
                protocols: entry.protocol_count,
                change_7d,
            }
        })
        .collect();

    Benchmarks {
        total_tvl,
        sector_average_tvl: safe_div(protocol_total, live.len() as f64),
        average_growth_7d: average_growth,
        protocols_per_chain: safe_div(live.len() as f64, chains.len() as f64),
        chain_comparison,
        historical_context: historical_context(total_tvl, historical, average_growth),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_phase_ladder() {
        assert_eq!(market_phase(20.0), MarketPhase::BullMarket);
        assert_eq!(market_phase(15.0), MarketPhase::Growth);
        assert_eq!(market_phase(0.0), MarketPhase::Consolidation);
        assert_eq!(market_phase(-5.0), MarketPhase::Correction);
        assert_eq!(market_phase(-15.0), MarketPhase::Correction);
        assert_eq!(market_phase(-15.1), MarketPhase::BearMarket);
    }

    #[test]
    fn test_benchmarks_over_small_market() {
        let mut a = Protocol::new("a", "A", 300.0);
        a.change_7d = Some(10.0);
        let mut b = Protocol::new("b", "B", 100.0);
        b.change_7d = Some(30.0);
        let c = Protocol::new("c", "C", 0.0);

        let chains: Vec<Chain> = (0..7)
            .map(|i| Chain::new(format!("chain-{}", i), 100.0 * (i + 1) as f64, i))
            .collect();
        let bench = benchmarks(&[a, b, c], &chains, None);

        assert!((bench.total_tvl - 2800.0).abs() < 1e-9);
        assert!((bench.sector_average_tvl - 200.0).abs() < 1e-9);
        assert!((bench.average_growth_7d - 20.0).abs() < 1e-9);
        assert!((bench.protocols_per_chain - 2.0 / 7.0).abs() < 1e-9);
        assert_eq!(bench.chain_comparison.len(), 5);
        assert_eq!(bench.chain_comparison[0].name, "chain-6");
        assert_eq!(bench.historical_context.market_phase, MarketPhase::BullMarket);
        assert_eq!(bench.historical_context.distance_from_ath_pct, 0.0);
    }

    #[test]
    fn test_historical_context_uses_series() {
        let ts = |m| Utc.with_ymd_and_hms(2026, m, 1, 0, 0, 0).unwrap();
        let series = HistoricalSeries::new(vec![(ts(1), 100.0), (ts(3), 200.0), (ts(6), 150.0)]);
        let ctx = historical_context(150.0, Some(&series), 0.0);
        assert_eq!(ctx.all_time_high_estimate, 200.0);
        assert!((ctx.distance_from_ath_pct + 25.0).abs() < 1e-9);
        assert!((ctx.year_to_date_growth - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_market() {
        let bench = benchmarks(&[], &[], None);
        assert_eq!(bench.total_tvl, 0.0);
        assert_eq!(bench.sector_average_tvl, 0.0);
        assert_eq!(bench.protocols_per_chain, 0.0);
        assert!(bench.chain_comparison.is_empty());
        assert_eq!(bench.historical_context.distance_from_ath_pct, 0.0);
    }
}
