//! Per-endpoint payload builders.
//!
//! Each builder is a pure function of validated options and one market
//! snapshot; fetching and caching happen in the assembler.

use crate::envelope::Payload;
use crate::error::IntelligenceError;
use crate::narrative;
use analytics::report::{DominanceEntry, EmergingProtocol, GroupDominanceEntry, MarketOverview};
use analytics::{
    AnalyticsEngine, ConcentrationMetrics, MoverProtocol, ProtocolFilter, TrendingProtocol,
    VolatilityReport, enrich_chains, safe_div,
};
use chrono::Utc;
use core_types::{Chain, HistoricalSeries, Protocol, Timeframe};
use serde::Serialize;
use std::collections::BTreeMap;
use validation::{
    ChainEcosystemOptions, ChainSort, ChainsOverviewOptions, Detail, DominanceOptions,
    DominanceSort, DominanceView, MoverDirection, MoversOptions, OverviewOptions, ProtocolSort,
    TrendingOptions, TrendingSort,
};

/// Provider records fetched for one computation.
#[derive(Debug, Clone, Default)]
pub struct MarketData {
    pub protocols: Vec<Protocol>,
    pub chains: Vec<Chain>,
    pub historical: Option<HistoricalSeries>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OverviewData {
    timeframe: Timeframe,
    summary: MarketOverview,
    top_protocols: Vec<DominanceEntry>,
    concentration: ConcentrationMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    categories: Option<Vec<GroupDominanceEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trending: Option<Vec<TrendingProtocol>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    emerging: Option<Vec<EmergingProtocol>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    volatility: Option<VolatilityReport>,
}

pub fn overview(
    engine: &AnalyticsEngine,
    market: &MarketData,
    options: &OverviewOptions,
) -> Result<Payload, IntelligenceError> {
    let scoped = ProtocolFilter::new(0.0)
        .with_categories(options.categories.clone())
        .with_chains(options.chains.clone())
        .apply(&market.protocols);
    let chains = enrich_chains(&market.chains, &market.protocols);

    let summary = engine.market_overview(&scoped, &chains, market.historical.as_ref(), options.timeframe);
    let dominance = engine.protocol_dominance(&scoped);
    let concentration = engine.concentration(&percentages(&dominance));
    let full = options.detail == Detail::Full;

    let top_count = match options.detail {
        Detail::Minimal => 5,
        Detail::Basic => 10,
        Detail::Full => 20,
    };
    let data = OverviewData {
        timeframe: options.timeframe,
        summary: summary.clone(),
        top_protocols: dominance.iter().take(top_count).cloned().collect(),
        concentration: concentration.clone(),
        categories: (options.detail != Detail::Minimal)
            .then(|| engine.category_dominance(&scoped).into_iter().take(10).collect()),
        trending: full.then(|| {
            engine
                .trending(&scoped, &[options.timeframe])
                .overall
                .into_iter()
                .take(10)
                .collect()
        }),
        emerging: full.then(|| engine.emergence(&scoped).into_iter().take(10).collect()),
        volatility: full.then(|| engine.volatility(&scoped)),
    };

    let benchmarks = options
        .include_benchmarks
        .then(|| engine.benchmarks(&market.protocols, &chains, market.historical.as_ref()));
    let emerging_leader = engine.emergence(&scoped).into_iter().next();
    let intelligence = narrative::overview(
        &summary,
        &concentration,
        benchmarks.as_ref(),
        emerging_leader.as_ref(),
        options.timeframe,
    );

    payload(data, intelligence, benchmarks, protocol_coverage(&scoped))
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum DominanceTable {
    Protocols(Vec<DominanceEntry>),
    Groups(Vec<GroupDominanceEntry>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DominanceData {
    view: DominanceView,
    total_tvl: f64,
    entry_count: usize,
    entries: DominanceTable,
    #[serde(skip_serializing_if = "Option::is_none")]
    concentration: Option<ConcentrationMetrics>,
}

pub fn dominance(
    engine: &AnalyticsEngine,
    market: &MarketData,
    options: &DominanceOptions,
) -> Result<Payload, IntelligenceError> {
    let scoped = ProtocolFilter::new(options.min_tvl as f64)
        .with_categories(options.categories.clone())
        .with_chains(options.chains.clone())
        .apply(&market.protocols);
    let total_tvl: f64 = scoped.iter().map(Protocol::tvl_or_zero).sum();

    let (shares, entry_count, leader, entries) = match options.view {
        DominanceView::Protocols => {
            let mut table = engine.protocol_dominance(&scoped);
            let shares = percentages(&table);
            let leader = table.first().map(|e| (e.name.clone(), e.dominance_percentage));
            let count = table.len();
            if options.sort_by == DominanceSort::Name {
                table.sort_by_key(|e| e.name.to_lowercase());
            }
            table.truncate(options.limit);
            (shares, count, leader, DominanceTable::Protocols(table))
        }
        DominanceView::Categories | DominanceView::Chains => {
            let mut table = if options.view == DominanceView::Categories {
                engine.category_dominance(&scoped)
            } else {
                engine.chain_dominance(&scoped)
            };
            let shares: Vec<f64> = table.iter().map(|e| e.dominance_percentage).collect();
            let leader = table.first().map(|e| (e.name.clone(), e.dominance_percentage));
            let count = table.len();
            if options.sort_by == DominanceSort::Name {
                table.sort_by_key(|e| e.name.to_lowercase());
            }
            table.truncate(options.limit);
            (shares, count, leader, DominanceTable::Groups(table))
        }
    };

    let concentration = engine.concentration(&shares);
    let intelligence = narrative::dominance(options.view, leader.as_ref(), &concentration);
    let data = DominanceData {
        view: options.view,
        total_tvl,
        entry_count,
        entries,
        concentration: options.include_concentration.then_some(concentration),
    };

    payload(data, intelligence, None, protocol_coverage(&scoped))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TrendingData {
    timeframes: BTreeMap<Timeframe, Vec<TrendingProtocol>>,
    overall: Vec<TrendingProtocol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    emerging: Option<Vec<EmergingProtocol>>,
}

pub fn trending(
    engine: &AnalyticsEngine,
    market: &MarketData,
    options: &TrendingOptions,
) -> Result<Payload, IntelligenceError> {
    let scoped = ProtocolFilter::new(options.min_tvl as f64)
        .with_categories(options.categories.clone())
        .with_chains(options.chains.clone())
        .apply(&market.protocols);
    let report = engine.trending(&scoped, &options.timeframes);
    let intelligence = narrative::trending(&report.overall, options.timeframes.len());

    let arrange = |mut table: Vec<TrendingProtocol>| {
        sort_trending(&mut table, options.sort_by);
        table.truncate(options.limit);
        table
    };
    let data = TrendingData {
        timeframes: report
            .by_timeframe
            .into_iter()
            .map(|(tf, table)| (tf, arrange(table)))
            .collect(),
        overall: arrange(report.overall),
        emerging: (options.detail == Detail::Full)
            .then(|| engine.emergence(&scoped).into_iter().take(options.limit).collect()),
    };

    payload(data, intelligence, None, protocol_coverage(&scoped))
}

fn sort_trending(table: &mut [TrendingProtocol], sort_by: TrendingSort) {
    match sort_by {
        TrendingSort::TrendingScore => {}
        TrendingSort::GrowthRate => table.sort_by(|a, b| b.growth_rate.total_cmp(&a.growth_rate)),
        TrendingSort::Momentum => {
            table.sort_by(|a, b| b.momentum_score.total_cmp(&a.momentum_score))
        }
        TrendingSort::Tvl => table.sort_by(|a, b| b.tvl.total_cmp(&a.tvl)),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MoversData {
    timeframe: Timeframe,
    min_change: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    gainers: Option<Vec<MoverProtocol>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    losers: Option<Vec<MoverProtocol>>,
}

pub fn movers(
    engine: &AnalyticsEngine,
    market: &MarketData,
    options: &MoversOptions,
) -> Result<Payload, IntelligenceError> {
    let scoped = ProtocolFilter::new(options.min_tvl as f64)
        .with_categories(options.categories.clone())
        .with_chains(options.chains.clone())
        .apply(&market.protocols);
    let mut movers = engine.movers(&scoped, options.timeframe, options.min_change);
    let intelligence = narrative::movers(&movers, options.timeframe);

    movers.gainers.truncate(options.limit);
    movers.losers.truncate(options.limit);
    let wants_gainers = options.direction != MoverDirection::Losers;
    let wants_losers = options.direction != MoverDirection::Gainers;
    let data = MoversData {
        timeframe: options.timeframe,
        min_change: options.min_change,
        gainers: wants_gainers.then_some(movers.gainers),
        losers: wants_losers.then_some(movers.losers),
    };

    payload(data, intelligence, None, protocol_coverage(&scoped))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChainSummary {
    id: String,
    name: String,
    tvl: f64,
    protocol_count: usize,
    change_1d: f64,
    change_7d: f64,
    /// Chain TVL as a percentage of all chains.
    market_share: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChainProtocolEntry {
    id: String,
    name: String,
    category: String,
    tvl: f64,
    change_1d: f64,
    change_7d: f64,
    share_of_chain: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChainEcosystemData {
    chain: ChainSummary,
    protocols: Vec<ChainProtocolEntry>,
    concentration: ConcentrationMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    categories: Option<Vec<GroupDominanceEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trending_leaders: Option<Vec<TrendingProtocol>>,
}

/// `provider_name` is the provider's label for the validated chain id.
pub fn chain_ecosystem(
    engine: &AnalyticsEngine,
    market: &MarketData,
    options: &ChainEcosystemOptions,
    provider_name: &str,
) -> Result<Payload, IntelligenceError> {
    let chains = enrich_chains(&market.chains, &market.protocols);
    let record = chains
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(provider_name))
        .ok_or_else(|| {
            IntelligenceError::NotFound(format!("Chain '{}' not found", options.chain))
        })?;

    let on_chain: Vec<Protocol> = market
        .protocols
        .iter()
        .filter(|p| p.is_on_chain(provider_name))
        .cloned()
        .collect();
    let scoped = ProtocolFilter::new(0.0)
        .with_categories(options.categories.clone())
        .apply(&on_chain);
    let scoped_tvl: f64 = scoped.iter().map(Protocol::tvl_or_zero).sum();
    let all_chains_tvl: f64 = market.chains.iter().map(Chain::tvl_or_zero).sum();

    let summary = ChainSummary {
        id: options.chain.clone(),
        name: record.name.clone(),
        tvl: record.tvl_or_zero(),
        protocol_count: on_chain.len(),
        change_1d: record.change_for(Timeframe::OneDay),
        change_7d: record.change_for(Timeframe::SevenDays),
        market_share: safe_div(record.tvl_or_zero(), all_chains_tvl) * 100.0,
    };

    let mut protocols: Vec<ChainProtocolEntry> = scoped
        .iter()
        .map(|p| ChainProtocolEntry {
            id: p.id.clone(),
            name: p.name.clone(),
            category: p.category_or_default().to_string(),
            tvl: p.tvl_or_zero(),
            change_1d: p.change_for(Timeframe::OneDay),
            change_7d: p.change_for(Timeframe::SevenDays),
            share_of_chain: safe_div(p.tvl_or_zero(), scoped_tvl) * 100.0,
        })
        .collect();
    match options.sort_by {
        ProtocolSort::Tvl => protocols.sort_by(|a, b| b.tvl.total_cmp(&a.tvl)),
        ProtocolSort::Change1d => protocols.sort_by(|a, b| b.change_1d.total_cmp(&a.change_1d)),
        ProtocolSort::Change7d => protocols.sort_by(|a, b| b.change_7d.total_cmp(&a.change_7d)),
        ProtocolSort::Name => protocols.sort_by_key(|e| e.name.to_lowercase()),
    }
    protocols.truncate(options.limit);

    let concentration = engine.concentration(&percentages(&engine.protocol_dominance(&scoped)));
    let categories = engine.category_dominance(&scoped);
    let intelligence = narrative::chain_ecosystem(
        &summary.name,
        summary.change_7d,
        &concentration,
        categories.first(),
    );

    let full = options.detail == Detail::Full;
    let benchmarks =
        full.then(|| engine.benchmarks(&market.protocols, &chains, market.historical.as_ref()));
    let data = ChainEcosystemData {
        chain: summary,
        protocols,
        concentration,
        categories: (options.detail != Detail::Minimal).then_some(categories),
        trending_leaders: full.then(|| {
            engine
                .trending(&scoped, &[Timeframe::SevenDays])
                .overall
                .into_iter()
                .take(5)
                .collect()
        }),
    };

    payload(data, intelligence, benchmarks, protocol_coverage(&scoped))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChainEntry {
    name: String,
    tvl: f64,
    protocols: usize,
    change_1d: f64,
    change_7d: f64,
    dominance_percentage: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChainsOverviewData {
    total_tvl: f64,
    chain_count: usize,
    chains: Vec<ChainEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    concentration: Option<ConcentrationMetrics>,
}

pub fn chains_overview(
    engine: &AnalyticsEngine,
    market: &MarketData,
    options: &ChainsOverviewOptions,
) -> Result<Payload, IntelligenceError> {
    let chains = enrich_chains(&market.chains, &market.protocols);
    let table = engine.chain_table_dominance(&chains);
    let concentration = engine.concentration(&percentages_of_groups(&table));
    let total_tvl: f64 = table.iter().map(|e| e.tvl).sum();

    let mut entries: Vec<ChainEntry> = table
        .iter()
        .filter(|e| e.tvl >= options.min_tvl as f64)
        .map(|e| {
            let record = chains.iter().find(|c| c.name == e.name);
            ChainEntry {
                name: e.name.clone(),
                tvl: e.tvl,
                protocols: e.protocol_count,
                change_1d: record.map_or(0.0, |c| c.change_for(Timeframe::OneDay)),
                change_7d: record.map_or(0.0, |c| c.change_for(Timeframe::SevenDays)),
                dominance_percentage: e.dominance_percentage,
            }
        })
        .collect();
    match options.sort_by {
        ChainSort::Tvl | ChainSort::Dominance => {}
        ChainSort::Protocols => entries.sort_by(|a, b| b.protocols.cmp(&a.protocols)),
        ChainSort::Change1d => entries.sort_by(|a, b| b.change_1d.total_cmp(&a.change_1d)),
        ChainSort::Change7d => entries.sort_by(|a, b| b.change_7d.total_cmp(&a.change_7d)),
    }
    let chain_count = entries.len();
    entries.truncate(options.limit);

    let intelligence = narrative::chains_overview(&table, &concentration);
    let benchmarks = options
        .include_benchmarks
        .then(|| engine.benchmarks(&market.protocols, &chains, market.historical.as_ref()));
    let data = ChainsOverviewData {
        total_tvl,
        chain_count,
        chains: entries,
        concentration: (options.detail != Detail::Minimal).then_some(concentration),
    };

    let live = chains.iter().filter(|c| c.tvl_or_zero() > 0.0).count();
    let coverage = safe_div(live as f64, chains.len() as f64);
    payload(data, intelligence, benchmarks, coverage)
}

fn payload<T: Serialize>(
    data: T,
    intelligence: crate::envelope::Intelligence,
    benchmarks: Option<analytics::Benchmarks>,
    coverage: f64,
) -> Result<Payload, IntelligenceError> {
    Ok(Payload {
        data: serde_json::to_value(data)?,
        intelligence,
        benchmarks,
        computed_at: Utc::now(),
        coverage,
    })
}

fn percentages(table: &[DominanceEntry]) -> Vec<f64> {
    table.iter().map(|e| e.dominance_percentage).collect()
}

fn percentages_of_groups(table: &[GroupDominanceEntry]) -> Vec<f64> {
    table.iter().map(|e| e.dominance_percentage).collect()
}

/// Fraction of records with a positive TVL.
fn protocol_coverage(protocols: &[Protocol]) -> f64 {
    let live = protocols.iter().filter(|p| p.tvl_or_zero() > 0.0).count();
    safe_div(live as f64, protocols.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market() -> MarketData {
        let mut aave = Protocol::new("aave", "Aave", 600e6);
        aave.category = Some("Lending".into());
        aave.chains = vec!["Ethereum".into(), "Polygon".into()];
        aave.change_1d = Some(4.0);
        aave.change_7d = Some(12.0);

        let mut uni = Protocol::new("uniswap", "Uniswap", 300e6);
        uni.category = Some("Dexes".into());
        uni.chains = vec!["Ethereum".into()];
        uni.change_1d = Some(-6.0);
        uni.change_7d = Some(-2.0);

        let mut jup = Protocol::new("jupiter", "Jupiter", 100e6);
        jup.category = Some("Dexes".into());
        jup.chains = vec!["Solana".into()];
        jup.change_1d = Some(25.0);

        let mut eth = Chain::new("Ethereum", 900e6, 0);
        eth.change_7d = Some(3.0);
        MarketData {
            protocols: vec![aave, uni, jup, Protocol::new("dead", "Dead", 0.0)],
            chains: vec![eth, Chain::new("Solana", 100e6, 0)],
            historical: None,
        }
    }

    fn data(payload: &Payload) -> &serde_json::Value {
        &payload.data
    }

    #[test]
    fn test_dominance_view_and_limit() {
        let engine = AnalyticsEngine::new();
        let options = DominanceOptions {
            view: DominanceView::Protocols,
            limit: 2,
            min_tvl: 0,
            categories: None,
            chains: None,
            sort_by: DominanceSort::Tvl,
            include_concentration: true,
        };
        let payload = dominance(&engine, &market(), &options).unwrap();
        let entries = data(&payload)["entries"].as_array().unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["id"], "aave");
        assert_eq!(data(&payload)["entryCount"], 3);
        let hhi = data(&payload)["concentration"]["hhi"].as_f64().unwrap();
        assert!((hhi - 0.46).abs() < 1e-9);
        assert!((payload.coverage - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_dominance_by_category_filtered() {
        let engine = AnalyticsEngine::new();
        let options = DominanceOptions {
            view: DominanceView::Categories,
            limit: 10,
            min_tvl: 0,
            categories: Some(vec!["dexes".into()]),
            chains: None,
            sort_by: DominanceSort::Name,
            include_concentration: false,
        };
        let payload = dominance(&engine, &market(), &options).unwrap();
        let entries = data(&payload)["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["name"], "Dexes");
        assert_eq!(entries[0]["protocolCount"], 2);
        assert!(data(&payload).get("concentration").is_none());
    }

    #[test]
    fn test_movers_direction() {
        let engine = AnalyticsEngine::new();
        let options = MoversOptions {
            timeframe: Timeframe::OneDay,
            direction: MoverDirection::Losers,
            limit: 10,
            min_tvl: 1_000_000,
            min_change: 1.0,
            categories: None,
            chains: None,
        };
        let payload = movers(&engine, &market(), &options).unwrap();
        assert!(data(&payload).get("gainers").is_none());
        let losers = data(&payload)["losers"].as_array().unwrap();
        assert_eq!(losers.len(), 1);
        assert_eq!(losers[0]["id"], "uniswap");
    }

    #[test]
    fn test_chain_ecosystem_scopes_to_chain() {
        let engine = AnalyticsEngine::new();
        let options = ChainEcosystemOptions {
            chain: "ethereum".into(),
            detail: Detail::Basic,
            limit: 20,
            sort_by: ProtocolSort::Change1d,
            categories: None,
        };
        let payload = chain_ecosystem(&engine, &market(), &options, "Ethereum").unwrap();
        let protocols = data(&payload)["protocols"].as_array().unwrap();
        assert_eq!(protocols.len(), 2);
        assert_eq!(protocols[0]["id"], "aave");
        assert_eq!(data(&payload)["chain"]["protocolCount"], 2);
        assert!((data(&payload)["chain"]["marketShare"].as_f64().unwrap() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_chain_ecosystem_missing_chain() {
        let engine = AnalyticsEngine::new();
        let options = ChainEcosystemOptions {
            chain: "fantom".into(),
            detail: Detail::Basic,
            limit: 20,
            sort_by: ProtocolSort::Tvl,
            categories: None,
        };
        let err = chain_ecosystem(&engine, &market(), &options, "Fantom").unwrap_err();
        assert!(matches!(err, IntelligenceError::NotFound(_)));
    }

    #[test]
    fn test_chains_overview_counts_protocols() {
        let engine = AnalyticsEngine::new();
        let options = ChainsOverviewOptions {
            limit: 25,
            min_tvl: 0,
            sort_by: ChainSort::Protocols,
            detail: Detail::Basic,
            include_benchmarks: true,
        };
        let payload = chains_overview(&engine, &market(), &options).unwrap();
        let chains = data(&payload)["chains"].as_array().unwrap();
        assert_eq!(chains[0]["name"], "Ethereum");
        assert_eq!(chains[0]["protocols"], 2);
        assert!(payload.benchmarks.is_some());
        assert_eq!(payload.coverage, 1.0);
    }

    #[test]
    fn test_chains_overview_sorts_by_derived_change() {
        let engine = AnalyticsEngine::new();
        let options = ChainsOverviewOptions {
            limit: 25,
            min_tvl: 0,
            sort_by: ChainSort::Change1d,
            detail: Detail::Minimal,
            include_benchmarks: false,
        };
        // Neither chain record carries a 1d change, so both come from their protocols.
        let payload = chains_overview(&engine, &market(), &options).unwrap();
        let chains = data(&payload)["chains"].as_array().unwrap();
        assert_eq!(chains[0]["name"], "Solana");
        assert!((chains[0]["change1d"].as_f64().unwrap() - 25.0).abs() < 1e-9);
        // (600 * 4 + 300 * -6) / 900
        assert!((chains[1]["change1d"].as_f64().unwrap() - 2.0 / 3.0).abs() < 1e-9);
        assert!((chains[1]["change7d"].as_f64().unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_market_degrades_gracefully() {
        let engine = AnalyticsEngine::new();
        let options = OverviewOptions {
            detail: Detail::Full,
            timeframe: Timeframe::OneDay,
            categories: None,
            chains: None,
            include_benchmarks: true,
        };
        let payload = overview(&engine, &MarketData::default(), &options).unwrap();
        assert_eq!(data(&payload)["topProtocols"].as_array().unwrap().len(), 0);
        assert_eq!(payload.coverage, 0.0);
        assert!(!payload.intelligence.insights.is_empty());
    }
}
