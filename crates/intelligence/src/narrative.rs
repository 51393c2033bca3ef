//! Fixed-template insights, recommendations and context labels.

use crate::envelope::{Intelligence, Recommendation, RecommendationType, RiskLevel};
use analytics::report::{EmergingProtocol, GroupDominanceEntry, MarketOverview};
use analytics::{
    Benchmarks, ConcentrationLevel, ConcentrationMetrics, MarketPhase, Movers, TrendingProtocol,
};
use core_types::Timeframe;
use validation::DominanceView;

/// "$1.23B", "$45.60M", "$980.00K" or plain dollars below a thousand.
pub fn format_usd(value: f64) -> String {
    let abs = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };
    if abs >= 1e9 {
        format!("{}${:.2}B", sign, abs / 1e9)
    } else if abs >= 1e6 {
        format!("{}${:.2}M", sign, abs / 1e6)
    } else if abs >= 1e3 {
        format!("{}${:.2}K", sign, abs / 1e3)
    } else {
        format!("{}${:.2}", sign, abs)
    }
}

pub fn concentration_label(level: ConcentrationLevel) -> &'static str {
    match level {
        ConcentrationLevel::Low => "low",
        ConcentrationLevel::Moderate => "moderate",
        ConcentrationLevel::High => "high",
    }
}

pub fn phase_label(phase: MarketPhase) -> &'static str {
    match phase {
        MarketPhase::BullMarket => "bull_market",
        MarketPhase::Growth => "growth",
        MarketPhase::Consolidation => "consolidation",
        MarketPhase::Correction => "correction",
        MarketPhase::BearMarket => "bear_market",
    }
}

pub fn sentiment(change: f64) -> &'static str {
    if change > 2.0 {
        "bullish"
    } else if change < -2.0 {
        "bearish"
    } else {
        "neutral"
    }
}

fn describe_concentration(intel: &mut Intelligence, subject: &str, metrics: &ConcentrationMetrics) {
    if metrics.entity_count == 0 {
        return;
    }
    intel.insight(format!(
        "{} concentration is {} (HHI {:.3}); the top 5 hold {:.1}% of TVL.",
        subject,
        concentration_label(metrics.level),
        metrics.hhi,
        metrics.top5_concentration
    ));
    intel.label("concentrationLevel", concentration_label(metrics.level));
    if metrics.level == ConcentrationLevel::High {
        intel.recommend(
            Recommendation::new(
                RecommendationType::Warning,
                format!("{} TVL is concentrated in few hands; single-protocol failures carry systemic weight.", subject),
                0.8,
            )
            .with_risk(RiskLevel::High),
        );
    }
}

pub fn overview(
    summary: &MarketOverview,
    concentration: &ConcentrationMetrics,
    benchmarks: Option<&Benchmarks>,
    emerging_leader: Option<&EmergingProtocol>,
    timeframe: Timeframe,
) -> Intelligence {
    let mut intel = Intelligence::default();
    intel.label("timeframe", timeframe.as_str());
    intel.label("sentiment", sentiment(summary.weighted_change));

    if summary.protocol_count == 0 {
        intel.insight("No protocol data matched the requested filters.");
        return intel;
    }

    intel.insight(format!(
        "Total value locked stands at {} across {} protocols.",
        format_usd(summary.total_tvl),
        summary.protocol_count
    ));
    intel.insight(format!(
        "TVL-weighted change over {} is {:+.2}%, with {} protocols gaining and {} losing.",
        timeframe, summary.weighted_change, summary.gaining_protocols, summary.losing_protocols
    ));
    describe_concentration(&mut intel, "Market", concentration);

    if let Some(bench) = benchmarks {
        let ctx = &bench.historical_context;
        intel.label("marketPhase", phase_label(ctx.market_phase));
        if ctx.distance_from_ath_pct < -20.0 {
            intel.insight(format!(
                "Market TVL sits {:.1}% below its all-time high.",
                -ctx.distance_from_ath_pct
            ));
        }
        match ctx.market_phase {
            MarketPhase::BullMarket | MarketPhase::Growth => intel.recommend(
                Recommendation::new(
                    RecommendationType::Timing,
                    "Broad 7d growth favours momentum positioning; size entries to tolerate reversals.",
                    0.6,
                )
                .with_risk(RiskLevel::Medium),
            ),
            MarketPhase::BearMarket | MarketPhase::Correction => intel.recommend(
                Recommendation::new(
                    RecommendationType::Strategy,
                    "Average 7d growth is negative; prefer established protocols and stable yields.",
                    0.65,
                )
                .with_risk(RiskLevel::Low),
            ),
            MarketPhase::Consolidation => {}
        }
    }

    if let Some(leader) = emerging_leader {
        intel.recommend(
            Recommendation::new(
                RecommendationType::Opportunity,
                format!(
                    "{} ({}) leads emerging protocols with a score of {:.0}.",
                    leader.name,
                    format_usd(leader.tvl),
                    leader.emergence_score
                ),
                (leader.emergence_score / 100.0) * 0.7,
            )
            .with_risk(RiskLevel::High),
        );
    }

    intel
}

pub fn dominance(
    view: DominanceView,
    leader: Option<&(String, f64)>,
    concentration: &ConcentrationMetrics,
) -> Intelligence {
    let mut intel = Intelligence::default();
    let subject = match view {
        DominanceView::Protocols => "Protocol",
        DominanceView::Categories => "Category",
        DominanceView::Chains => "Chain",
    };

    match leader {
        Some((name, share)) => {
            intel.insight(format!("{} leads with {:.1}% of TVL.", name, share));
            if *share > 50.0 {
                intel.recommend(
                    Recommendation::new(
                        RecommendationType::Warning,
                        format!("{} holds a majority share; diversify exposure away from it.", name),
                        0.75,
                    )
                    .with_risk(RiskLevel::High),
                );
            }
        }
        None => intel.insight("No entries with positive TVL matched the requested filters."),
    }
    describe_concentration(&mut intel, subject, concentration);

    if concentration.level == ConcentrationLevel::Low && concentration.entity_count > 1 {
        intel.recommend(Recommendation::new(
            RecommendationType::Strategy,
            "TVL is spread widely; challengers can gain share without displacing a single incumbent.",
            0.55,
        ));
    }
    intel
}

pub fn trending(overall: &[TrendingProtocol], timeframe_count: usize) -> Intelligence {
    let mut intel = Intelligence::default();
    intel.label("timeframesAnalyzed", timeframe_count.to_string());

    let Some(top) = overall.first() else {
        intel.insight("No protocol above the liquidity floor shows positive momentum.");
        intel.label("sentiment", "bearish");
        return intel;
    };

    intel.insight(format!(
        "{} protocols are trending; {} leads with a score of {:.1}.",
        overall.len(),
        top.name,
        top.trending_score
    ));
    intel.label("sentiment", if overall.len() >= 5 { "bullish" } else { "neutral" });

    let accelerating = overall.iter().filter(|t| t.momentum_score > 0.0).count();
    if accelerating > 0 {
        intel.insight(format!("{} of them are accelerating.", accelerating));
    }
    intel.recommend(
        Recommendation::new(
            RecommendationType::Opportunity,
            format!("Watch {} for continuation; trending scores revert quickly.", top.name),
            (top.trending_score / 100.0).clamp(0.3, 0.8),
        )
        .with_risk(RiskLevel::Medium),
    );
    intel
}

pub fn movers(movers: &Movers, timeframe: Timeframe) -> Intelligence {
    let mut intel = Intelligence::default();
    intel.label("timeframe", timeframe.as_str());

    let gainers = movers.gainers.len();
    let losers = movers.losers.len();
    intel.insight(format!(
        "{} gainers and {} losers moved significantly over {}.",
        gainers, losers, timeframe
    ));
    let balance = if gainers > losers * 2 {
        "bullish"
    } else if losers > gainers * 2 {
        "bearish"
    } else {
        "neutral"
    };
    intel.label("sentiment", balance);

    if let Some(top) = movers.gainers.first() {
        intel.insight(format!("{} gained {:+.2}%.", top.name, top.change_percent));
        if top.change_percent > 50.0 {
            intel.recommend(
                Recommendation::new(
                    RecommendationType::Warning,
                    format!("{} moved more than 50%; verify the cause before following.", top.name),
                    0.7,
                )
                .with_risk(RiskLevel::High),
            );
        }
    }
    if let Some(bottom) = movers.losers.first() {
        intel.insight(format!("{} fell {:.2}%.", bottom.name, bottom.change_percent));
        if bottom.change_percent < -20.0 {
            intel.recommend(
                Recommendation::new(
                    RecommendationType::Timing,
                    format!("{} drew down sharply; wait for stabilisation before adding exposure.", bottom.name),
                    0.6,
                )
                .with_risk(RiskLevel::Medium),
            );
        }
    }
    intel
}

pub fn chain_ecosystem(
    chain_name: &str,
    change_7d: f64,
    concentration: &ConcentrationMetrics,
    top_category: Option<&GroupDominanceEntry>,
) -> Intelligence {
    let mut intel = Intelligence::default();
    intel.label("chain", chain_name);
    intel.label("sentiment", sentiment(change_7d));

    intel.insight(format!("{} TVL changed {:+.2}% over 7d.", chain_name, change_7d));
    if let Some(category) = top_category {
        intel.insight(format!(
            "{} is the largest category on {} with {:.1}% of its TVL.",
            category.name, chain_name, category.dominance_percentage
        ));
    }
    describe_concentration(&mut intel, chain_name, concentration);

    if change_7d > 10.0 {
        intel.recommend(
            Recommendation::new(
                RecommendationType::Opportunity,
                format!("{} is attracting capital; newer protocols there may benefit.", chain_name),
                0.6,
            )
            .with_risk(RiskLevel::Medium),
        );
    } else if change_7d < -10.0 {
        intel.recommend(
            Recommendation::new(
                RecommendationType::Warning,
                format!("Capital is leaving {}; review positions on the chain.", chain_name),
                0.65,
            )
            .with_risk(RiskLevel::Medium),
        );
    }
    intel
}

pub fn chains_overview(table: &[GroupDominanceEntry], concentration: &ConcentrationMetrics) -> Intelligence {
    let mut intel = Intelligence::default();
    match table.first() {
        Some(leader) => intel.insight(format!(
            "{} chains hold TVL; {} leads with {:.1}%.",
            table.len(),
            leader.name,
            leader.dominance_percentage
        )),
        None => intel.insight("No chain reports positive TVL."),
    }
    describe_concentration(&mut intel, "Chain", concentration);
    if concentration.level != ConcentrationLevel::High && table.len() > 1 {
        intel.recommend(Recommendation::new(
            RecommendationType::Strategy,
            "Multi-chain deployment reaches a meaningful share of TVL beyond the leading chain.",
            0.5,
        ));
    }
    intel
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::concentration::concentration_metrics;

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(1_234_000_000.0), "$1.23B");
        assert_eq!(format_usd(45_600_000.0), "$45.60M");
        assert_eq!(format_usd(-980_000.0), "-$980.00K");
        assert_eq!(format_usd(12.0), "$12.00");
    }

    #[test]
    fn test_high_concentration_warns() {
        let metrics = concentration_metrics(&[60.0, 30.0, 10.0]);
        let intel = dominance(DominanceView::Protocols, Some(&("Aave".to_string(), 60.0)), &metrics);

        assert_eq!(intel.context["concentrationLevel"], "high");
        assert!(intel.recommendations.iter().all(|r| (0.0..=1.0).contains(&r.confidence)));
        assert_eq!(
            intel
                .recommendations
                .iter()
                .filter(|r| r.kind == RecommendationType::Warning)
                .count(),
            2
        );
    }

    #[test]
    fn test_empty_trending_is_explained() {
        let intel = trending(&[], 1);
        assert_eq!(intel.insights.len(), 1);
        assert!(intel.recommendations.is_empty());
    }

    #[test]
    fn test_sentiment_thresholds() {
        assert_eq!(sentiment(2.5), "bullish");
        assert_eq!(sentiment(-2.5), "bearish");
        assert_eq!(sentiment(2.0), "neutral");
    }
}
