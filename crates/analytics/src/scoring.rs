use crate::report::{EmergingProtocol, VolatilityProtocol, VolatilityReport};
use core_types::{Protocol, Timeframe};

const EMERGENCE_MIN_TVL: f64 = 1_000_000.0;
const EMERGENCE_MAX_TVL: f64 = 50_000_000.0;
const VOLATILITY_MIN_TVL: f64 = 10_000_000.0;
const VOLATILITY_BUCKET: usize = 5;

/// Scores protocols inside the (1M, 50M) TVL band on how likely they are to break out.
///
/// - growth: 40% of the positive 7d change, capped at 40
/// - size: up to 30, falling linearly as TVL approaches the upper bound
/// - activity: 30% of `min(100, 10 * chain_count + 2 * |change_24h|)`
///
/// The total is clamped to [0, 100]; results are sorted highest first.
pub fn emergence_scores(protocols: &[Protocol]) -> Vec<EmergingProtocol> {
    let band = EMERGENCE_MAX_TVL - EMERGENCE_MIN_TVL;
    let mut scored: Vec<EmergingProtocol> = protocols
        .iter()
        .filter(|p| {
            let tvl = p.tvl_or_zero();
            tvl > EMERGENCE_MIN_TVL && tvl < EMERGENCE_MAX_TVL
        })
        .map(|p| {
            let tvl = p.tvl_or_zero();
            let growth = (0.4 * p.change_for(Timeframe::SevenDays).max(0.0)).min(40.0);
            let size = (30.0 * (1.0 - (tvl - EMERGENCE_MIN_TVL) / band)).clamp(0.0, 30.0);
            let activity = (10.0 * p.chains.len() as f64
                + 2.0 * p.change_for(Timeframe::OneDay).abs())
            .min(100.0);
            let activity_component = 0.3 * activity;

            EmergingProtocol {
                id: p.id.clone(),
                name: p.name.clone(),
                category: p.category_or_default().to_string(),
                tvl,
                growth_component: growth,
                size_component: size,
                activity_component,
                emergence_score: (growth + size + activity_component).clamp(0.0, 100.0),
            }
        })
        .collect();

    scored.sort_by(|a, b| b.emergence_score.total_cmp(&a.emergence_score));
    scored
}

pub fn volatility_score(protocol: &Protocol) -> f64 {
    0.7 * protocol.change_for(Timeframe::OneDay).abs()
        + 0.3 * protocol.change_for(Timeframe::SevenDays).abs()
}

/// The five most and five least volatile protocols above 10M TVL.
///
/// With fewer than ten candidates `low` only holds what is left after `high`.
pub fn volatility_report(protocols: &[Protocol]) -> VolatilityReport {
    let mut ranked: Vec<VolatilityProtocol> = protocols
        .iter()
        .filter(|p| p.tvl_or_zero() > VOLATILITY_MIN_TVL)
        .map(|p| VolatilityProtocol {
            id: p.id.clone(),
            name: p.name.clone(),
            tvl: p.tvl_or_zero(),
            change_24h: p.change_for(Timeframe::OneDay),
            change_7d: p.change_for(Timeframe::SevenDays),
            volatility_score: volatility_score(p),
        })
        .collect();
    ranked.sort_by(|a, b| b.volatility_score.total_cmp(&a.volatility_score));

    let split = VOLATILITY_BUCKET.min(ranked.len());
    let rest = ranked.split_off(split);
    let low: Vec<VolatilityProtocol> = rest.into_iter().rev().take(VOLATILITY_BUCKET).collect();

    VolatilityReport { high: ranked, low }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn protocol(id: &str, tvl: f64, d1: f64, d7: f64, chains: usize) -> Protocol {
        let mut p = Protocol::new(id, id, tvl);
        p.change_1d = Some(d1);
        p.change_7d = Some(d7);
        p.chains = (0..chains).map(|i| format!("chain-{}", i)).collect();
        p
    }

    #[test]
    fn test_emergence_band_and_components() {
        let protocols = vec![
            protocol("at-floor", 1e6, 50.0, 50.0, 1),
            protocol("at-ceiling", 5e7, 50.0, 50.0, 1),
            protocol("young", 2e6, 5.0, 50.0, 3),
        ];
        let scores = emergence_scores(&protocols);
        assert_eq!(scores.len(), 1);

        let young = &scores[0];
        assert!((young.growth_component - 20.0).abs() < 1e-9);
        assert!((young.size_component - 30.0 * (1.0 - 1e6 / 4.9e7)).abs() < 1e-9);
        assert!((young.activity_component - 0.3 * 40.0).abs() < 1e-9);
        assert!(young.emergence_score <= 100.0);
    }

    #[test]
    fn test_emergence_ignores_negative_growth_and_caps() {
        let protocols = vec![
            protocol("shrinking", 3e6, 0.0, -30.0, 0),
            protocol("rocket", 1.5e6, 80.0, 500.0, 20),
        ];
        let scores = emergence_scores(&protocols);
        assert_eq!(scores[0].id, "rocket");
        assert!((scores[0].growth_component - 40.0).abs() < 1e-9);
        assert!((scores[0].activity_component - 30.0).abs() < 1e-9);
        assert_eq!(scores[1].growth_component, 0.0);
        assert!(scores.iter().all(|s| (0.0..=100.0).contains(&s.emergence_score)));
    }

    #[test]
    fn test_volatility_buckets_do_not_overlap() {
        let protocols: Vec<Protocol> = (0..12)
            .map(|i| protocol(&format!("p{}", i), 2e7, i as f64, 0.0, 1))
            .chain(std::iter::once(protocol("small", 1e6, 99.0, 99.0, 1)))
            .collect();
        let report = volatility_report(&protocols);

        let high: Vec<&str> = report.high.iter().map(|v| v.id.as_str()).collect();
        let low: Vec<&str> = report.low.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(high, vec!["p11", "p10", "p9", "p8", "p7"]);
        assert_eq!(low, vec!["p0", "p1", "p2", "p3", "p4"]);
    }

    #[test]
    fn test_volatility_with_few_candidates() {
        let protocols = vec![
            protocol("a", 2e7, 10.0, 0.0, 1),
            protocol("b", 2e7, 1.0, 0.0, 1),
        ];
        let report = volatility_report(&protocols);
        assert_eq!(report.high.len(), 2);
        assert!(report.low.is_empty());
        assert!((report.high[0].volatility_score - 7.0).abs() < 1e-9);
    }
}
