use crate::engine::LIQUIDITY_FLOOR;
use crate::report::TrendingProtocol;
use core_types::{Protocol, Timeframe};
use std::collections::HashMap;

const GROWTH_WEIGHT: f64 = 0.4;
const MOMENTUM_WEIGHT: f64 = 0.4;
const VOLUME_WEIGHT: f64 = 0.2;

/// Acceleration of the change: the shorter-window rate projected onto
/// `timeframe`, minus the change actually observed over `timeframe`.
pub fn momentum_score(protocol: &Protocol, timeframe: Timeframe) -> f64 {
    let h1 = protocol.change_for(Timeframe::OneHour);
    let d1 = protocol.change_for(Timeframe::OneDay);
    let d7 = protocol.change_for(Timeframe::SevenDays);
    let d30 = protocol.change_for(Timeframe::ThirtyDays);

    let raw = match timeframe {
        Timeframe::OneHour => h1 - d1 / 24.0,
        Timeframe::OneDay => 24.0 * h1 - d1,
        Timeframe::SevenDays => 7.0 * d1 - d7,
        Timeframe::ThirtyDays => 30.0 / 7.0 * d7 - d30,
    };
    raw.clamp(-100.0, 100.0)
}

/// 24h volume as a percentage of TVL, capped at 100.
pub fn volume_score(protocol: &Protocol) -> f64 {
    let tvl = protocol.tvl_or_zero();
    match protocol.volume_24h {
        Some(volume) if volume.is_finite() && volume > 0.0 && tvl > 0.0 => {
            (volume / tvl * 100.0).min(100.0)
        }
        _ => 0.0,
    }
}

/// Ranked trending table for one timeframe.
///
/// Only protocols above the liquidity floor are scored, and only strictly
/// positive scores are kept. Ranks are 1-based and contiguous.
pub fn trending_protocols(protocols: &[Protocol], timeframe: Timeframe) -> Vec<TrendingProtocol> {
    let mut scored: Vec<TrendingProtocol> = protocols
        .iter()
        .filter(|p| p.tvl_or_zero() > LIQUIDITY_FLOOR)
        .filter_map(|p| {
            let growth_rate = p.change_for(timeframe);
            let momentum = momentum_score(p, timeframe);
            let volume = volume_score(p);
            let score = (GROWTH_WEIGHT * growth_rate
                + MOMENTUM_WEIGHT * momentum
                + VOLUME_WEIGHT * volume)
                .max(0.0);
            (score > 0.0).then(|| TrendingProtocol {
                id: p.id.clone(),
                name: p.name.clone(),
                category: p.category_or_default().to_string(),
                tvl: p.tvl_or_zero(),
                growth_rate,
                momentum_score: momentum,
                volume_score: volume,
                trending_score: score,
                rank: 0,
            })
        })
        .collect();

    assign_ranks(&mut scored);
    scored
}

/// Merges per-timeframe tables by averaging each protocol's score over the
/// timeframes it appears in, then re-ranks. Ties keep first-seen order.
pub fn overall_trending(tables: &[Vec<TrendingProtocol>]) -> Vec<TrendingProtocol> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut merged: Vec<(TrendingProtocol, f64, usize)> = Vec::new();
    for entry in tables.iter().flatten() {
        match positions.get(entry.id.as_str()) {
            Some(&i) => {
                merged[i].1 += entry.trending_score;
                merged[i].2 += 1;
            }
            None => {
                positions.insert(entry.id.as_str(), merged.len());
                merged.push((entry.clone(), entry.trending_score, 1));
            }
        }
    }

    let mut overall: Vec<TrendingProtocol> = merged
        .into_iter()
        .map(|(mut first, sum, count)| {
            first.trending_score = sum / count as f64;
            first
        })
        .collect();
    assign_ranks(&mut overall);
    overall
}

fn assign_ranks(entries: &mut [TrendingProtocol]) {
    entries.sort_by(|a, b| b.trending_score.total_cmp(&a.trending_score));
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn protocol(id: &str, tvl: f64, d1: f64, d7: f64) -> Protocol {
        let mut p = Protocol::new(id, id, tvl);
        p.change_1d = Some(d1);
        p.change_7d = Some(d7);
        p
    }

    #[test]
    fn test_scores_and_contiguous_ranks() {
        let protocols = vec![
            protocol("slow", 5e6, 1.0, 10.0),
            protocol("fast", 5e6, 5.0, 20.0),
            protocol("falling", 5e6, -5.0, -20.0),
            protocol("small", 5e5, 50.0, 90.0),
        ];
        let table = trending_protocols(&protocols, Timeframe::SevenDays);

        let ids: Vec<&str> = table.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["fast", "slow"]);
        assert_eq!(table.iter().map(|t| t.rank).collect::<Vec<_>>(), vec![1, 2]);

        // fast: growth 20, momentum 7*5-20 = 15, no volume.
        assert!((table[0].trending_score - (0.4 * 20.0 + 0.4 * 15.0)).abs() < 1e-9);
        assert!(table.iter().all(|t| t.trending_score > 0.0));
    }

    #[test]
    fn test_momentum_is_clamped() {
        let mut p = protocol("x", 5e6, 40.0, 0.0);
        assert_eq!(momentum_score(&p, Timeframe::SevenDays), 100.0);
        p.change_1d = Some(-40.0);
        assert_eq!(momentum_score(&p, Timeframe::SevenDays), -100.0);
    }

    #[test]
    fn test_volume_score_capped() {
        let mut p = Protocol::new("x", "X", 1e6);
        assert_eq!(volume_score(&p), 0.0);
        p.volume_24h = Some(2.5e5);
        assert!((volume_score(&p) - 25.0).abs() < 1e-9);
        p.volume_24h = Some(5e6);
        assert_eq!(volume_score(&p), 100.0);
    }

    #[test]
    fn test_overall_averages_across_timeframes() {
        let mut a = protocol("a", 5e6, 2.0, 10.0);
        a.change_1h = Some(1.0);
        let b = protocol("b", 5e6, 4.0, 1.0);
        let protocols = vec![a, b];

        // daily: a = 0.4*2 + 0.4*(24*1-2) = 9.6; b scores 0 and is dropped.
        let daily = trending_protocols(&protocols, Timeframe::OneDay);
        assert_eq!(daily.len(), 1);
        // weekly: a = 0.4*10 + 0.4*(14-10) = 5.6, b = 0.4*1 + 0.4*(28-1) = 11.2.
        let weekly = trending_protocols(&protocols, Timeframe::SevenDays);
        assert_eq!(weekly[0].id, "b");

        let overall = overall_trending(&[daily, weekly]);
        assert_eq!(overall[0].id, "b");
        assert!((overall[0].trending_score - 11.2).abs() < 1e-9);
        assert_eq!(overall[1].id, "a");
        assert!((overall[1].trending_score - 7.6).abs() < 1e-9);
        assert_eq!(overall.iter().map(|t| t.rank).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_empty_input() {
        assert!(trending_protocols(&[], Timeframe::OneDay).is_empty());
        assert!(overall_trending(&[]).is_empty());
    }
}
