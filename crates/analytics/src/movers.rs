use crate::engine::LIQUIDITY_FLOOR;
use crate::report::{MoverProtocol, MoverReason, Movers};
use core_types::{Protocol, Timeframe};

/// Maps the magnitude of a move onto its most likely driver.
pub fn classify_reason(change_percent: f64) -> MoverReason {
    let magnitude = change_percent.abs();
    if magnitude > 50.0 {
        MoverReason::MajorProtocolUpdate
    } else if magnitude > 20.0 {
        MoverReason::MarketSentiment
    } else if magnitude > 10.0 {
        MoverReason::CompetitiveDynamics
    } else {
        MoverReason::NormalFluctuation
    }
}

/// Splits liquid protocols whose `|change| >= min_change` into gainers and losers.
///
/// Gainers are sorted by change descending, losers ascending (biggest drop
/// first). A protocol with exactly zero change is in neither list.
pub fn top_movers(protocols: &[Protocol], timeframe: Timeframe, min_change: f64) -> Movers {
    let candidates: Vec<MoverProtocol> = protocols
        .iter()
        .filter(|p| p.tvl_or_zero() > LIQUIDITY_FLOOR)
        .filter(|p| p.change_for(timeframe).abs() >= min_change)
        .map(|p| {
            let tvl = p.tvl_or_zero();
            let change = p.change_for(timeframe);
            MoverProtocol {
                id: p.id.clone(),
                name: p.name.clone(),
                category: p.category_or_default().to_string(),
                tvl,
                change_percent: change,
                absolute_change: tvl * change / 100.0,
                reason: classify_reason(change),
            }
        })
        .collect();

    let (mut gainers, rest): (Vec<_>, Vec<_>) =
        candidates.into_iter().partition(|m| m.change_percent > 0.0);
    let mut losers: Vec<MoverProtocol> = rest.into_iter().filter(|m| m.change_percent < 0.0).collect();

    gainers.sort_by(|a, b| b.change_percent.total_cmp(&a.change_percent));
    losers.sort_by(|a, b| a.change_percent.total_cmp(&b.change_percent));

    Movers { gainers, losers }
}
