use crate::report::{ConcentrationLevel, ConcentrationMetrics};

const HIGH_HHI: f64 = 0.25;
const MODERATE_HHI: f64 = 0.15;

/// Herfindahl-Hirschman index from dominance percentages. 1.0 is a monopoly.
pub fn herfindahl_index(percentages: &[f64]) -> f64 {
    percentages
        .iter()
        .map(|p| {
            let share = p / 100.0;
            share * share
        })
        .sum()
}

/// Shannon diversity index from dominance percentages; zero shares contribute nothing.
pub fn shannon_index(percentages: &[f64]) -> f64 {
    -percentages
        .iter()
        .map(|p| p / 100.0)
        .filter(|share| *share > 0.0)
        .map(|share| share * share.ln())
        .sum::<f64>()
}

/// Cumulative percentage of the first `n` entries of a table sorted largest first.
pub fn top_n_concentration(percentages: &[f64], n: usize) -> f64 {
    percentages.iter().take(n).sum()
}

pub fn concentration_level(hhi: f64) -> ConcentrationLevel {
    if hhi > HIGH_HHI {
        ConcentrationLevel::High
    } else if hhi > MODERATE_HHI {
        ConcentrationLevel::Moderate
    } else {
        ConcentrationLevel::Low
    }
}

pub fn concentration_metrics(percentages: &[f64]) -> ConcentrationMetrics {
    let hhi = herfindahl_index(percentages);
    ConcentrationMetrics {
        hhi,
        shannon_index: shannon_index(percentages),
        top5_concentration: top_n_concentration(percentages, 5),
        entity_count: percentages.len(),
        level: concentration_level(hhi),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_protocol_market() {
        let shares = [60.0, 30.0, 10.0];
        let metrics = concentration_metrics(&shares);

        assert!((metrics.hhi - 0.46).abs() < 1e-9);
        assert!((metrics.top5_concentration - 100.0).abs() < 1e-9);
        assert!((top_n_concentration(&shares, 2) - 90.0).abs() < 1e-9);
        assert_eq!(metrics.level, ConcentrationLevel::High);

        let expected = -(0.6f64 * 0.6f64.ln() + 0.3 * 0.3f64.ln() + 0.1 * 0.1f64.ln());
        assert!((metrics.shannon_index - expected).abs() < 1e-9);
    }

    #[test]
    fn test_monopoly_and_empty() {
        assert!((herfindahl_index(&[100.0]) - 1.0).abs() < 1e-12);
        assert_eq!(shannon_index(&[100.0]), 0.0);
        assert_eq!(shannon_index(&[100.0, 0.0]), 0.0);

        let empty = concentration_metrics(&[]);
        assert_eq!(empty.hhi, 0.0);
        assert_eq!(empty.entity_count, 0);
        assert_eq!(empty.level, ConcentrationLevel::Low);
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(concentration_level(0.26), ConcentrationLevel::High);
        assert_eq!(concentration_level(0.25), ConcentrationLevel::Moderate);
        assert_eq!(concentration_level(0.15), ConcentrationLevel::Low);
    }
}
