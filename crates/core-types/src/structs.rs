use crate::enums::Timeframe;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Lower-cased, kebab-cased form of a provider label ("Liquid Staking" -> "liquid-staking").
pub fn normalize_tag(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// A single DeFi protocol as reported by the data provider.
///
/// Every numeric field except `id`/`name` may be missing upstream. Readers go
/// through the accessors, which substitute neutral defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Protocol {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Primary chain label; the provider uses "Multi-Chain" for protocols spread over several chains.
    #[serde(default)]
    pub chain: Option<String>,
    #[serde(default)]
    pub chains: Vec<String>,
    #[serde(default)]
    pub tvl: Option<f64>,
    #[serde(default)]
    pub change_1h: Option<f64>,
    #[serde(default)]
    pub change_1d: Option<f64>,
    #[serde(default)]
    pub change_7d: Option<f64>,
    #[serde(default)]
    pub change_30d: Option<f64>,
    #[serde(default)]
    pub volume_24h: Option<f64>,
}

impl Protocol {
    pub fn new(id: impl Into<String>, name: impl Into<String>, tvl: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            symbol: None,
            category: None,
            chain: None,
            chains: Vec::new(),
            tvl: Some(tvl),
            change_1h: None,
            change_1d: None,
            change_7d: None,
            change_30d: None,
            volume_24h: None,
        }
    }

    /// TVL with missing, negative or non-finite values read as zero.
    pub fn tvl_or_zero(&self) -> f64 {
        match self.tvl {
            Some(v) if v.is_finite() && v > 0.0 => v,
            _ => 0.0,
        }
    }

    /// Percentage change over `timeframe`, zero when the provider omitted it.
    pub fn change_for(&self, timeframe: Timeframe) -> f64 {
        let raw = match timeframe {
            Timeframe::OneHour => self.change_1h,
            Timeframe::OneDay => self.change_1d,
            Timeframe::SevenDays => self.change_7d,
            Timeframe::ThirtyDays => self.change_30d,
        };
        raw.filter(|v| v.is_finite()).unwrap_or(0.0)
    }

    pub fn category_or_default(&self) -> &str {
        match self.category.as_deref() {
            Some(c) if !c.trim().is_empty() => c,
            _ => "Other",
        }
    }

    /// Normalized category tag, comparable with query filters.
    pub fn category_tag(&self) -> String {
        normalize_tag(self.category_or_default())
    }

    /// True when any of the protocol's chains normalizes to one of `tags`.
    pub fn matches_any_chain(&self, tags: &[String]) -> bool {
        self.chains
            .iter()
            .chain(self.chain.iter())
            .any(|c| tags.contains(&normalize_tag(c)))
    }

    /// The chain this protocol is grouped under for chain dominance.
    pub fn chain_group(&self) -> &str {
        if let Some(chain) = self.chain.as_deref().filter(|c| !c.trim().is_empty()) {
            return chain;
        }
        match self.chains.as_slice() {
            [only] => only,
            _ => "Multi-Chain",
        }
    }

    /// True when `chain` appears in the protocol's chain list (case-insensitive).
    pub fn is_on_chain(&self, chain: &str) -> bool {
        self.chains.iter().any(|c| c.eq_ignore_ascii_case(chain))
            || self
                .chain
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(chain))
    }
}

/// Aggregate figures for one blockchain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    pub name: String,
    #[serde(default)]
    pub tvl: f64,
    /// Number of protocols deployed on the chain. Zero when unknown.
    #[serde(default)]
    pub protocols: usize,
    #[serde(default)]
    pub change_1d: Option<f64>,
    #[serde(default)]
    pub change_7d: Option<f64>,
    #[serde(default)]
    pub change_30d: Option<f64>,
}

impl Chain {
    pub fn new(name: impl Into<String>, tvl: f64, protocols: usize) -> Self {
        Self {
            name: name.into(),
            tvl,
            protocols,
            change_1d: None,
            change_7d: None,
            change_30d: None,
        }
    }

    pub fn tvl_or_zero(&self) -> f64 {
        if self.tvl.is_finite() && self.tvl > 0.0 { self.tvl } else { 0.0 }
    }

    pub fn change_for(&self, timeframe: Timeframe) -> f64 {
        let raw = match timeframe {
            Timeframe::OneHour => None,
            Timeframe::OneDay => self.change_1d,
            Timeframe::SevenDays => self.change_7d,
            Timeframe::ThirtyDays => self.change_30d,
        };
        raw.filter(|v| v.is_finite()).unwrap_or(0.0)
    }
}

/// A time series of total market TVL, oldest point first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSeries {
    pub points: Vec<(DateTime<Utc>, f64)>,
}

impl HistoricalSeries {
    pub fn new(mut points: Vec<(DateTime<Utc>, f64)>) -> Self {
        points.sort_by_key(|(ts, _)| *ts);
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn max_value(&self) -> Option<f64> {
        self.points
            .iter()
            .map(|(_, v)| *v)
            .filter(|v| v.is_finite())
            .reduce(f64::max)
    }

    /// Growth from the first point of the calendar year of the latest point.
    pub fn year_to_date_growth_pct(&self) -> Option<f64> {
        let (last_ts, last) = self.points.last()?;
        let year_start = Utc
            .with_ymd_and_hms(last_ts.year(), 1, 1, 0, 0, 0)
            .single()?;
        let (_, base) = self.points.iter().find(|(ts, _)| *ts >= year_start)?;
        if *base > 0.0 {
            Some((last - base) / base * 100.0)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_read_as_neutral_defaults() {
        let p: Protocol = serde_json::from_str(r#"{"id":"x","name":"X"}"#).unwrap();
        assert_eq!(p.tvl_or_zero(), 0.0);
        assert_eq!(p.change_for(Timeframe::SevenDays), 0.0);
        assert_eq!(p.category_or_default(), "Other");
        assert_eq!(p.chain_group(), "Multi-Chain");
    }

    #[test]
    fn test_tags_are_kebab_cased() {
        let mut p = Protocol::new("l", "Lido", 1.0);
        p.category = Some("Liquid  Staking".to_string());
        p.chains = vec!["zkSync Era".to_string()];
        assert_eq!(p.category_tag(), "liquid-staking");
        assert!(p.matches_any_chain(&["zksync-era".to_string()]));
        assert!(!p.matches_any_chain(&["ethereum".to_string()]));
    }

    #[test]
    fn test_chain_group_prefers_single_chain() {
        let mut p = Protocol::new("a", "A", 10.0);
        p.chains = vec!["Ethereum".to_string()];
        assert_eq!(p.chain_group(), "Ethereum");
        p.chains.push("Arbitrum".to_string());
        assert_eq!(p.chain_group(), "Multi-Chain");
        assert!(p.is_on_chain("arbitrum"));
    }

    #[test]
    fn test_series_max_and_ytd() {
        let ts = |y, m, d| Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap();
        let series = HistoricalSeries::new(vec![
            (ts(2025, 12, 1), 80.0),
            (ts(2026, 1, 1), 100.0),
            (ts(2026, 6, 1), 150.0),
            (ts(2026, 9, 1), 120.0),
        ]);
        assert_eq!(series.max_value(), Some(150.0));
        assert_eq!(series.year_to_date_growth_pct(), Some(20.0));
        assert_eq!(HistoricalSeries::default().year_to_date_growth_pct(), None);
    }
}
