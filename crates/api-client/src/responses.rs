use chrono::{TimeZone, Utc};
use core_types::{Chain, HistoricalSeries, Protocol};
use serde::{Deserialize, Deserializer};

// DefiLlama mixes snake_case (`change_1d`) and camelCase (`tokenSymbol`) keys,
// so fields are renamed individually instead of with `rename_all`.

/// One entry of `GET /protocols`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProtocolResponse {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
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
    #[serde(default, rename = "tvlPrevDay")]
    pub tvl_prev_day: Option<f64>,
    #[serde(default, rename = "tvlPrevWeek")]
    pub tvl_prev_week: Option<f64>,
    #[serde(default, rename = "tvlPrevMonth")]
    pub tvl_prev_month: Option<f64>,
}

/// Percentage change from `previous` to `current`, when both are usable.
fn change_from(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    let (current, previous) = (current?, previous?);
    (current.is_finite() && previous.is_finite() && previous > 0.0)
        .then(|| (current - previous) / previous * 100.0)
}

impl From<ProtocolResponse> for Protocol {
    fn from(raw: ProtocolResponse) -> Self {
        Protocol {
            id: raw.id,
            name: raw.name,
            symbol: raw.symbol.filter(|s| s != "-"),
            category: raw.category,
            chain: raw.chain,
            chains: raw.chains,
            tvl: raw.tvl,
            change_1h: raw.change_1h,
            change_1d: raw.change_1d.or_else(|| change_from(raw.tvl, raw.tvl_prev_day)),
            change_7d: raw.change_7d.or_else(|| change_from(raw.tvl, raw.tvl_prev_week)),
            // `/protocols` has no 30d change field, only last month's TVL.
            change_30d: change_from(raw.tvl, raw.tvl_prev_month),
            volume_24h: None,
        }
    }
}

/// One entry of `GET /v2/chains`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainResponse {
    pub name: String,
    #[serde(default)]
    pub tvl: Option<f64>,
    #[serde(default, rename = "tokenSymbol")]
    pub token_symbol: Option<String>,
}

impl From<ChainResponse> for Chain {
    fn from(raw: ChainResponse) -> Self {
        // Protocol counts are not part of this payload; they are derived from
        // the protocol list by the analytics layer.
        Chain::new(raw.name, raw.tvl.unwrap_or(0.0), 0)
    }
}

/// One point of `GET /v2/historicalChainTvl`.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoricalPointResponse {
    /// Unix timestamp in seconds.
    pub date: i64,
    pub tvl: f64,
}

pub fn into_series(points: Vec<HistoricalPointResponse>) -> HistoricalSeries {
    HistoricalSeries::new(
        points
            .into_iter()
            .filter_map(|p| {
                Utc.timestamp_opt(p.date, 0)
                    .single()
                    .map(|ts| (ts, p.tvl))
            })
            .collect(),
    )
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}
