use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// The observation windows a protocol's percentage change can be read over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "24h")]
    OneDay,
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "30d")]
    ThirtyDays,
}

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [
        Timeframe::OneHour,
        Timeframe::OneDay,
        Timeframe::SevenDays,
        Timeframe::ThirtyDays,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneHour => "1h",
            Timeframe::OneDay => "24h",
            Timeframe::SevenDays => "7d",
            Timeframe::ThirtyDays => "30d",
        }
    }

    /// Length of the window expressed in days.
    pub fn days(&self) -> f64 {
        match self {
            Timeframe::OneHour => 1.0 / 24.0,
            Timeframe::OneDay => 1.0,
            Timeframe::SevenDays => 7.0,
            Timeframe::ThirtyDays => 30.0,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1h" => Ok(Timeframe::OneHour),
            "24h" => Ok(Timeframe::OneDay),
            "7d" => Ok(Timeframe::SevenDays),
            "30d" => Ok(Timeframe::ThirtyDays),
            other => Err(CoreError::InvalidInput(
                "timeframe".to_string(),
                other.to_string(),
            )),
        }
    }
}

/// The analytics endpoints served by the intelligence layer.
///
/// Each endpoint owns a query shape, a cache namespace and a default TTL tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Endpoint {
    Overview,
    Dominance,
    Trending,
    Movers,
    ChainEcosystem,
    ChainsOverview,
}

impl Endpoint {
    pub const ALL: [Endpoint; 6] = [
        Endpoint::Overview,
        Endpoint::Dominance,
        Endpoint::Trending,
        Endpoint::Movers,
        Endpoint::ChainEcosystem,
        Endpoint::ChainsOverview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Overview => "overview",
            Endpoint::Dominance => "dominance",
            Endpoint::Trending => "trending",
            Endpoint::Movers => "movers",
            Endpoint::ChainEcosystem => "chain-ecosystem",
            Endpoint::ChainsOverview => "chains-overview",
        }
    }

    /// The freshness window used when no TTL is configured for the endpoint.
    pub fn default_ttl(&self) -> Duration {
        let minutes = match self {
            Endpoint::Overview | Endpoint::Movers => 5,
            Endpoint::Dominance => 10,
            Endpoint::Trending | Endpoint::ChainEcosystem => 15,
            Endpoint::ChainsOverview => 30,
        };
        Duration::from_secs(minutes * 60)
    }

    /// Short tag describing how the endpoint's numbers are derived.
    pub fn methodology(&self) -> &'static str {
        match self {
            Endpoint::Overview => "tvl-aggregate-v1",
            Endpoint::Dominance => "tvl-share-hhi-shannon-v1",
            Endpoint::Trending => "weighted-growth-momentum-volume-v1",
            Endpoint::Movers => "threshold-change-ranking-v1",
            Endpoint::ChainEcosystem => "chain-scoped-share-v1",
            Endpoint::ChainsOverview => "chain-tvl-share-v1",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Endpoint {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Endpoint::ALL
            .into_iter()
            .find(|e| e.as_str() == wanted)
            .ok_or_else(|| CoreError::InvalidInput("endpoint".to_string(), s.to_string()))
    }
}
