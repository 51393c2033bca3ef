use crate::error::ConfigError;
use core_types::Endpoint;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    pub cache: CacheSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Rejects values that would make the service misbehave at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "provider.base_url must not be empty".to_string(),
            ));
        }
        if self.provider.timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "provider.timeout must be greater than zero".to_string(),
            ));
        }
        if self.cache.max_entries == 0 {
            return Err(ConfigError::ValidationError(
                "cache.max_entries must be greater than zero".to_string(),
            ));
        }
        for endpoint in Endpoint::ALL {
            if self.cache.ttl_for(endpoint).is_zero() {
                return Err(ConfigError::ValidationError(format!(
                    "cache TTL for '{}' must be greater than zero",
                    endpoint
                )));
            }
        }
        Ok(())
    }
}

/// Where the HTTP server binds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Settings for the upstream DeFi data provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Base URL of the DefiLlama-compatible API.
    pub base_url: String,
    /// Upper bound on a single provider request.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// When set, data is served from this JSON snapshot instead of the network.
    pub snapshot_path: Option<PathBuf>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.llama.fi".to_string(),
            timeout: Duration::from_secs(10),
            snapshot_path: None,
        }
    }
}

/// Per-endpoint freshness windows for cached analytics.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    #[serde(with = "humantime_serde")]
    pub overview_ttl: Duration,
    #[serde(with = "humantime_serde")]
    pub dominance_ttl: Duration,
    #[serde(with = "humantime_serde")]
    pub trending_ttl: Duration,
    #[serde(with = "humantime_serde")]
    pub movers_ttl: Duration,
    #[serde(with = "humantime_serde")]
    pub chain_ecosystem_ttl: Duration,
    #[serde(with = "humantime_serde")]
    pub chains_overview_ttl: Duration,
    /// Upper bound on stored results; the entry closest to expiry is evicted first.
    pub max_entries: usize,
}

impl CacheSettings {
    pub fn ttl_for(&self, endpoint: Endpoint) -> Duration {
        match endpoint {
            Endpoint::Overview => self.overview_ttl,
            Endpoint::Dominance => self.dominance_ttl,
            Endpoint::Trending => self.trending_ttl,
            Endpoint::Movers => self.movers_ttl,
            Endpoint::ChainEcosystem => self.chain_ecosystem_ttl,
            Endpoint::ChainsOverview => self.chains_overview_ttl,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            overview_ttl: Endpoint::Overview.default_ttl(),
            dominance_ttl: Endpoint::Dominance.default_ttl(),
            trending_ttl: Endpoint::Trending.default_ttl(),
            movers_ttl: Endpoint::Movers.default_ttl(),
            chain_ecosystem_ttl: Endpoint::ChainEcosystem.default_ttl(),
            chains_overview_ttl: Endpoint::ChainsOverview.default_ttl(),
            max_entries: 1_000,
        }
    }
}

/// Output format of the stdout log layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Settings for the tracing subscriber.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive, e.g. "info" or "web_server=debug,info".
    pub level: String,
    pub format: LogFormat,
    /// When set, logs are also written to daily-rolling files in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            directory: None,
            file_prefix: "defi-intel.log".to_string(),
        }
    }
}
