use crate::error::ApiError;
use crate::responses::{ChainResponse, HistoricalPointResponse, ProtocolResponse};
use async_trait::async_trait;
use configuration::ProviderSettings;
use core_types::{Chain, HistoricalSeries, Protocol, Timeframe};
use serde::de::DeserializeOwned;

pub mod error;
pub mod responses;
pub mod snapshot;
// --- Public API ---
pub use snapshot::{Snapshot, SnapshotProvider};

/// The abstract interface for a DeFi market data provider.
///
/// The intelligence layer only ever talks to this trait, so the live HTTP
/// client and the offline snapshot provider are interchangeable.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Short tag identifying where the data came from (e.g. "defillama").
    fn source(&self) -> &'static str;

    /// Fetches the current snapshot of every tracked protocol.
    async fn fetch_protocols(&self) -> Result<Vec<Protocol>, ApiError>;

    /// Fetches aggregate TVL per chain.
    async fn fetch_chains(&self) -> Result<Vec<Chain>, ApiError>;

    /// Fetches the total-TVL series covering at least `timeframe`.
    ///
    /// `Ok(None)` means the provider has no history for the window.
    async fn fetch_historical(
        &self,
        timeframe: Timeframe,
    ) -> Result<Option<HistoricalSeries>, ApiError>;
}

/// A concrete implementation of the `ProviderClient` for the DefiLlama API.
#[derive(Clone)]
pub struct DefiLlamaClient {
    client: reqwest::Client,
    base_url: String,
}

impl DefiLlamaClient {
    pub fn new(settings: &ProviderSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("defi-intel/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "Fetching from provider.");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str::<T>(&text).map_err(|e| ApiError::Deserialization(e.to_string()))
        } else {
            let mut snippet = text;
            snippet.truncate(200);
            Err(ApiError::Status(status.as_u16(), snippet))
        }
    }
}

#[async_trait]
impl ProviderClient for DefiLlamaClient {
    fn source(&self) -> &'static str {
        "defillama"
    }

    async fn fetch_protocols(&self) -> Result<Vec<Protocol>, ApiError> {
        let raw: Vec<ProtocolResponse> = self.get_json("/protocols").await?;
        Ok(raw.into_iter().map(Protocol::from).collect())
    }

    async fn fetch_chains(&self) -> Result<Vec<Chain>, ApiError> {
        let raw: Vec<ChainResponse> = self.get_json("/v2/chains").await?;
        Ok(raw.into_iter().map(Chain::from).collect())
    }

    async fn fetch_historical(
        &self,
        timeframe: Timeframe,
    ) -> Result<Option<HistoricalSeries>, ApiError> {
        // The endpoint always returns the full daily history, which covers every window.
        let raw: Vec<HistoricalPointResponse> = self.get_json("/v2/historicalChainTvl").await?;
        let series = responses::into_series(raw);
        if series.is_empty() {
            tracing::debug!(%timeframe, "Provider returned an empty historical series.");
            return Ok(None);
        }
        Ok(Some(series))
    }
}
