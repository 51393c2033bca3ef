use crate::ProviderClient;
use crate::error::ApiError;
use async_trait::async_trait;
use core_types::{Chain, HistoricalSeries, Protocol, Timeframe};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A frozen copy of provider data, as stored in a snapshot file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub protocols: Vec<Protocol>,
    #[serde(default)]
    pub chains: Vec<Chain>,
    #[serde(default)]
    pub historical: Option<HistoricalSeries>,
}

/// Serves a fixed `Snapshot` through the `ProviderClient` interface.
///
/// Used for offline operation and as the data source in tests. Every protocol
/// fetch is counted, which makes cache behaviour observable.
pub struct SnapshotProvider {
    snapshot: Snapshot,
    latency: Option<Duration>,
    protocol_fetches: AtomicUsize,
}

impl SnapshotProvider {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            latency: None,
            protocol_fetches: AtomicUsize::new(0),
        }
    }

    /// Loads a snapshot from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ApiError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ApiError::Snapshot(format!("{}: {}", path.display(), e)))?;
        let snapshot: Snapshot =
            serde_json::from_str(&text).map_err(|e| ApiError::Snapshot(e.to_string()))?;
        tracing::info!(
            protocols = snapshot.protocols.len(),
            chains = snapshot.chains.len(),
            "Loaded provider snapshot."
        );
        Ok(Self::new(snapshot))
    }

    /// Adds an artificial delay to every fetch.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of times `fetch_protocols` has been called.
    pub fn protocol_fetches(&self) -> usize {
        self.protocol_fetches.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl ProviderClient for SnapshotProvider {
    fn source(&self) -> &'static str {
        "snapshot"
    }

    async fn fetch_protocols(&self) -> Result<Vec<Protocol>, ApiError> {
        self.protocol_fetches.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        Ok(self.snapshot.protocols.clone())
    }

    async fn fetch_chains(&self) -> Result<Vec<Chain>, ApiError> {
        self.simulate_latency().await;
        Ok(self.snapshot.chains.clone())
    }

    async fn fetch_historical(
        &self,
        _timeframe: Timeframe,
    ) -> Result<Option<HistoricalSeries>, ApiError> {
        Ok(self.snapshot.historical.clone())
    }
}
