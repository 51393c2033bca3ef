use crate::envelope::{Envelope, Metadata, Payload};
use crate::error::IntelligenceError;
use crate::views::{self, MarketData};
use analytics::AnalyticsEngine;
use api_client::ProviderClient;
use cache::{CacheCoordinator, cache_key};
use chrono::Utc;
use configuration::CacheSettings;
use core_types::{Endpoint, Timeframe};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;
use validation::{ChainEcosystemOptions, QueryValidation, RawQuery};

/// Which provider collections a computation needs.
#[derive(Debug, Clone, Copy)]
struct Needs {
    chains: bool,
    historical: Option<Timeframe>,
}

/// Orchestrates validation, caching, computation and envelope assembly for
/// every analytics endpoint.
///
/// All collaborators are injected, so the provider, validator and cache
/// backend can each be swapped independently.
pub struct MarketIntelligence {
    provider: Arc<dyn ProviderClient>,
    validator: Arc<dyn QueryValidation>,
    cache: CacheCoordinator,
    ttls: CacheSettings,
    engine: AnalyticsEngine,
}

impl MarketIntelligence {
    pub fn new(
        provider: Arc<dyn ProviderClient>,
        validator: Arc<dyn QueryValidation>,
        cache: CacheCoordinator,
        ttls: CacheSettings,
    ) -> Self {
        Self {
            provider,
            validator,
            cache,
            ttls,
            engine: AnalyticsEngine::new(),
        }
    }

    pub fn data_source(&self) -> &'static str {
        self.provider.source()
    }

    /// Dispatches to the endpoint's handler.
    pub async fn handle(&self, endpoint: Endpoint, raw: &RawQuery) -> Result<Envelope, IntelligenceError> {
        match endpoint {
            Endpoint::Overview => self.overview(raw).await,
            Endpoint::Dominance => self.dominance(raw).await,
            Endpoint::Trending => self.trending(raw).await,
            Endpoint::Movers => self.movers(raw).await,
            Endpoint::ChainEcosystem => self.chain_ecosystem(raw).await,
            Endpoint::ChainsOverview => self.chains_overview(raw).await,
        }
    }

    pub async fn overview(&self, raw: &RawQuery) -> Result<Envelope, IntelligenceError> {
        let started = Instant::now();
        let options = self.validator.overview(raw)?;
        let needs = Needs {
            chains: true,
            historical: Some(options.timeframe),
        };
        self.serve(Endpoint::Overview, options, needs, started, views::overview)
            .await
    }

    pub async fn dominance(&self, raw: &RawQuery) -> Result<Envelope, IntelligenceError> {
        let started = Instant::now();
        let options = self.validator.dominance(raw)?;
        let needs = Needs {
            chains: false,
            historical: None,
        };
        self.serve(Endpoint::Dominance, options, needs, started, views::dominance)
            .await
    }

    pub async fn trending(&self, raw: &RawQuery) -> Result<Envelope, IntelligenceError> {
        let started = Instant::now();
        let options = self.validator.trending(raw)?;
        let needs = Needs {
            chains: false,
            historical: None,
        };
        self.serve(Endpoint::Trending, options, needs, started, views::trending)
            .await
    }

    pub async fn movers(&self, raw: &RawQuery) -> Result<Envelope, IntelligenceError> {
        let started = Instant::now();
        let options = self.validator.movers(raw)?;
        let needs = Needs {
            chains: false,
            historical: None,
        };
        self.serve(Endpoint::Movers, options, needs, started, views::movers)
            .await
    }

    pub async fn chain_ecosystem(&self, raw: &RawQuery) -> Result<Envelope, IntelligenceError> {
        let started = Instant::now();
        let options = self.validator.chain_ecosystem(raw)?;
        let provider_name = self.validator.provider_chain_name(&options.chain).ok_or_else(|| {
            IntelligenceError::NotFound(format!("Chain '{}' not found", options.chain))
        })?;
        let needs = Needs {
            chains: true,
            historical: Some(Timeframe::SevenDays),
        };
        self.serve(
            Endpoint::ChainEcosystem,
            options,
            needs,
            started,
            move |engine: &AnalyticsEngine, market: &MarketData, options: &ChainEcosystemOptions| {
                views::chain_ecosystem(engine, market, options, provider_name)
            },
        )
        .await
    }

    pub async fn chains_overview(&self, raw: &RawQuery) -> Result<Envelope, IntelligenceError> {
        let started = Instant::now();
        let options = self.validator.chains_overview(raw)?;
        let needs = Needs {
            chains: true,
            historical: options.include_benchmarks.then_some(Timeframe::SevenDays),
        };
        self.serve(Endpoint::ChainsOverview, options, needs, started, views::chains_overview)
            .await
    }

    /// Cache lookup, computation on miss, and envelope assembly.
    ///
    /// On a miss the fetch and `view` run on the cache's own task, so they
    /// get owned handles to the provider, engine and options.
    async fn serve<O, V>(
        &self,
        endpoint: Endpoint,
        options: O,
        needs: Needs,
        started: Instant,
        view: V,
    ) -> Result<Envelope, IntelligenceError>
    where
        O: Serialize + Send + Sync + 'static,
        V: FnOnce(&AnalyticsEngine, &MarketData, &O) -> Result<Payload, IntelligenceError>
            + Send
            + 'static,
    {
        let key = cache_key(endpoint, &options)?;
        let ttl = self.ttls.ttl_for(endpoint);
        let provider = self.provider.clone();
        let engine = self.engine;

        let cached = self
            .cache
            .get_or_compute(&key, ttl, move || async move {
                tracing::debug!(%endpoint, "Cache miss, computing.");
                let market = fetch(provider.as_ref(), needs).await?;
                let payload = view(&engine, &market, &options)?;
                Ok::<_, IntelligenceError>(serde_json::to_value(&payload)?)
            })
            .await?;
        let payload: Payload = serde_json::from_value(cached.value)?;

        let now = Utc::now();
        let metadata = Metadata {
            request_id: Uuid::new_v4().to_string(),
            response_time_ms: started.elapsed().as_millis() as u64,
            data_source: self.provider.source().to_string(),
            computed_at: payload.computed_at,
            data_freshness_seconds: (now - payload.computed_at).num_seconds().max(0),
            methodology: endpoint.methodology().to_string(),
            coverage: payload.coverage,
            cache_hit: cached.hit,
        };
        tracing::info!(
            %endpoint,
            request_id = %metadata.request_id,
            cache_hit = cached.hit,
            elapsed_ms = metadata.response_time_ms,
            "Served analytics request."
        );

        Ok(Envelope {
            success: true,
            data: payload.data,
            intelligence: payload.intelligence,
            benchmarks: payload.benchmarks,
            metadata,
            timestamp: now,
        })
    }
}

/// Fetches the collections a computation needs, concurrently.
///
/// A failed or empty historical fetch is treated as missing data.
async fn fetch(provider: &dyn ProviderClient, needs: Needs) -> Result<MarketData, IntelligenceError> {
    let protocols = provider.fetch_protocols();
    let chains = async {
        if needs.chains {
            provider.fetch_chains().await
        } else {
            Ok(Vec::new())
        }
    };
    let historical = async {
        let Some(timeframe) = needs.historical else {
            return None;
        };
        match provider.fetch_historical(timeframe).await {
            Ok(series) => series,
            Err(e) => {
                tracing::debug!(error = %e, "Historical fetch failed; continuing without it.");
                None
            }
        }
    };

    let (protocols, chains, historical) = tokio::join!(protocols, chains, historical);
    let market = MarketData {
        protocols: protocols?,
        chains: chains?,
        historical,
    };
    tracing::debug!(
        protocols = market.protocols.len(),
        chains = market.chains.len(),
        has_history = market.historical.is_some(),
        "Fetched market data."
    );
    Ok(market)
}
