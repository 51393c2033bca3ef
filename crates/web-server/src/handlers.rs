use crate::{AppState, error::AppError};
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;
use core_types::Endpoint;
use intelligence::Envelope;
use serde_json::{Value, json};
use std::sync::Arc;
use validation::RawQuery;

/// Query string as ordered pairs, so repeated keys (`chains=a&chains=b`) survive.
type Pairs = Query<Vec<(String, String)>>;

async fn serve(
    state: &AppState,
    endpoint: Endpoint,
    pairs: Vec<(String, String)>,
) -> Result<Json<Envelope>, AppError> {
    let raw = RawQuery::from_pairs(pairs);
    let envelope = state.intelligence.handle(endpoint, &raw).await?;
    Ok(Json(envelope))
}

/// # GET /api/intelligence/overview
pub async fn get_overview(
    State(state): State<Arc<AppState>>,
    Query(pairs): Pairs,
) -> Result<Json<Envelope>, AppError> {
    serve(&state, Endpoint::Overview, pairs).await
}

/// # GET /api/intelligence/dominance
pub async fn get_dominance(
    State(state): State<Arc<AppState>>,
    Query(pairs): Pairs,
) -> Result<Json<Envelope>, AppError> {
    serve(&state, Endpoint::Dominance, pairs).await
}

/// # GET /api/intelligence/trending
pub async fn get_trending(
    State(state): State<Arc<AppState>>,
    Query(pairs): Pairs,
) -> Result<Json<Envelope>, AppError> {
    serve(&state, Endpoint::Trending, pairs).await
}

/// # GET /api/intelligence/movers
pub async fn get_movers(
    State(state): State<Arc<AppState>>,
    Query(pairs): Pairs,
) -> Result<Json<Envelope>, AppError> {
    serve(&state, Endpoint::Movers, pairs).await
}

/// # GET /api/intelligence/chain-ecosystem
/// Requires `chain`; aliases such as `eth` or `bsc` are accepted.
pub async fn get_chain_ecosystem(
    State(state): State<Arc<AppState>>,
    Query(pairs): Pairs,
) -> Result<Json<Envelope>, AppError> {
    serve(&state, Endpoint::ChainEcosystem, pairs).await
}

/// # GET /api/intelligence/chains-overview
pub async fn get_chains_overview(
    State(state): State<Arc<AppState>>,
    Query(pairs): Pairs,
) -> Result<Json<Envelope>, AppError> {
    serve(&state, Endpoint::ChainsOverview, pairs).await
}

/// # GET /api/health
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "dataSource": state.intelligence.data_source(),
        "timestamp": Utc::now(),
    }))
}
