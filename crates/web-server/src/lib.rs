use axum::{Router, routing::get};
use intelligence::MarketIntelligence;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
pub struct AppState {
    pub intelligence: MarketIntelligence,
}

/// Builds the router with every analytics route and the shared middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/api/health", get(handlers::get_health))
        .route("/api/intelligence/overview", get(handlers::get_overview))
        .route("/api/intelligence/dominance", get(handlers::get_dominance))
        .route("/api/intelligence/trending", get(handlers::get_trending))
        .route("/api/intelligence/movers", get(handlers::get_movers))
        .route("/api/intelligence/chain-ecosystem", get(handlers::get_chain_ecosystem))
        .route("/api/intelligence/chains-overview", get(handlers::get_chains_overview))
        .with_state(state)
        .layer(cors)
        // Logs every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// Binds `addr` and serves the analytics API until the process stops.
pub async fn run_server(addr: SocketAddr, intelligence: MarketIntelligence) -> anyhow::Result<()> {
    let app = build_router(Arc::new(AppState { intelligence }));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Web server listening.");
    axum::serve(listener, app).await?;

    Ok(())
}
