use anyhow::Context;
use api_client::{DefiLlamaClient, ProviderClient, SnapshotProvider};
use cache::{CacheCoordinator, InMemoryCache};
use clap::{Parser, Subcommand};
use configuration::{LogFormat, Settings, init_tracing, load_settings};
use core_types::Endpoint;
use intelligence::MarketIntelligence;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use validation::{QueryValidator, RawQuery};

/// The main entry point for the DeFi market intelligence service.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; it only carries optional overrides.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;

    match &cli.command {
        Commands::Serve(args) => {
            if let Some(port) = args.port {
                settings.server.port = port;
            }
            if let Some(format) = args.log_format {
                settings.logging.format = format;
            }
        }
        // Keep stdout clean for the JSON report.
        Commands::Report(_) => settings.logging.level = "warn".to_string(),
    }
    let _guard = init_tracing(&settings.logging)?;

    let intelligence = build_intelligence(&settings)?;
    match cli.command {
        Commands::Serve(_) => {
            let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
                .parse()
                .context("invalid server host or port")?;
            tracing::info!(
                %addr,
                source = intelligence.data_source(),
                "Starting market intelligence server."
            );
            web_server::run_server(addr, intelligence).await
        }
        Commands::Report(args) => handle_report(args, &intelligence).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// DeFi market intelligence: dominance, concentration, trending and movers analytics.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults to ./intel.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Compute one endpoint once and print the JSON envelope.
    Report(ReportArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Overrides `server.port`.
    #[arg(long)]
    port: Option<u16>,

    /// Overrides `logging.format`.
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

#[derive(Parser)]
struct ReportArgs {
    /// One of: overview, dominance, trending, movers, chain-ecosystem, chains-overview.
    endpoint: String,

    /// Query parameters as key=value; repeat for several (e.g. --query chains=eth --query limit=5).
    #[arg(long = "query", short = 'q', value_parser = parse_pair)]
    query: Vec<(String, String)>,
}

fn parse_pair(input: &str) -> Result<(String, String), String> {
    input
        .split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{}'", input))
}

// ==============================================================================
// Wiring
// ==============================================================================

fn build_intelligence(settings: &Settings) -> anyhow::Result<MarketIntelligence> {
    let provider: Arc<dyn ProviderClient> = match &settings.provider.snapshot_path {
        Some(path) => Arc::new(SnapshotProvider::from_file(path)?),
        None => Arc::new(DefiLlamaClient::new(&settings.provider)?),
    };
    let store = Arc::new(InMemoryCache::new(settings.cache.max_entries));

    Ok(MarketIntelligence::new(
        provider,
        Arc::new(QueryValidator::default()),
        CacheCoordinator::new(store),
        settings.cache.clone(),
    ))
}

async fn handle_report(args: ReportArgs, intelligence: &MarketIntelligence) -> anyhow::Result<()> {
    let endpoint: Endpoint = args.endpoint.parse()?;
    let raw = RawQuery::from_pairs(args.query);
    let envelope = intelligence.handle(endpoint, &raw).await?;
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}
