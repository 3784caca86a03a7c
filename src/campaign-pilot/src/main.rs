//! Campaign Pilot — mock storefront/ad-platform API and the campaign lifecycle pipeline.
//!
//! `serve` runs the mock API server; `run` executes one create → analyze → decide
//! pass and prints the report as JSON on stdout.

use clap::{Parser, Subcommand};
use pilot_agents::{run_pipeline, CampaignBackend, HttpBackend};
use pilot_api::ApiServer;
use pilot_core::config::AppConfig;
use pilot_mock_api::{CampaignStore, SyntheticProvider};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "campaign-pilot")]
#[command(about = "Synthetic campaign metrics API and lifecycle decision pipeline")]
#[command(version)]
struct Cli {
    /// Optional TOML config file
    #[arg(long, global = true, env = "CAMPAIGN_PILOT_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the mock store / ad-platform API server
    Serve {
        /// Bind address (overrides config)
        #[arg(long, env = "CAMPAIGN_PILOT__API__HOST")]
        host: Option<String>,

        /// HTTP port (overrides config)
        #[arg(long, env = "CAMPAIGN_PILOT__API__HTTP_PORT")]
        http_port: Option<u16>,

        /// Seed for the synthetic metrics generator
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run the create → analyze → decide pipeline once
    Run {
        /// Base URL of a running mock API; uses an in-process provider when omitted
        #[arg(long)]
        remote: Option<String>,

        /// Seed for the in-process provider
        #[arg(long)]
        seed: Option<u64>,

        /// Clear existing campaigns before running
        #[arg(long, default_value_t = false)]
        reset: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `run` output stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "campaign_pilot=info,pilot_agents=info,pilot_mock_api=info,tower_http=info".into()
            }),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    match cli.command {
        Commands::Serve { host, http_port, seed } => {
            if let Some(host) = host {
                config.api.host = host;
            }
            if let Some(port) = http_port {
                config.api.http_port = port;
            }
            if seed.is_some() {
                config.provider.seed = seed;
            }
            serve(config).await
        }
        Commands::Run { remote, seed, reset } => {
            if seed.is_some() {
                config.provider.seed = seed;
            }
            if let Some(url) = remote.clone() {
                config.client.base_url = url;
            }
            run(config, remote.is_some(), reset).await
        }
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    info!(
        host = %config.api.host,
        http_port = config.api.http_port,
        seed = ?config.provider.seed,
        spend_cap_fraction = config.provider.spend_cap_fraction,
        "Configuration loaded"
    );

    let store = Arc::new(CampaignStore::new());
    let provider = Arc::new(SyntheticProvider::new(&config.provider, store)?);
    let api_server = ApiServer::new(config.clone(), provider);

    if config.metrics.enabled {
        if let Err(e) = api_server.start_metrics() {
            error!(error = %e, "Failed to start metrics exporter");
        }
    }

    info!("Campaign Pilot mock API is ready to serve traffic");

    // Blocks until shutdown
    api_server.start_http().await?;

    Ok(())
}

async fn run(config: AppConfig, remote: bool, reset: bool) -> anyhow::Result<()> {
    let backend: Arc<dyn CampaignBackend> = if remote {
        info!(base_url = %config.client.base_url, "Running pipeline against remote mock API");
        let backend = HttpBackend::new(&config.client)?;
        let health = backend.health().await?;
        info!(status = %health.status, "Remote mock API reachable");
        Arc::new(backend)
    } else {
        info!(seed = ?config.provider.seed, "Running pipeline against in-process provider");
        Arc::new(SyntheticProvider::new(&config.provider, Arc::new(CampaignStore::new()))?)
    };

    if reset {
        let summary = backend.reset().await?;
        info!(removed = summary.campaigns_removed, "Campaign store reset");
    }

    let report = run_pipeline(backend, &config).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
