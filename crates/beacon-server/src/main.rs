//! Beacon server binary.

use beacon_core::config::BeaconConfig;
use beacon_core::telemetry::{init_telemetry, TelemetryConfig};
use beacon_server::{api, AppState};
use clap::Parser;

/// Beacon service-discovery registry server.
#[derive(Parser, Debug)]
#[command(name = "beacon-server")]
#[command(about = "In-memory service-discovery registry")]
#[command(version)]
struct Cli {
    /// Address to bind the HTTP listener to
    #[arg(short, long)]
    bind: Option<String>,

    /// Client lease timeout in milliseconds (u64::MAX disables expiry)
    #[arg(long)]
    lease_timeout_ms: Option<u64>,

    /// Eviction timeout for DOWN peers in milliseconds
    #[arg(long)]
    peer_eviction_timeout_ms: Option<u64>,

    /// Sampling weight for seed nodes
    #[arg(long)]
    seed_node_weight: Option<u64>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn into_config(self) -> BeaconConfig {
        let mut config = BeaconConfig::default();
        if let Some(bind) = self.bind {
            config.http.bind_address = bind;
        }
        if let Some(timeout) = self.lease_timeout_ms {
            config.registry.lease_timeout_ms = timeout;
        }
        if let Some(timeout) = self.peer_eviction_timeout_ms {
            config.cluster.down_peer_eviction_timeout_ms = timeout;
        }
        if let Some(weight) = self.seed_node_weight {
            config.cluster.seed_node_weight = weight;
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    init_telemetry(TelemetryConfig::new("beacon-server").with_log_level(level))?;

    let config = cli.into_config();
    config.validate()?;

    let state = AppState::new(&config);
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.http.bind_address).await?;
    tracing::info!(bind = %config.http.bind_address, "beacon server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("beacon server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to install ctrl-c handler");
    }
}
