//! Ethereum REST Gateway
//!
//! Entry point for the gateway. Loads configuration from environment/.env
//! file, checks the node is reachable and starts the HTTP server on the
//! configured address.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use eth_rest_gateway::config::Config;
use eth_rest_gateway::server::start_server;

/// Debug mode logs human-readable lines at `debug`; otherwise JSON lines at
/// `info`. `RUST_LOG` overrides the level in both modes.
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Configuration decides the log format, so it is loaded first
    let config = Config::from_env()?;

    init_logging(config.enable_debug);

    info!("=== Ethereum REST Gateway ===");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!(
        "Running on {} cpus",
        std::thread::available_parallelism().map_or(1, |n| n.get())
    );

    info!("Configuration:");
    info!("  Listen: {}", config.bind_addr());
    info!("  Node: {}", config.node_url);
    info!("  Request timeout: {}s", config.api_timeout.as_secs());
    info!("  Debug: {}", config.enable_debug);

    start_server(config).await?;

    Ok(())
}
