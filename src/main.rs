//! Route dispatch server.
//!
//! Loads configuration, discovers the built-in controllers and serves them
//! until SIGINT/SIGTERM.

use std::path::PathBuf;

use clap::Parser;

use route_dispatch::config::validation::validate_config;
use route_dispatch::config::{load_config, ConfigError, ServerConfig};
use route_dispatch::controllers::default_controllers;
use route_dispatch::lifecycle::{self, Shutdown};
use route_dispatch::observability::logging;
use route_dispatch::routing::RouteRegistry;

#[derive(Parser)]
#[command(name = "route-dispatch")]
#[command(about = "HTTP API server dispatching requests to declared routes", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.host.
    #[arg(long)]
    host: Option<String>,

    /// Override listener.port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Print the route table in match order and exit.
    #[arg(long)]
    list_routes: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(host) = cli.host {
        config.listener.host = host;
    }
    if let Some(port) = cli.port {
        config.listener.port = port;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    let discovery = default_controllers();

    if cli.list_routes {
        for entry in RouteRegistry::discover(&discovery).entries() {
            println!("{:<7} {:<32} {}", entry.method(), entry.pattern().as_str(), entry.origin());
        }
        return Ok(());
    }

    logging::init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "route-dispatch starting");
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        server_header = %config.server.header,
        drain_timeout_secs = ?config.server.drain_timeout_secs,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    lifecycle::spawn_signal_handler(shutdown.clone());

    lifecycle::run(config, &discovery, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
