//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics exporter when enabled
//! - Build the route registry from discovery
//! - Bind the listener and run the dispatcher
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - A bind failure triggers the shared shutdown signal before returning
//! - Listener starts last (traffic only when ready)

use std::net::SocketAddr;

use metrics_exporter_prometheus::BuildError;
use thiserror::Error;

use crate::config::ServerConfig;
use crate::http::{Dispatcher, ServerContext, ServerError};
use crate::lifecycle::Shutdown;
use crate::net::{Listener, ListenerError};
use crate::observability::metrics;
use crate::routing::{Discovery, RouteRegistry};

/// Errors that abort startup or serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Server(#[from] ServerError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] BuildError),
}

/// Run the server until `shutdown` fires.
pub async fn run<D>(
    config: ServerConfig,
    discovery: &D,
    shutdown: Shutdown,
) -> Result<(), StartupError>
where
    D: Discovery + ?Sized,
{
    if config.observability.metrics_enabled {
        let raw = &config.observability.metrics_address;
        let addr: SocketAddr = raw
            .parse()
            .map_err(|_| StartupError::MetricsAddress(raw.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let registry = RouteRegistry::discover(discovery);
    tracing::info!(routes = registry.len(), "Route registry built");

    let context = ServerContext::new(config, registry);
    let dispatcher = Dispatcher::new(context.clone())?;

    let listener = match Listener::bind(&context.config.listener).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, "Listener failed to start");
            shutdown.trigger();
            return Err(e.into());
        }
    };

    dispatcher.run(listener, shutdown.subscribe()).await?;
    tracing::info!("Server stopped");
    Ok(())
}
