//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the host registry from validated configuration
//! - Start the metrics exporter when enabled
//! - Bind listeners and begin accepting traffic
//! - Wire OS signals to the shutdown coordinator
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::UnwrapperConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::resolver::{HostRegistry, RegistryError};

/// Fatal errors raised before or while serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build resolver registry: {0}")]
    Registry(#[from] RegistryError),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Run the unwrapper until a shutdown signal arrives.
pub async fn run(config: UnwrapperConfig) -> Result<(), StartupError> {
    let registry = Arc::new(HostRegistry::from_config(&config)?);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        max_hops = config.chain.max_hops,
        request_timeout_secs = config.timeouts.request_secs,
        hosts = ?registry.hosts(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr);
    }

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    shutdown.trigger_on_signal();

    HttpServer::new(config, registry).run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
