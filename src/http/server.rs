//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the unwrap handler
//! - Wire up middleware (tracing, request timeout, concurrency limit, request ID)
//! - Serve plain HTTP and, when configured, HTTPS
//! - Select the resolver for each request and run its redirect chain
//! - Observability (metrics, correlation IDs)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, Uri},
    response::Response,
    routing::any,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::chain::{Chain, ChainError};
use crate::config::{TlsConfig, UnwrapperConfig};
use crate::http::request::{originating_host, request_id, MakeRequestUuid};
use crate::http::response::{error_response, trace_response};
use crate::observability::metrics;
use crate::resolver::{HostRegistry, HttpProber, Prober};

/// Time given to in-flight HTTPS requests after shutdown is signalled.
const TLS_DRAIN_SECS: u64 = 10;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<HostRegistry>,
    pub prober: Arc<dyn Prober>,
    pub max_hops: usize,
}

/// HTTP server for the unwrapper.
pub struct HttpServer {
    router: Router,
    config: UnwrapperConfig,
}

impl HttpServer {
    /// Create a new HTTP server probing redirectors over the network.
    pub fn new(config: UnwrapperConfig, registry: Arc<HostRegistry>) -> Self {
        Self::with_prober(config, registry, Arc::new(HttpProber))
    }

    /// Create a server with a custom prober.
    pub fn with_prober(
        config: UnwrapperConfig,
        registry: Arc<HostRegistry>,
        prober: Arc<dyn Prober>,
    ) -> Self {
        let state = AppState {
            registry,
            prober,
            max_hops: config.chain.max_hops,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &UnwrapperConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(unwrap_handler))
            .route("/{*path}", any(unwrap_handler))
            .with_state(state)
            .layer(ConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until a shutdown signal is received.
    ///
    /// The HTTPS listener, if configured, is started first and drained after
    /// the plain listener stops.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let tls = match &self.config.listener.tls {
            Some(tls) => Some(self.spawn_tls(tls).await?),
            None => None,
        };

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        if let Some((handle, task)) = tls {
            handle.graceful_shutdown(Some(Duration::from_secs(TLS_DRAIN_SECS)));
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!(error = %e, "HTTPS server failed"),
                Err(e) => tracing::error!(error = %e, "HTTPS server task panicked"),
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    async fn spawn_tls(
        &self,
        tls: &TlsConfig,
    ) -> Result<(axum_server::Handle, JoinHandle<std::io::Result<()>>), std::io::Error> {
        let addr: SocketAddr = tls
            .bind_address
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        let rustls = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await?;

        let handle = axum_server::Handle::new();
        let app = self
            .router
            .clone()
            .into_make_service_with_connect_info::<SocketAddr>();
        let server = axum_server::bind_rustls(addr, rustls).handle(handle.clone());

        tracing::info!(address = %addr, "HTTPS server starting");
        let task = tokio::spawn(async move { server.serve(app).await });
        Ok((handle, task))
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &UnwrapperConfig {
        &self.config
    }
}

/// Unwrap handler.
/// Selects the resolver for the originating host and walks the chain.
async fn unwrap_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&headers);
    let path = uri.path();
    let origin = originating_host(&headers, &uri).unwrap_or_default();

    tracing::debug!(
        request_id = %request_id,
        peer = %peer,
        host = %origin,
        path = %path,
        "Unwrapping request"
    );

    let chain = match Chain::new(Arc::clone(&state.registry), &origin, path) {
        Ok(chain) => chain.with_max_hops(state.max_hops),
        Err(e) => {
            tracing::warn!(request_id = %request_id, host = %origin, error = %e, "No resolver for host");
            return finish(error_response(&e), Some(&e), start_time);
        }
    };

    let trace = chain.run(state.prober.as_ref()).await.sanitized();

    match &trace.error {
        Some(e) => tracing::error!(
            request_id = %request_id,
            hops = trace.hops.len(),
            error = %e,
            "Resolution failed"
        ),
        None => tracing::info!(
            request_id = %request_id,
            hops = trace.hops.len(),
            result = ?trace.final_url.as_ref().map(|u| u.as_str()),
            "completed processing request"
        ),
    }

    finish(trace_response(&trace), trace.error.as_ref(), start_time)
}

fn finish(response: Response, error: Option<&ChainError>, start_time: Instant) -> Response {
    if let Some(e) = error {
        metrics::record_chain_error(e.kind().as_str());
    }
    metrics::record_request(response.status().as_u16(), start_time);
    response
}
