//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, in-flight limit, request ID, gate)
//! - Bind server to listener
//! - Forward allowed requests to the page renderer
//! - Swap in reloaded configuration without dropping connections

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware,
    response::Response,
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::EdgeConfig;
use crate::gate::EdgeGate;
use crate::http::forward::{upstream_target, Forwarder};
use crate::http::middleware::{edge_middleware, limit_middleware, InFlightLimit};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::response::bad_gateway;
use crate::lifecycle::signals::wait_for_signal;
use crate::observability::metrics;

/// The parts of the configuration that can change at runtime.
#[derive(Debug)]
pub struct LiveConfig {
    pub gate: EdgeGate,
    pub app_upstream: String,
}

impl LiveConfig {
    pub fn from_config(config: &EdgeConfig) -> Self {
        Self {
            gate: EdgeGate::from_config(config),
            app_upstream: config.app.upstream_url.clone(),
        }
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub live: Arc<ArcSwap<LiveConfig>>,
    pub forwarder: Forwarder,
}

/// HTTP server for the edge gate.
pub struct HttpServer {
    router: Router,
    config: EdgeConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: EdgeConfig) -> Self {
        let state = AppState {
            live: Arc::new(ArcSwap::from_pointee(LiveConfig::from_config(&config))),
            forwarder: Forwarder::new(),
        };

        let router = Self::build_router(&config, state.clone());
        Self {
            router,
            config,
            state,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &EdgeConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(app_handler))
            .route("/{*path}", any(app_handler))
            .layer(middleware::from_fn_with_state(state.clone(), edge_middleware))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::from_fn_with_state(
                InFlightLimit::new(config.listener.max_connections),
                limit_middleware,
            ))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Each configuration received on `config_updates` replaces the gate and
    /// upstream for subsequent requests. Listener, timeout and concurrency
    /// settings are fixed at startup.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<EdgeConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let live = self.state.live.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                live.store(Arc::new(LiveConfig::from_config(&new_config)));
                metrics::record_config_reload(true);
                tracing::info!(
                    upstream = %new_config.app.upstream_url,
                    "Configuration reloaded"
                );
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown.recv() => {}
                    _ = wait_for_signal() => {}
                }
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the startup config.
    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }
}

/// Forward a request the gate let through to the page renderer.
async fn app_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let upstream = state.live.load().app_upstream.clone();
    let target = upstream_target(&upstream, request.uri().path_and_query());
    let request_id = request_id(request.headers()).to_string();

    match state.forwarder.forward(request, &target).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(request_id = %request_id, target = %target, error = %e, "Upstream error");
            bad_gateway()
        }
    }
}
