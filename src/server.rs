use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::error_handling::HandleErrorLayer;
use axum::routing::any;
use axum::{BoxError, Router};
use http::header::{CACHE_CONTROL, CONTENT_TYPE};
use http::HeaderValue;
use tokio::net::TcpListener;
use tower::timeout::error::Elapsed;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::ApiError;

use crate::config::Config;
use crate::node::{EthClient, NodeClient};
use crate::routes::{dispatch, RouteTable};

const NO_CACHE: &str = "no-store, no-cache, must-revalidate, post-check=0, pre-check=0";

/// Shared state for the HTTP server.
///
/// The node client is read-only after construction and shared by every
/// in-flight request.
pub struct AppState {
    pub client: Arc<dyn NodeClient>,
    pub routes: RouteTable,
}

impl AppState {
    pub fn new(client: Arc<dyn NodeClient>) -> Result<Self> {
        let routes = RouteTable::new().context("Failed to compile route table")?;
        Ok(Self { client, routes })
    }
}

/// Build the HTTP router: every path goes through the route manifest, and
/// every response gets the no-cache and JSON content-type headers.
///
/// A request still running after `timeout` is dropped and answered with
/// a 408 error body.
pub fn build_router(state: Arc<AppState>, timeout: Duration) -> Router {
    Router::new()
        .route("/", any(dispatch))
        .route("/*path", any(dispatch))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(move |err: BoxError| async move {
                    middleware_error(err, timeout)
                }))
                .layer(TimeoutLayer::new(timeout)),
        )
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(NO_CACHE),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ))
        .layer(TraceLayer::new_for_http())
}

fn middleware_error(err: BoxError, timeout: Duration) -> ApiError {
    if err.is::<Elapsed>() {
        warn!(timeout_ms = timeout.as_millis() as u64, "Request timed out");
        ApiError::Timeout(timeout)
    } else {
        ApiError::Internal(err.to_string())
    }
}

/// Connect to the node, then serve HTTP until a shutdown signal arrives.
pub async fn start_server(config: Config) -> Result<()> {
    info!("Connecting to Ethereum node at {}", config.node_url);
    let client = EthClient::new(&config.node_url);

    // The process is useless without a node, so fail fast instead of
    // retrying on each request.
    let head = client
        .block_number()
        .await
        .with_context(|| format!("Could not reach Ethereum node at {}", config.node_url))?;
    info!("Node reachable, head block: {}", head);

    let state = Arc::new(AppState::new(Arc::new(client))?);
    let router = build_router(state, config.api_timeout);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind server to {}", addr))?;

    info!("REST gateway listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("REST gateway stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Could not listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Could not listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
