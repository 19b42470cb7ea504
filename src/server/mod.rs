// src/server/mod.rs
// =============================================================================
// The web front end: an axum router sharing one ProgressBus between the
// analyze endpoint (publisher) and every open SSE stream (subscribers).
//
// Ctrl-C cancels in-flight analyses and closes every progress stream, then
// the server finishes the remaining requests and exits.
// =============================================================================

mod routes;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Settings;
use crate::inspect::Inspector;
use crate::progress::{ProgressBus, Reporter};

pub struct AppState {
    pub inspector: Inspector,
    pub bus: Arc<ProgressBus>,
    pub reporter: Reporter,
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(inspector: Inspector, bus: Arc<ProgressBus>, shutdown: CancellationToken) -> Self {
        Self {
            inspector,
            reporter: Reporter::new(bus.clone()),
            bus,
            shutdown,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/analyze", post(routes::analyze))
        .route("/sse", get(routes::progress_stream))
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            },
        ))
}

pub async fn run(addr: SocketAddr, settings: &Settings) -> Result<()> {
    let bus = ProgressBus::new(settings.subscriber_buffer);
    let shutdown = CancellationToken::new();
    let state = Arc::new(AppState::new(
        Inspector::new(settings)?,
        bus.clone(),
        shutdown.clone(),
    ));

    let listener = TcpListener::bind(addr).await?;
    info!("page-inspector listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal(shutdown, bus))
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken, bus: Arc<ProgressBus>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        return;
    }
    info!("shutting down");
    shutdown.cancel();
    bus.close_all();
}
