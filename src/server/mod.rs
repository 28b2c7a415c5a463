//! HTTP server for ag-kaizen

pub mod routes;

use crate::service::KaizenService;
use crate::taxonomy::Taxonomy;
use anyhow::{Context, Result};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Headroom on top of the LLM timeout before the whole request is cut off
const REQUEST_TIMEOUT_MARGIN: Duration = Duration::from_secs(10);

/// Application state shared across handlers
#[derive(Debug)]
pub struct AppState {
    pub taxonomy: Arc<Taxonomy>,
    pub service: KaizenService,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(taxonomy: Arc<Taxonomy>, service: KaizenService) -> Self {
        Self {
            taxonomy,
            service,
            start_time: Instant::now(),
        }
    }
}

/// Builds the router without binding a socket
pub fn router(state: AppState, llm_timeout: Duration) -> Router {
    let state = Arc::new(state);

    Router::new()
        .merge(routes::status_routes())
        .merge(routes::chat_routes())
        .with_state(state)
        .layer(TimeoutLayer::new(llm_timeout + REQUEST_TIMEOUT_MARGIN))
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until the process is stopped
pub async fn run(addr: SocketAddr, state: AppState, llm_timeout: Duration) -> Result<()> {
    let app = router(state, llm_timeout);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}
