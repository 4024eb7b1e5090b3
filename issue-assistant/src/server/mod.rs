//! HTTP surface: `GET /`, `GET /health`, `POST /analyze`.

mod error;

pub use error::{ApiError, ErrorBody};

use crate::analysis::IssueAnalysis;
use crate::pipeline::Pipeline;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// Service name reported by `/health`.
pub const SERVICE_NAME: &str = "github-issue-assistant";

/// Body of `POST /analyze`.
///
/// `issue_number` stays untyped so the pipeline can report a precise
/// `invalid_issue_number` instead of a generic extractor rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    /// Repository URL, e.g. `https://github.com/facebook/react`.
    pub repo_url: String,
    /// Positive issue number.
    pub issue_number: Value,
}

/// Builds the application router.
pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .with_state(pipeline)
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "GitHub Issue Assistant API",
        "status": "ok",
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn analyze(
    State(pipeline): State<Arc<Pipeline>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<IssueAnalysis>, ApiError> {
    let analysis = pipeline
        .analyze(&request.repo_url, &request.issue_number)
        .await?;
    Ok(Json(analysis))
}

/// Serves the router on `addr` until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the socket cannot be bound or the server fails.
pub async fn serve(addr: SocketAddr, pipeline: Arc<Pipeline>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, router(pipeline))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
