use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use log::{error, info};

use crate::error::Result;
use crate::sink::JobGauges;

const TEXT_FORMAT: &str = "text/plain; version=0.0.4; charset=utf-8";

pub fn router(gauges: Arc<JobGauges>) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/healthz", get(health))
        .with_state(gauges)
}

/// Serves the exposition endpoints until the listener fails.
pub async fn serve(addr: SocketAddr, gauges: Arc<JobGauges>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Serving metrics on http://{addr}/metrics");
    axum::serve(listener, router(gauges)).await?;
    Ok(())
}

async fn metrics(State(gauges): State<Arc<JobGauges>>) -> Response {
    match gauges.encode() {
        Ok(body) => ([(header::CONTENT_TYPE, TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn health() -> StatusCode {
    StatusCode::OK
}
