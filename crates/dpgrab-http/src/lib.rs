//! Liveness endpoint: `GET /` -> process status + chat connectivity.

use std::future::Future;
use std::net::SocketAddr;

use anyhow::Result;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;

use dpgrab_core::status::ConnectionStatus;

/// Response body for `GET /`.
#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
    pub connected: bool,
}

async fn handle_liveness(State(status): State<ConnectionStatus>) -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "running",
        connected: status.is_connected(),
    })
}

/// Build the liveness router (single route).
pub fn router(status: ConnectionStatus) -> Router {
    Router::new()
        .route("/", get(handle_liveness))
        .with_state(status)
}

/// Serve the liveness endpoint on `0.0.0.0:<port>` until `shutdown` resolves.
pub async fn serve(
    port: u16,
    status: ConnectionStatus,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "liveness endpoint listening");
    axum::serve(listener, router(status))
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!("liveness endpoint stopped");
    Ok(())
}
