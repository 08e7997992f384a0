//! Liveness HTTP endpoint.
//!
//! Hosting platforms probe the process over HTTP; the bot itself talks to
//! Telegram by long polling, so this listener only reports that it is up.
//!
//! GET /        - liveness
//! GET /health  - liveness

use std::future::Future;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use tracing::info;

pub const ALIVE_BODY: &str = "Bot is running!";

async fn alive() -> &'static str {
    ALIVE_BODY
}

/// Router answering the liveness probes
pub fn router() -> Router {
    Router::new().route("/", get(alive)).route("/health", get(alive))
}

/// Serve the liveness endpoint on `0.0.0.0:port` until `shutdown` resolves.
pub async fn serve<F>(port: u16, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind liveness listener on {addr}"))?;
    info!(%addr, "Liveness endpoint listening");

    axum::serve(listener, router())
        .with_graceful_shutdown(shutdown)
        .await
        .context("Liveness server error")
}
