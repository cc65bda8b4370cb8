use axum::{Extension, Router};
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse};
use tower_http::LatencyUnit;

pub mod auth;
mod config;
pub mod error;
mod handlers;
mod health;
mod html;
pub mod session;

pub use config::Config;
pub use session::{SessionKey, SessionKeyError, SessionLifetime};

use crate::ServiceState;

const STATUS_PREFIX: &str = "/_status";

/// Every route the server answers, with sessions attached.
///
/// Kept separate from [`run_app`] so the whole surface can be driven
/// without a listener.
pub fn router(state: ServiceState, session_key: SessionKey, lifetime: SessionLifetime) -> Router {
    let sessions = session::layer(state.sessions().clone(), session_key, lifetime);

    Router::new()
        .nest(STATUS_PREFIX, health::router(state.clone()))
        .merge(html::router(state.clone()))
        .fallback(handlers::not_found_handler)
        .layer(Extension(lifetime))
        .layer(sessions)
        .with_state(state)
}

/// Run the HTTP server until the shutdown channel fires.
pub async fn run_app(
    config: Config,
    state: ServiceState,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<(), HttpServerError> {
    let listen_addr = config.listen_addr;
    let log_level = config.log_level;
    let trace_layer = TraceLayer::new_for_http()
        .on_response(
            DefaultOnResponse::new()
                .include_headers(false)
                .level(log_level)
                .latency_unit(LatencyUnit::Micros),
        )
        .on_failure(DefaultOnFailure::new().latency_unit(LatencyUnit::Micros));

    let router = router(state, config.session_key, config.session_lifetime).layer(trace_layer);

    tracing::info!(addr = ?listen_addr, "HTTP server listening");
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        })
        .await?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("an error occurred running the HTTP server: {0}")]
    ServingFailed(#[from] std::io::Error),
}
