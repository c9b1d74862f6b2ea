//! JSON HTTP API.
//!
//! Exposes the policy operations and the template review workflow under
//! `/ai/communication`, plus `/health`. Callers identify themselves with
//! the `x-actor-id` and `x-actor-role` headers.

pub mod actor;
pub mod error;
pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::orchestrator::GovernanceService;
use crate::{AppError, GlobalConfig, Result};

/// State shared by all handlers.
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<GlobalConfig>,
    /// Governance service.
    pub service: Arc<GovernanceService>,
}

/// Build the API router.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    use handlers as h;

    Router::new()
        .route("/health", get(h::health))
        .route(
            "/ai/communication/settings",
            get(h::get_settings).put(h::update_settings),
        )
        .route("/ai/communication/settings/validate", post(h::validate_settings))
        .route("/ai/communication/catalog", get(h::catalog))
        .route(
            "/ai/communication/tone-style",
            get(h::get_tone_style).put(h::update_tone_style),
        )
        .route("/ai/communication/schedule", post(h::schedule))
        .route("/ai/communication/evaluate", post(h::evaluate))
        .route(
            "/ai/communication/conversations/{id}/messages",
            post(h::inbound_message),
        )
        .route(
            "/ai/communication/conversations/{id}/escalation-check",
            post(h::escalation_check),
        )
        .route(
            "/ai/communication/conversations/{id}/resolve",
            post(h::resolve_conversation),
        )
        .route("/ai/communication/templates", post(h::create_template))
        .route("/ai/communication/templates/pending", get(h::pending_templates))
        .route("/ai/communication/templates/{id}", get(h::get_template))
        .route("/ai/communication/templates/{id}/actions", get(h::review_actions))
        .route("/ai/communication/templates/{id}/submit", post(h::submit_template))
        .route("/ai/communication/templates/{id}/approve", post(h::approve_template))
        .route("/ai/communication/templates/{id}/reject", post(h::reject_template))
        .route(
            "/ai/communication/templates/{id}/resubmit",
            post(h::resubmit_template),
        )
        .with_state(state)
}

/// Serve the API on `127.0.0.1:<http_port>` until `ct` is cancelled.
///
/// # Errors
///
/// Returns `AppError::Config` if the port cannot be bound, or
/// `AppError::Io` if the server fails.
pub async fn serve(state: Arc<AppState>, ct: CancellationToken) -> Result<()> {
    let bind = SocketAddr::from(([127, 0, 0, 1], state.config.http_port));
    let listener = TcpListener::bind(bind)
        .await
        .map_err(|err| AppError::Config(format!("failed to bind http on {bind}: {err}")))?;
    serve_on(listener, state, ct).await
}

/// Serve the API on an already bound listener until `ct` is cancelled.
///
/// # Errors
///
/// Returns `AppError::Io` if the server fails.
pub async fn serve_on(listener: TcpListener, state: Arc<AppState>, ct: CancellationToken) -> Result<()> {
    let local = listener.local_addr()?;
    info!(%local, "starting http api");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { ct.cancelled().await })
        .await
        .map_err(|err| AppError::Io(format!("http server error: {err}")))?;

    info!("http api shut down");
    Ok(())
}
