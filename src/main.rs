//! SagaPay instant payment notification receiver.

use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use secrecy::ExposeSecret;
use tokio::signal;
use tracing::{info, warn};

use sagapay::api::{ReceiverConfig, create_router_with_config};
use sagapay::app::{AppState, LoggingEventHandler, WebhookVerifier};
use sagapay::infra::{init_metrics_handle, init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = ReceiverConfig::from_env().context("invalid receiver configuration")?;
    init_tracing(config.json_logs);

    let verifier = Arc::new(WebhookVerifier::new(config.webhook_secret.expose_secret()));
    let mut app_state = AppState::new(verifier, Arc::new(LoggingEventHandler))
        .with_max_body_bytes(config.max_body_bytes)
        .with_handler_timeout(config.router.request_timeout);
    match init_metrics_handle() {
        Some(handle) => app_state = app_state.with_metrics(handle),
        None => warn!("Prometheus recorder unavailable, /metrics disabled"),
    }

    let router = create_router_with_config(Arc::new(app_state), &config.router);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!(
        addr = %config.bind_addr,
        webhook_path = %config.router.webhook_path,
        timeout_secs = config.router.request_timeout.as_secs(),
        "Webhook receiver listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Webhook receiver stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
