//! Proxy Cache - A forward caching relay
//!
//! Answers one-line requests from a response cache and forwards misses to a
//! fixed backend.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use proxy_cache::api::create_router;
use proxy_cache::{AppState, Config, EventLog};

/// Main entry point for the caching relay.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the relay service and its event log
/// 4. Start the client-facing listener (unless `AUTO_START=false`)
/// 5. Serve the admin API on the configured port
/// 6. On SIGINT/SIGTERM, stop the listener and exit
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "proxy_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Proxy Cache");

    let config = Config::from_env();
    info!(
        "Configuration loaded: proxy_port={}, backend={}:{}, admin_port={}",
        config.proxy_port, config.backend_host, config.backend_port, config.admin_port
    );

    let events = Arc::new(EventLog::new(config.event_log_capacity));
    let state = AppState::new(&config, events);
    let service = state.service.clone();

    if config.auto_start {
        service
            .start()
            .await
            .context("failed to start the proxy listener")?;
    } else {
        info!("AUTO_START disabled; start the proxy with POST /server/start");
    }

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.admin_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind admin API on {}", addr))?;
    info!("Admin API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("admin API server error")?;

    service.stop().await;
    info!("Proxy Cache shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
