//! API Routes
//!
//! Configures the Axum router for the admin API.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    add_handler, clear_handler, delete_at_handler, entries_handler, eviction_status_handler,
    events_handler, health_handler, keys_handler, run_eviction_handler,
    schedule_eviction_handler, search_handler, set_backend_handler, start_handler,
    stats_handler, status_handler, stop_handler, AppState,
};

/// Creates the admin router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/server/start", post(start_handler))
        .route("/server/stop", post(stop_handler))
        .route("/server/status", get(status_handler))
        .route("/config/backend", put(set_backend_handler))
        .route("/cache", put(add_handler).delete(clear_handler))
        .route("/cache/keys", get(keys_handler))
        .route("/cache/entries", get(entries_handler))
        .route("/cache/entries/:position", delete(delete_at_handler))
        .route("/cache/search", get(search_handler))
        .route(
            "/cache/eviction",
            post(schedule_eviction_handler).get(eviction_status_handler),
        )
        .route("/cache/eviction/run", post(run_eviction_handler))
        .route("/stats", get(stats_handler))
        .route("/events", get(events_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
