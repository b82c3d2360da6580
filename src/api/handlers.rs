//! API Handlers
//!
//! HTTP request handlers for each admin endpoint. Each one is a thin call
//! into [`ProxyService`]; the service reports the human-readable events.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::error::{ProxyError, Result};
use crate::events::{Event, EventLog};
use crate::models::{
    AddRequest, BackendRequest, ClearResponse, DeleteResponse, EntriesResponse,
    EvictionStatusResponse, HealthResponse, KeysResponse, MessageResponse, ScheduleRequest,
    SearchHit, SearchQuery, SearchResponse, StatsResponse,
};
use crate::proxy::BackendTarget;
use crate::service::{ProxyService, ServerStatus};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The relay service
    pub service: ProxyService,
    /// Sink the service reports to, exposed at GET /events
    pub events: Arc<EventLog>,
}

impl AppState {
    /// Creates a service reporting into `events`.
    pub fn new(config: &crate::config::Config, events: Arc<EventLog>) -> Self {
        let service = ProxyService::new(config, events.clone());
        Self { service, events }
    }

    /// Creates a new AppState from configuration with a fresh event log.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(config, Arc::new(EventLog::new(config.event_log_capacity)))
    }
}

// == Server ==

/// Handler for POST /server/start
pub async fn start_handler(State(state): State<AppState>) -> Result<Json<ServerStatus>> {
    state.service.start().await?;
    Ok(Json(state.service.status().await))
}

/// Handler for POST /server/stop
pub async fn stop_handler(State(state): State<AppState>) -> Json<ServerStatus> {
    state.service.stop().await;
    Json(state.service.status().await)
}

/// Handler for GET /server/status
pub async fn status_handler(State(state): State<AppState>) -> Json<ServerStatus> {
    Json(state.service.status().await)
}

/// Handler for PUT /config/backend
pub async fn set_backend_handler(
    State(state): State<AppState>,
    Json(req): Json<BackendRequest>,
) -> Result<Json<BackendTarget>> {
    if let Some(error_msg) = req.validate() {
        return Err(ProxyError::InvalidRequest(error_msg));
    }
    Ok(Json(state.service.set_backend(req.host, req.port).await))
}

// == Cache ==

/// Handler for GET /cache/keys
pub async fn keys_handler(State(state): State<AppState>) -> Json<KeysResponse> {
    Json(KeysResponse {
        keys: state.service.list_keys().await,
    })
}

/// Handler for GET /cache/entries
pub async fn entries_handler(State(state): State<AppState>) -> Json<EntriesResponse> {
    Json(EntriesResponse::new(state.service.list_entries().await))
}

/// Handler for PUT /cache
pub async fn add_handler(
    State(state): State<AppState>,
    Json(req): Json<AddRequest>,
) -> Result<Json<MessageResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ProxyError::InvalidRequest(error_msg));
    }

    let message = format!("Added to cache: {}", req.key);
    state.service.add(req.key, req.value).await;
    Ok(Json(MessageResponse::new(message)))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    Json(ClearResponse {
        removed: state.service.clear().await,
    })
}

/// Handler for DELETE /cache/entries/:position
pub async fn delete_at_handler(
    State(state): State<AppState>,
    Path(position): Path<i64>,
) -> Result<Json<DeleteResponse>> {
    let (key, _) = state.service.delete_at(position).await?;
    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /cache/search?key=... or ?fragment=...
pub async fn search_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>> {
    let matches = match (query.key, query.fragment) {
        (Some(key), _) => {
            let found = state.service.search_by_key(&key).await;
            found
                .map(|value| SearchHit {
                    key,
                    value: Some(value),
                })
                .into_iter()
                .collect()
        }
        (None, Some(fragment)) => state
            .service
            .search_by_substring(&fragment)
            .await
            .into_iter()
            .map(|key| SearchHit { key, value: None })
            .collect(),
        (None, None) => {
            return Err(ProxyError::InvalidRequest(
                "Provide either `key` or `fragment`".to_string(),
            ))
        }
    };

    Ok(Json(SearchResponse::new(matches)))
}

// == Eviction ==

/// Handler for POST /cache/eviction
pub async fn schedule_eviction_handler(
    State(state): State<AppState>,
    Json(req): Json<ScheduleRequest>,
) -> Result<Json<EvictionStatusResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ProxyError::InvalidRequest(error_msg));
    }

    state.service.schedule_eviction(req.delay()).await;
    Ok(Json(state.service.pending_eviction().await.into()))
}

/// Handler for GET /cache/eviction
pub async fn eviction_status_handler(State(state): State<AppState>) -> Json<EvictionStatusResponse> {
    Json(state.service.pending_eviction().await.into())
}

/// Handler for POST /cache/eviction/run
pub async fn run_eviction_handler(State(state): State<AppState>) -> Json<MessageResponse> {
    let outcome = state.service.run_eviction_now().await;
    Json(MessageResponse::new(outcome.message()))
}

// == Observability ==

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.service.stats().await.into())
}

/// Handler for GET /events
pub async fn events_handler(State(state): State<AppState>) -> Json<Vec<Event>> {
    Json(state.events.snapshot())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
