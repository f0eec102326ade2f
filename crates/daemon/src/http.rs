// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loopback-only ingest HTTP surface (spec §4.J / §6.2).

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use devlog_config::{ComponentKind, ConfigSubstrate};
use devlog_core::{parse_duration, DevLogError, ErrorBody, Event};
use devlog_runtime::{Metrics, MetricsSummary, Registries};
use devlog_storage::{QueryOptions, SortOrder, StorageEngine};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::events::EventService;

/// Session records are stored as ordinary events under this source, so
/// the HTTP surface only needs the storage capability it already has —
/// no separate session store (spec §4.J: "core exposes only the storage
/// capability it needs").
const SESSION_SOURCE: &str = "session";

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<StorageEngine>,
    pub registries: Arc<Registries>,
    pub config: Arc<ConfigSubstrate>,
    pub metrics: Arc<Metrics>,
    pub events: Arc<EventService>,
    pub start_time: Instant,
    pub queue_dir: std::path::PathBuf,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/ingest", post(ingest))
        .route("/api/v1/status", get(status))
        .route("/api/v1/metrics", get(metrics))
        .route("/api/v1/events", get(recent_events))
        .route("/api/v1/search", get(search_events))
        .route("/api/v1/sessions", post(create_session).get(list_sessions))
        .with_state(state)
}

/// Serve `router(state)` on loopback until `cancel` fires, with a 10 s
/// grace period for in-flight requests (spec §5 "HTTP grace 10 s").
pub async fn serve(state: AppState, port: u16, cancel: CancellationToken) -> std::io::Result<()> {
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "ingest http surface listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
}

#[derive(Debug, Serialize)]
struct IngestResponse {
    success: bool,
    filtered: bool,
    id: String,
}

async fn ingest(
    State(state): State<AppState>,
    body: axum::body::Bytes,
) -> axum::response::Response {
    let event = match Event::from_json(&body) {
        Ok(event) => event,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &DevLogError::Validation(e.to_string())),
    };
    if let Err(e) = event.validate() {
        return error_response(StatusCode::BAD_REQUEST, &DevLogError::Validation(e.to_string()));
    }

    let filtered = state
        .registries
        .ingest_handlers
        .get(&event.source)
        .map(|filter| {
            let config = state
                .config
                .get_config(ComponentKind::Module, &event.source)
                .map(|c| c.extra)
                .unwrap_or(Value::Null);
            !filter.should_capture(&event, &config)
        })
        .unwrap_or(false);

    if filtered {
        return Json(IngestResponse {
            success: true,
            filtered: true,
            id: event.id,
        })
        .into_response();
    }

    match state.storage.insert(&event) {
        Ok(()) => {
            state.metrics.record_event_ingested(&event.source, &event.event_type);
            Json(IngestResponse {
                success: true,
                filtered: false,
                id: event.id,
            })
            .into_response()
        }
        Err(devlog_storage::StorageError::DuplicateId(id)) => Json(IngestResponse {
            success: true,
            filtered: false,
            id,
        })
        .into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &DevLogError::Io(std::io::Error::other(e.to_string()))),
    }
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    event_count: u64,
    uptime_seconds: u64,
}

async fn status(State(state): State<AppState>) -> axum::response::Response {
    match state.storage.count() {
        Ok(event_count) => Json(StatusResponse {
            event_count,
            uptime_seconds: state.start_time.elapsed().as_secs(),
        })
        .into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &DevLogError::Io(std::io::Error::other(e.to_string()))),
    }
}

#[derive(Debug, Deserialize)]
struct MetricsQuery {
    #[serde(default)]
    summary: bool,
}

async fn metrics(
    State(state): State<AppState>,
    Query(query): Query<MetricsQuery>,
) -> Json<MetricsSummary> {
    // Every metrics payload is the summary view; `summary=false` is
    // accepted for wire compatibility but has nothing leaner to fall
    // back to, since `get_summary` is already the one exported shape.
    let _ = query.summary;

    let queue_depth = std::fs::read_dir(&state.queue_dir).map(|d| d.count() as u64).unwrap_or(0);
    let db_size = state.storage.db_size_bytes().unwrap_or(0);
    let event_count = state.storage.count().unwrap_or(0);
    state.metrics.update_system_metrics(queue_depth, db_size, event_count);

    Json(state.metrics.get_summary())
}

#[derive(Debug, Deserialize)]
struct RecentQuery {
    #[serde(default)]
    limit: u32,
    source: Option<String>,
}

async fn recent_events(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> axum::response::Response {
    match state.events.recent(query.limit, query.source.as_deref()) {
        Ok(events) => Json(events).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &DevLogError::Io(std::io::Error::other(e.to_string()))),
    }
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
    since: Option<String>,
    #[serde(default)]
    limit: u32,
}

async fn search_events(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> axum::response::Response {
    let since = match query.since.as_deref().map(parse_duration) {
        Some(Ok(d)) => match chrono::Duration::from_std(d) {
            Ok(d) => Some(chrono::Utc::now() - d),
            Err(_) => return error_response(StatusCode::BAD_REQUEST, &DevLogError::Validation("--since duration out of range".into())),
        },
        Some(Err(e)) => return error_response(StatusCode::BAD_REQUEST, &DevLogError::Validation(e.to_string())),
        None => None,
    };
    match state.events.search(&query.q, since, query.limit) {
        Ok(events) => Json(events).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &DevLogError::Io(std::io::Error::other(e.to_string()))),
    }
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    success: bool,
    id: String,
}

async fn create_session(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> axum::response::Response {
    let mut event = Event::new(SESSION_SOURCE, "session");
    if let Value::Object(map) = payload {
        event.payload = map;
    }

    match state.storage.insert(&event) {
        Ok(()) | Err(devlog_storage::StorageError::DuplicateId(_)) => Json(SessionResponse {
            success: true,
            id: event.id,
        })
        .into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &DevLogError::Io(std::io::Error::other(e.to_string()))),
    }
}

async fn list_sessions(State(state): State<AppState>) -> axum::response::Response {
    let options = QueryOptions {
        source: Some(SESSION_SOURCE.to_string()),
        sort_order: SortOrder::TimeDesc,
        ..Default::default()
    };
    match state.storage.query(&options) {
        Ok(events) => Json(events).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &DevLogError::Io(std::io::Error::other(e.to_string()))),
    }
}

fn error_response(status: StatusCode, error: &DevLogError) -> axum::response::Response {
    (status, Json(ErrorBody::from(error))).into_response()
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
