//! Axum web server for the corrector API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use codefix_core::AttemptRecord;
use codefix_orchestrator::{Corrector, CorrectorError};
use codefix_runner::CodeRunner;
use codefix_storage::StorageError;
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::ServerStats;

/// Shared application state
pub struct AppState<R: CodeRunner> {
    pub corrector: Corrector<R>,
    pub stats: ServerStats,
    /// Records returned by `GET /history` when no limit is given
    pub history_limit: usize,
}

impl<R: CodeRunner> AppState<R> {
    pub fn new(corrector: Corrector<R>, history_limit: usize) -> Self {
        Self {
            corrector,
            stats: ServerStats::new(),
            history_limit,
        }
    }
}

pub type SharedState<R> = Arc<AppState<R>>;

/// Build the API router
pub fn router<R: CodeRunner + 'static>(state: SharedState<R>) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health::<R>))
        .route("/correct", post(handle_correct::<R>))
        .route("/history", get(handle_history::<R>))
        .route("/history/:id", get(handle_history_item::<R>))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the API until the process is stopped
pub async fn serve<R: CodeRunner + 'static>(state: SharedState<R>, addr: &str) -> anyhow::Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("codefix API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct CorrectRequest {
    code: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct CorrectResponse {
    id: i64,
    corrected_code: String,
    explanation: String,
    error_type: Option<String>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
struct HistoryItem {
    id: i64,
    original_code: String,
    corrected_code: String,
    error_message: String,
    explanation: String,
    timestamp: DateTime<Utc>,
}

impl From<AttemptRecord> for HistoryItem {
    fn from(record: AttemptRecord) -> Self {
        Self {
            id: record.id,
            original_code: record.original,
            corrected_code: record.corrected,
            error_message: record.failure_detail,
            explanation: record.explanation,
            timestamp: record.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct HealthResponse {
    status: String,
    uptime_seconds: u64,
    records: Option<i64>,
    cycles: u64,
    code_failures: u64,
    history_errors: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

/// GET / - liveness message
async fn handle_root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Backend is running" }))
}

/// GET /health
async fn handle_health<R: CodeRunner + 'static>(
    State(app): State<SharedState<R>>,
) -> Json<HealthResponse> {
    let records = app.corrector.history().count().await.ok();
    let status = match records {
        Some(_) => "ok",
        None => "degraded",
    };

    Json(HealthResponse {
        status: status.to_string(),
        uptime_seconds: app.stats.uptime().as_secs(),
        records,
        cycles: app.stats.cycles.load(Ordering::Relaxed),
        code_failures: app.stats.code_failures.load(Ordering::Relaxed),
        history_errors: app.stats.history_errors.load(Ordering::Relaxed),
    })
}

/// POST /correct - run one correction cycle
async fn handle_correct<R: CodeRunner + 'static>(
    State(app): State<SharedState<R>>,
    Json(request): Json<CorrectRequest>,
) -> Response {
    match app.corrector.correct(&request.code).await {
        Ok(outcome) => {
            app.stats.record_cycle(outcome.failure.is_some());
            let (error_type, error_message) = match outcome.failure {
                Some(f) => (Some(f.category), Some(f.detail)),
                None => (None, None),
            };
            Json(CorrectResponse {
                id: outcome.id,
                corrected_code: outcome.corrected,
                explanation: outcome.explanation,
                error_type,
                error_message,
            })
            .into_response()
        }
        Err(e @ CorrectorError::History(_)) => {
            app.stats.record_history_error();
            error!("{}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(e @ CorrectorError::Runner(_)) => {
            error!("{}", e);
            error_response(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
    }
}

/// GET /history?limit=N - most recent records, newest first
async fn handle_history<R: CodeRunner + 'static>(
    State(app): State<SharedState<R>>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let limit = query.limit.unwrap_or(app.history_limit);

    match app.corrector.history().recent(limit).await {
        Ok(records) => {
            let items: Vec<HistoryItem> = records.into_iter().map(HistoryItem::from).collect();
            Json(items).into_response()
        }
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to query history: {}", e),
        ),
    }
}

/// GET /history/:id - a single record
async fn handle_history_item<R: CodeRunner + 'static>(
    State(app): State<SharedState<R>>,
    Path(id): Path<i64>,
) -> Response {
    match app.corrector.history().get(id).await {
        Ok(record) => Json(HistoryItem::from(record)).into_response(),
        Err(StorageError::RecordNotFound(_)) => {
            error_response(StatusCode::NOT_FOUND, format!("No history record {}", id))
        }
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to query history: {}", e),
        ),
    }
}
