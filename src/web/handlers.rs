//! HTTP request handlers.

use super::AppState;
use crate::report::{Dashboard, ReportError, Snapshot};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const NO_DATA: &str = "No monitoring data found. Run `uptrail monitor` first.";

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        tracing::error!("Report generation failed: {}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

fn load(state: &AppState) -> Result<Option<Snapshot>, ReportError> {
    Snapshot::load(&state.store, state.config.window_secs)
}

// ============================================================================
// Dashboard
// ============================================================================

pub async fn handle_dashboard(State(state): State<AppState>) -> Result<Response, ReportError> {
    let Some(snapshot) = load(&state)? else {
        return Ok((StatusCode::NOT_FOUND, Html(format!("<p>{}</p>", NO_DATA))).into_response());
    };

    let windows = snapshot.windows()?;
    let page = Dashboard {
        report: &snapshot.report,
        windows: &windows,
        endpoint: &state.config.api_url,
        generated_at: Utc::now(),
    }
    .render()?;

    Ok(Html(page).into_response())
}

// ============================================================================
// API
// ============================================================================

pub async fn handle_report(State(state): State<AppState>) -> Result<Response, ReportError> {
    match load(&state)? {
        Some(snapshot) => Ok(Json(snapshot.report).into_response()),
        None => Ok((StatusCode::NOT_FOUND, NO_DATA).into_response()),
    }
}

#[derive(Debug, Serialize)]
pub struct ApiWindow {
    pub start: i64,
    pub total: u64,
    pub successful: u64,
    pub up: bool,
}

pub async fn handle_windows(State(state): State<AppState>) -> Result<Response, ReportError> {
    let Some(snapshot) = load(&state)? else {
        return Ok(Json(Vec::<ApiWindow>::new()).into_response());
    };

    let windows: Vec<ApiWindow> = snapshot
        .windows()?
        .into_iter()
        .map(|(start, stats)| ApiWindow {
            start,
            total: stats.total,
            successful: stats.successful,
            up: stats.is_up(),
        })
        .collect();

    Ok(Json(windows).into_response())
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ApiLog {
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub status: u16,
    pub response: String,
}

pub async fn handle_logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Result<Response, ReportError> {
    let limit = query.limit.unwrap_or(50).min(1000);
    let logs: Vec<ApiLog> = state
        .store
        .recent_logs(limit)?
        .into_iter()
        .map(|log| ApiLog {
            timestamp: log.timestamp,
            name: log.name_parameter,
            status: log.response_status,
            response: log.response_text,
        })
        .collect();

    Ok(Json(logs).into_response())
}
