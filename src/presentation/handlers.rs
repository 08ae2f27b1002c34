// HTTP request handlers
use crate::application::report_service::{RecordSelection, ReportKind};
use crate::application::variable_repository::FetchError;
use crate::infrastructure::pdf_writer::ReportError;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Deserialize)]
pub struct ReportQuery {
    pub title: Option<String>,
    pub module: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List every monitored variable
pub async fn list_variables(State(state): State<Arc<AppState>>) -> Response {
    match state.dashboard_service.all_variables().await {
        Ok(records) => Json(records).into_response(),
        Err(error) => fetch_error_response(error),
    }
}

/// List the variables belonging to one hardware module
pub async fn variables_by_module(
    Path(module): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.dashboard_service.variables_by_module(&module).await {
        Ok(records) => Json(records).into_response(),
        Err(error) => fetch_error_response(error),
    }
}

/// List the variables recorded inside a date range. Both bounds are
/// required; date-only bounds are widened to cover the whole day.
pub async fn variables_by_range(
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let start = query.start_date.unwrap_or_default();
    let end = query.end_date.unwrap_or_default();
    match state.dashboard_service.variables_by_range(&start, &end).await {
        Ok(records) => Json(records).into_response(),
        Err(error) => fetch_error_response(error),
    }
}

/// Per-symbol chart series with trend indicators
pub async fn symbol_charts(State(state): State<Arc<AppState>>) -> Response {
    match state.dashboard_service.symbol_charts().await {
        Ok(series) => Json(series).into_response(),
        Err(error) => fetch_error_response(error),
    }
}

/// Deduplicated dashboard tile counts
pub async fn summary(State(state): State<Arc<AppState>>) -> Response {
    match state.dashboard_service.summary().await {
        Ok(summary) => Json(summary).into_response(),
        Err(error) => fetch_error_response(error),
    }
}

/// Build a PDF report and return it as a file download
pub async fn download_report(
    Path(kind): Path<String>,
    Query(query): Query<ReportQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Some(kind) = ReportKind::parse(&kind) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "unknown report kind; expected table, complete or advanced",
        );
    };

    let selection = RecordSelection {
        module: query.module,
        start_date: query.start_date,
        end_date: query.end_date,
    };
    let title = query
        .title
        .unwrap_or_else(|| "Industrial Monitoring Report".to_string());

    match state
        .report_service
        .generate(kind, &selection, &title)
        .await
    {
        Ok(artifact) => (
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", artifact.filename),
                ),
            ],
            artifact.bytes,
        )
            .into_response(),
        Err(error) => report_error_response(error),
    }
}

fn fetch_error_response(error: FetchError) -> Response {
    match error {
        FetchError::Validation(message) => error_response(StatusCode::BAD_REQUEST, &message),
        FetchError::Transport(message) => {
            tracing::error!("upstream fetch failed: {}", message);
            error_response(StatusCode::BAD_GATEWAY, "upstream variables API unavailable")
        }
    }
}

fn report_error_response(error: ReportError) -> Response {
    match error {
        ReportError::NoData => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "no variables available for the selected report",
        ),
        ReportError::Document(message) => {
            tracing::error!("report generation failed: {}", message);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to assemble the report document",
            )
        }
        ReportError::Fetch(error) => fetch_error_response(error),
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
