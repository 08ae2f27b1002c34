// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::application::dashboard_service::DashboardService;
use crate::application::report_service::ReportService;
use crate::application::variable_repository::VariableRepository;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::http_repository::HttpVariableRepository;
use crate::infrastructure::query_cache::CachedVariableRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    download_report, health_check, list_variables, summary, symbol_charts, variables_by_module,
    variables_by_range,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = load_app_config()?;

    // Create repositories (infrastructure layer)
    let upstream = Arc::new(HttpVariableRepository::new(&config.upstream)?);
    let repository: Arc<dyn VariableRepository> = Arc::new(CachedVariableRepository::new(
        upstream,
        Duration::from_secs(config.cache.range_ttl_hours * 3600),
    ));

    // Create services (application layer)
    let dashboard_service = DashboardService::new(repository.clone());
    let report_service = ReportService::new(repository);

    // Create application state
    let state = Arc::new(AppState {
        dashboard_service,
        report_service,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/variables", get(list_variables))
        .route("/variables/module/:module", get(variables_by_module))
        .route("/variables/range", get(variables_by_range))
        .route("/charts", get(symbol_charts))
        .route("/summary", get(summary))
        .route("/reports/:kind", get(download_report))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("starting plc-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
