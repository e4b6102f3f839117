// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::application::chart_service::ChartService;
use crate::infrastructure::config::load_service_config;
use crate::infrastructure::sales_api_client::HttpSalesRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{get_options, get_series, health_check};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let service_config = load_service_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(HttpSalesRepository::new(&service_config.data_service)?);

    // Create services (application layer)
    let chart_service = ChartService::new(repository);

    // Create application state
    let state = Arc::new(AppState { chart_service });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/api/series", get(get_series))
        .route("/api/options", get(get_options))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = "0.0.0.0:8080".parse()?;
    tracing::info!("starting sales-metrics service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
