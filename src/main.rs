//! Main entry point for the API gateway

use api_gateway::{
    api,
    config::Settings,
    gateway::{forwarder::Forwarder, health::HealthAggregator, registry::ServiceRegistry},
    AppState,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::{sync::Arc, time::Duration};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json())
        .init();

    info!("Starting API Gateway");

    // Load configuration
    let settings = Settings::load()?;
    settings.validate()?;
    info!(
        host = %settings.server.host,
        port = settings.server.port,
        "Loaded configuration"
    );

    // Install the Prometheus recorder backing /metrics
    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("failed to install metrics recorder: {e}"))?;

    // Build the immutable routing table
    let registry = Arc::new(ServiceRegistry::new(settings.services.clone()));
    for route in registry.routes() {
        info!(prefix = %route.prefix, backend = %route.url, "Registered service route");
    }
    info!(services = registry.len(), "Service registry initialized");

    let forwarder = Arc::new(Forwarder::new(Duration::from_secs(
        settings.proxy.forward_timeout_secs,
    ))?);
    let health = Arc::new(HealthAggregator::new(
        registry.clone(),
        Duration::from_secs(settings.proxy.health_timeout_secs),
    )?);

    let app_state = Arc::new(AppState {
        registry,
        forwarder,
        health,
        metrics: metrics_handle,
    });

    let app = api::routes::create_router(app_state);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
