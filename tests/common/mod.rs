//! Shared helpers for integration tests

#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use api_gateway::{
    api::routes::create_router,
    config::ServiceRoute,
    gateway::{forwarder::Forwarder, health::HealthAggregator, registry::ServiceRegistry},
    AppState,
};
use axum::Router;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Build application state over the given routing table.
///
/// Uses a local (non-global) metrics recorder so tests stay independent.
pub fn test_state(
    services: &[(&str, &str)],
    forward_timeout: Duration,
    health_timeout: Duration,
) -> Arc<AppState> {
    let handle = PrometheusBuilder::new().build_recorder().handle();
    test_state_with_handle(services, forward_timeout, health_timeout, handle)
}

pub fn test_state_with_handle(
    services: &[(&str, &str)],
    forward_timeout: Duration,
    health_timeout: Duration,
    metrics: PrometheusHandle,
) -> Arc<AppState> {
    let routes = services
        .iter()
        .map(|(prefix, url)| ServiceRoute {
            prefix: prefix.to_string(),
            url: url.to_string(),
        })
        .collect();
    let registry = Arc::new(ServiceRegistry::new(routes));

    Arc::new(AppState {
        registry: registry.clone(),
        forwarder: Arc::new(Forwarder::new(forward_timeout).unwrap()),
        health: Arc::new(HealthAggregator::new(registry, health_timeout).unwrap()),
        metrics,
    })
}

/// Build a ready-to-call gateway app with default test timeouts
pub fn test_app(services: &[(&str, &str)]) -> Router {
    create_router(test_state(
        services,
        Duration::from_secs(5),
        Duration::from_secs(5),
    ))
}
