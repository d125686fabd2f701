//! Microservices API Gateway
//!
//! A Rust-based gateway that fronts a fleet of REST microservices: it routes
//! inbound requests to the owning backend by path prefix, forwards them
//! transparently, and aggregates the health of every registered service.

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod middleware;

pub use error::{GatewayError, Result};

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use gateway::{forwarder::Forwarder, health::HealthAggregator, registry::ServiceRegistry};

/// Application state shared across all handlers
pub struct AppState {
    pub registry: Arc<ServiceRegistry>,
    pub forwarder: Arc<Forwarder>,
    pub health: Arc<HealthAggregator>,
    pub metrics: PrometheusHandle,
}
