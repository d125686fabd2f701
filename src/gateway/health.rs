//! Concurrent health aggregation across all registered services

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ServiceRoute;
use crate::error::{GatewayError, Result};
use crate::gateway::registry::ServiceRegistry;

/// Health of a single backend probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Healthy,
    Unhealthy,
}

/// Aggregate status over all probes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Healthy,
    Degraded,
}

/// Per-service entry in the aggregated report
#[derive(Debug, Clone, Serialize)]
pub struct ServiceHealth {
    pub status: ProbeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregated health report, built fresh on every invocation
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: OverallStatus,
    pub services: BTreeMap<String, ServiceHealth>,
}

/// Scatter-gather health prober over the service registry
///
/// All probes run concurrently with independent timeouts, so the wall-clock
/// cost of a report approaches the slowest single probe rather than the sum.
/// A failed probe is recorded in its entry, never raised: the aggregator
/// itself does not fail even when every backend is unreachable.
pub struct HealthAggregator {
    client: Client,
    registry: Arc<ServiceRegistry>,
}

impl HealthAggregator {
    /// Create an aggregator whose probes are each bounded by `timeout`
    pub fn new(registry: Arc<ServiceRegistry>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::UpstreamError(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client, registry })
    }

    /// Probe every registered service concurrently and aggregate the results.
    ///
    /// The report is `Healthy` only when every probe came back 200; any
    /// non-200 or failed probe degrades it.
    pub async fn check_all(&self) -> HealthReport {
        let probes = self.registry.routes().iter().map(|route| self.probe(route));
        let results = future::join_all(probes).await;

        let mut services = BTreeMap::new();
        let mut overall = OverallStatus::Healthy;

        for (name, health) in results {
            if health.status != ProbeStatus::Healthy {
                overall = OverallStatus::Degraded;
            }
            services.insert(name, health);
        }

        HealthReport {
            status: overall,
            services,
        }
    }

    /// Probe a single backend's health endpoint
    async fn probe(&self, route: &ServiceRoute) -> (String, ServiceHealth) {
        let name = route.prefix.trim_start_matches('/').to_string();
        let url = format!("{}/health", route.url);
        let start = Instant::now();

        match self.client.get(&url).send().await {
            Ok(response) => {
                let elapsed = start.elapsed().as_secs_f64();
                let status = if response.status().as_u16() == 200 {
                    ProbeStatus::Healthy
                } else {
                    ProbeStatus::Unhealthy
                };
                debug!(service = %name, url = %url, status = ?status, response_time = elapsed, "Health probe completed");
                (
                    name,
                    ServiceHealth {
                        status,
                        response_time: Some(elapsed),
                        error: None,
                    },
                )
            }
            Err(e) => {
                warn!(service = %name, url = %url, error = %e, "Health probe failed");
                (
                    name,
                    ServiceHealth {
                        status: ProbeStatus::Unhealthy,
                        response_time: None,
                        error: Some(e.to_string()),
                    },
                )
            }
        }
    }
}
