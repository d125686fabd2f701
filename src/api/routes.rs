//! Route definitions and request handlers

use std::sync::Arc;

use axum::{
    body::to_bytes,
    extract::{Request, State},
    http::header,
    response::IntoResponse,
    routing::{get, on, MethodFilter},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::{GatewayError, Result};
use crate::gateway::{forwarder::ProxiedResponse, health::HealthReport, router};
use crate::middleware::metrics::MetricsLayer;
use crate::AppState;

/// Methods accepted on the proxy route
fn proxy_methods() -> MethodFilter {
    MethodFilter::GET
        .or(MethodFilter::POST)
        .or(MethodFilter::PUT)
        .or(MethodFilter::DELETE)
        .or(MethodFilter::PATCH)
}

/// Static identification payload served at the root
#[derive(Serialize)]
struct GatewayInfo {
    message: &'static str,
    version: &'static str,
}

/// Build the gateway router.
///
/// The metrics layer wraps every route so the counter and duration fire for
/// all outcomes, 404 and upstream failures included.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/*path", on(proxy_methods(), proxy))
        .layer(CorsLayer::permissive())
        .layer(MetricsLayer::new(state.registry.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<GatewayInfo> {
    Json(GatewayInfo {
        message: "API Gateway",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Fan out health probes to every registered service and aggregate.
///
/// Always answers 200: a degraded fleet is reported, not raised.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    Json(state.health.check_all().await)
}

/// Prometheus text exposition of the accumulated counters and histograms
async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Proxy an inbound request to the backend owning its path prefix.
///
/// Routing happens before the body is read, so an unmatched path costs no
/// outbound work at all.
async fn proxy(State(state): State<Arc<AppState>>, request: Request) -> Result<ProxiedResponse> {
    let (parts, body) = request.into_parts();

    let path = parts.uri.path().to_string();
    let query = parts.uri.query().map(str::to_owned);
    let target = router::route(&state.registry, &path)?;

    let body = to_bytes(body, usize::MAX)
        .await
        .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;

    state
        .forwarder
        .forward(&target, &parts.method, &parts.headers, query.as_deref(), body)
        .await
}
