//! Request metrics middleware
//!
//! Wraps the whole router so that every inbound request, including 404s and
//! upstream failures, produces exactly one counter increment and one duration
//! observation. Also stamps the elapsed time on the response as
//! `x-process-time`.

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    response::Response,
};
use futures::future::BoxFuture;
use std::{
    sync::Arc,
    task::{Context, Poll},
    time::Instant,
};
use tower::{Layer, Service};

use crate::gateway::registry::ServiceRegistry;

pub const REQUEST_COUNTER: &str = "api_gateway_requests_total";
pub const REQUEST_DURATION: &str = "api_gateway_request_duration_seconds";

/// Metrics recording layer
#[derive(Clone)]
pub struct MetricsLayer {
    registry: Arc<ServiceRegistry>,
}

impl MetricsLayer {
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self { registry }
    }
}

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsMiddleware {
            inner,
            registry: self.registry.clone(),
        }
    }
}

/// Metrics recording middleware service
#[derive(Clone)]
pub struct MetricsMiddleware<S> {
    inner: S,
    registry: Arc<ServiceRegistry>,
}

impl<S> Service<Request<Body>> for MetricsMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let start = Instant::now();
        let method = request.method().to_string();
        let endpoint = normalized_endpoint(&self.registry, request.uri().path());

        let future = self.inner.call(request);

        Box::pin(async move {
            let mut response = future.await?;

            let elapsed = start.elapsed().as_secs_f64();
            metrics::counter!(
                REQUEST_COUNTER,
                "method" => method,
                "endpoint" => endpoint,
                "status" => response.status().as_u16().to_string()
            )
            .increment(1);
            metrics::histogram!(REQUEST_DURATION).record(elapsed);

            if let Ok(value) = HeaderValue::from_str(&format!("{elapsed:.6}")) {
                response.headers_mut().insert("x-process-time", value);
            }

            Ok(response)
        })
    }
}

/// Collapse a raw path into a bounded-cardinality endpoint label.
///
/// Proxied paths are labeled by their matched registry prefix; the gateway's
/// own endpoints keep their literal path.
fn normalized_endpoint(registry: &ServiceRegistry, path: &str) -> String {
    match path {
        "/" | "/health" | "/metrics" => path.to_string(),
        _ => registry
            .resolve(path)
            .map(|route| route.prefix.clone())
            .unwrap_or_else(|| path.to_string()),
    }
}
