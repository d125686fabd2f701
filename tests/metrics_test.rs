//! Integration tests for unconditional request metrics
//!
//! Kept in their own test binary: the Prometheus recorder installs globally,
//! once per process.

mod common;

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use metrics_exporter_prometheus::PrometheusBuilder;
use tower::ServiceExt;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use api_gateway::api::routes::create_router;

/// Find the rendered sample line carrying all given label fragments
fn sample_value(rendered: &str, metric: &str, labels: &[&str]) -> Option<f64> {
    rendered
        .lines()
        .find(|line| {
            line.starts_with(metric) && labels.iter().all(|label| line.contains(label))
        })
        .and_then(|line| line.rsplit(' ').next())
        .and_then(|value| value.parse().ok())
}

#[tokio::test]
async fn test_every_request_counted_once_including_failures() {
    let handle = PrometheusBuilder::new().install_recorder().unwrap();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/42"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let state = common::test_state_with_handle(
        &[("/orders", &server.uri())],
        Duration::from_secs(5),
        Duration::from_secs(5),
        handle.clone(),
    );
    let app = create_router(state);

    // One proxied success and one unmatched 404
    let ok = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/orders/42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    assert!(
        ok.headers().get("x-process-time").is_some(),
        "response missing the process-time stamp"
    );

    let missing = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/widgets")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert!(missing.headers().get("x-process-time").is_some());

    let rendered = handle.render();

    // Proxied requests are labeled by their matched prefix
    let proxied = sample_value(
        &rendered,
        "api_gateway_requests_total",
        &[r#"method="GET""#, r#"endpoint="/orders""#, r#"status="200""#],
    );
    assert_eq!(proxied, Some(1.0));

    // The 404 path is counted too
    let unmatched = sample_value(
        &rendered,
        "api_gateway_requests_total",
        &[r#"method="GET""#, r#"endpoint="/widgets""#, r#"status="404""#],
    );
    assert_eq!(unmatched, Some(1.0));

    // Exactly one duration observation per request
    let observations = sample_value(&rendered, "api_gateway_request_duration_seconds_count", &[]);
    assert_eq!(observations, Some(2.0));
}

#[tokio::test]
async fn test_metrics_endpoint_serves_exposition() {
    // The recorder may already be installed by the sibling test; either way a
    // handle to some recorder is fine for asserting the endpoint shape.
    let handle = PrometheusBuilder::new().build_recorder().handle();

    let state = common::test_state_with_handle(
        &[],
        Duration::from_secs(5),
        Duration::from_secs(5),
        handle,
    );
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.starts_with("text/plain"));
}
