//! Transparent request forwarding to backend services

use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, error};

use crate::error::{GatewayError, Result};
use crate::gateway::router::RouteTarget;

/// Backend response headers dropped before relaying to the caller.
///
/// The gateway recomputes framing for its own outbound write; relaying the
/// backend's length/encoding headers alongside a rewritten body would corrupt
/// the response.
const STRIPPED_RESPONSE_HEADERS: [&str; 4] = [
    "content-encoding",
    "content-length",
    "transfer-encoding",
    "connection",
];

/// A backend response relayed to the caller
#[derive(Debug)]
pub struct ProxiedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl IntoResponse for ProxiedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Executes outbound calls against resolved backends
///
/// One attempt per inbound request: no retries, no circuit breaking. The
/// client-level timeout is the complete deadline for the call.
pub struct Forwarder {
    client: Client,
}

impl Forwarder {
    /// Create a forwarder whose outbound calls are bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::UpstreamError(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Forward a request to the resolved backend and relay its response.
    ///
    /// Method, headers and body are replayed as received; the query string is
    /// appended verbatim. Failures translate to distinct outcomes: deadline
    /// exceeded maps to `UpstreamTimeout` (504), connection or DNS failure to
    /// `UpstreamUnreachable` (502), anything else to `UpstreamError` (500).
    pub async fn forward(
        &self,
        target: &RouteTarget,
        method: &Method,
        headers: &HeaderMap,
        query: Option<&str>,
        body: Bytes,
    ) -> Result<ProxiedResponse> {
        let url = build_url(target, query);

        debug!(method = %method, url = %url, "Forwarding request");

        let outbound_method = reqwest::Method::from_bytes(method.as_str().as_bytes())
            .map_err(|e| GatewayError::InvalidRequest(format!("invalid method: {e}")))?;

        let response = self
            .client
            .request(outbound_method, &url)
            .headers(to_outbound_headers(headers))
            .body(body)
            .send()
            .await
            .map_err(|e| classify_upstream_error(e, method, &url))?;

        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let headers = filter_response_headers(response.headers());

        // The deadline covers the whole call; a timeout while reading the
        // body must stay a 504, not collapse into a generic 500.
        let body = response
            .bytes()
            .await
            .map_err(|e| classify_upstream_error(e, method, &url))?;

        Ok(ProxiedResponse {
            status,
            headers,
            body,
        })
    }
}

/// Concatenate the backend base URL, remaining path and verbatim query string
fn build_url(target: &RouteTarget, query: Option<&str>) -> String {
    let mut url = format!("{}{}", target.base_url, target.path);
    if let Some(query) = query {
        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }
    }
    url
}

/// Map an outbound call failure onto the gateway's upstream error taxonomy.
///
/// Applied to both the send and the response-body read: the per-call deadline
/// spans the entire exchange.
fn classify_upstream_error(err: reqwest::Error, method: &Method, url: &str) -> GatewayError {
    if err.is_timeout() {
        error!(method = %method, url = %url, "Timeout calling backend");
        GatewayError::UpstreamTimeout(url.to_string())
    } else if err.is_connect() {
        error!(method = %method, url = %url, error = %err, "Connection error to backend");
        GatewayError::UpstreamUnreachable(url.to_string())
    } else {
        error!(method = %method, url = %url, error = %err, "Error proxying request");
        GatewayError::UpstreamError(err.to_string())
    }
}

/// Replay the inbound header set on the outbound call, as-is.
///
/// The server and client stacks sit on different `http` major versions, so
/// names and values are rebuilt from their byte representations.
fn to_outbound_headers(headers: &HeaderMap) -> reqwest::header::HeaderMap {
    let mut outbound = reqwest::header::HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = match reqwest::header::HeaderName::from_bytes(name.as_str().as_bytes()) {
            Ok(name) => name,
            Err(_) => continue,
        };
        let value = match reqwest::header::HeaderValue::from_bytes(value.as_bytes()) {
            Ok(value) => value,
            Err(_) => continue,
        };
        outbound.append(name, value);
    }
    outbound
}

/// Copy backend response headers, dropping the fixed framing exclusion set
fn filter_response_headers(headers: &reqwest::header::HeaderMap) -> HeaderMap {
    let mut filtered = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if STRIPPED_RESPONSE_HEADERS.contains(&name.as_str()) {
            continue;
        }
        let name = match HeaderName::from_bytes(name.as_str().as_bytes()) {
            Ok(name) => name,
            Err(_) => continue,
        };
        let value = match HeaderValue::from_bytes(value.as_bytes()) {
            Ok(value) => value,
            Err(_) => continue,
        };
        filtered.append(name, value);
    }
    filtered
}
