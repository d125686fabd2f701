//! Path router resolving inbound paths to backend targets

use tracing::debug;

use crate::error::{GatewayError, Result};
use crate::gateway::registry::ServiceRegistry;

/// A resolved forwarding target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTarget {
    /// Base URL of the backend service
    pub base_url: String,
    /// Remaining path after the matched prefix, always starting with `/`
    pub path: String,
}

/// Resolve an inbound path to a backend and the path remainder to forward.
///
/// The matched prefix is stripped from the front; the remainder is forced to
/// start with `/` so the forwarded path is always absolute. No match yields
/// `RouteNotFound`, which the HTTP layer maps to 404.
pub fn route(registry: &ServiceRegistry, path: &str) -> Result<RouteTarget> {
    let entry = registry.resolve(path).ok_or(GatewayError::RouteNotFound)?;

    let mut remainder = path[entry.prefix.len()..].to_string();
    if !remainder.starts_with('/') {
        remainder.insert(0, '/');
    }

    debug!(prefix = %entry.prefix, backend = %entry.url, path = %remainder, "Resolved route");

    Ok(RouteTarget {
        base_url: entry.url.clone(),
        path: remainder,
    })
}
