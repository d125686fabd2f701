//! Static registry mapping path prefixes to backend services

use crate::config::ServiceRoute;

/// Immutable prefix-to-backend routing table
///
/// Built once at startup and shared read-only across all request tasks, so
/// no locking is needed on the routing path.
pub struct ServiceRegistry {
    routes: Vec<ServiceRoute>,
}

impl ServiceRegistry {
    /// Create a registry from the configured routing table, preserving order
    pub fn new(routes: Vec<ServiceRoute>) -> Self {
        Self { routes }
    }

    /// Resolve a path to the first route whose prefix is a literal byte
    /// prefix of it.
    ///
    /// Matching is case-sensitive, first-match in construction order, and
    /// deliberately NOT anchored to path segment boundaries: `/user` matches
    /// `/users/me`. Kept for wire compatibility with existing deployments;
    /// anchoring to segment boundaries would be a behavior change.
    pub fn resolve(&self, path: &str) -> Option<&ServiceRoute> {
        self.routes.iter().find(|route| path.starts_with(&route.prefix))
    }

    /// All registered routes, in registration order
    pub fn routes(&self) -> &[ServiceRoute] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
