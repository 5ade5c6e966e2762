//! Middleware stack builder for clean composition

use crate::proxy::middleware::*;
use axum::{middleware::from_fn, Router};

/// Builder for composing the relay middleware stack
#[derive(Debug, Clone, Copy, Default)]
pub struct ProxyMiddlewareStack;

impl ProxyMiddlewareStack {
    pub fn new() -> Self {
        Self
    }

    /// Apply the complete middleware stack to a router
    ///
    /// The middleware are applied in the following order (outer to inner):
    /// 1. Request ID generation/propagation
    /// 2. Logging (with request ID)
    /// 3. CORS headers and preflight short-circuit
    ///
    /// Preflight answers therefore still carry a request ID and are logged.
    pub fn apply_to_router<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router
            // Apply middleware in reverse order (innermost first in the builder)
            .layer(from_fn(cors_middleware))
            .layer(from_fn(logging_middleware))
            .layer(from_fn(request_id_middleware))
    }
}
