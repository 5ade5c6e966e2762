//! Main relay service implementation
//!
//! The `RelayService` wires the forwarder into an Axum router and is the only
//! place where HTTP requests become forwarder calls.
//!
//! ## Service Lifecycle
//!
//! ```rust,ignore
//! use milo_relay::forwarder::{Forwarder, HttpTransport, UpstreamConfig};
//! use milo_relay::proxy::RelayService;
//!
//! // 1. Build the immutable upstream configuration once
//! let upstream = UpstreamConfig::from_settings(&settings.upstream);
//! let forwarder = Forwarder::new(Arc::new(HttpTransport::new()?), settings.upstream.timeout());
//!
//! // 2. Convert to Axum router
//! let router = RelayService::new(upstream, forwarder).into_router();
//!
//! // 3. Serve with Axum
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//! axum::serve(listener, router).await?;
//! ```

use crate::forwarder::{ForwardError, Forwarder, UpstreamConfig, ValidationError};
use crate::proxy::error_response::{not_found_response, ErrorResponseExt, Route};
use crate::proxy::headers::{content_types, messages, paths, CONTENT_TYPE};
use crate::proxy::middleware_stack::ProxyMiddlewareStack;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, warn};

/// Shared, read-only state handed to every handler
#[derive(Debug)]
pub struct RelayState {
    pub upstream: Arc<UpstreamConfig>,
    pub forwarder: Forwarder,
}

/// Relay service combining configuration, forwarder and router
#[derive(Debug, Clone)]
pub struct RelayService {
    state: Arc<RelayState>,
}

impl RelayService {
    pub fn new(upstream: UpstreamConfig, forwarder: Forwarder) -> Self {
        Self {
            state: Arc::new(RelayState {
                upstream: Arc::new(upstream),
                forwarder,
            }),
        }
    }

    pub fn upstream(&self) -> &UpstreamConfig {
        &self.state.upstream
    }

    /// Create an Axum router for the relay with middleware
    pub fn into_router(self) -> Router {
        let router = Router::new()
            .route(paths::ROOT, get(root_handler))
            .route(paths::HEALTH, get(health_handler))
            .route(paths::ASK_MILO, post(ask_milo_handler))
            .route(paths::OPENAI_RAW, post(openai_raw_handler))
            .fallback(fallback_handler)
            .with_state(self.state);

        ProxyMiddlewareStack::new().apply_to_router(router)
    }
}

/// Body of the guided endpoint
///
/// `prompt` is kept as loose JSON so that `null`, `false`, `0` and `""` all
/// count as a missing prompt rather than a malformed body.
#[derive(Debug, Default, Deserialize)]
pub struct InboundChatRequest {
    #[serde(default)]
    pub prompt: Option<Value>,
}

impl InboundChatRequest {
    /// Prompt text to forward, or `None` when the value is empty or falsy
    pub fn prompt_text(&self) -> Option<String> {
        match self.prompt.as_ref()? {
            Value::Null | Value::Bool(false) => None,
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Parse the guided request body; an empty body counts as no prompt
fn parse_chat_request(body: &[u8]) -> Result<InboundChatRequest, ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(InboundChatRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| ValidationError::MalformedBody(e.to_string()))
}

/// Parse the raw request body as opaque JSON; an empty body becomes `{}`
fn parse_raw_request(body: &[u8]) -> Result<Value, ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(json!({}));
    }
    serde_json::from_slice(body).map_err(|e| ValidationError::MalformedBody(e.to_string()))
}

fn log_failure(route: Route, error: &ForwardError) {
    match error {
        ForwardError::Validation(ValidationError::MalformedBody(detail)) => {
            warn!(?route, detail = %detail, "Rejected request with unparseable body")
        }
        ForwardError::Validation(e) => warn!(?route, error = %e, "Rejected request"),
        ForwardError::Configuration(e) => {
            error!(?route, error = %e, "Upstream configuration is incomplete")
        }
        other => error!(?route, error = %other, "Upstream call failed"),
    }
}

async fn root_handler() -> impl IntoResponse {
    ([(CONTENT_TYPE, content_types::TEXT_PLAIN)], messages::WELCOME)
}

/// Health check handler; independent of upstream configuration
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": messages::HEALTHY }))
}

/// Guided chat: wrap the caller's prompt with the persona and return the reply
async fn ask_milo_handler(State(state): State<Arc<RelayState>>, body: Bytes) -> Response {
    let result = match parse_chat_request(&body) {
        Ok(request) => {
            let prompt = request.prompt_text();
            state
                .forwarder
                .forward_guided_chat(prompt.as_deref(), &state.upstream)
                .await
        }
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(reply) => Json(reply).into_response(),
        Err(error) => {
            log_failure(Route::Guided, &error);
            error.into_route_response(Route::Guided)
        }
    }
}

/// Raw pass-through: forward the caller's body and relay the upstream JSON
async fn openai_raw_handler(State(state): State<Arc<RelayState>>, body: Bytes) -> Response {
    let result = match parse_raw_request(&body) {
        Ok(payload) => state.forwarder.forward_raw(&payload, &state.upstream).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(payload) => Json(payload).into_response(),
        Err(error) => {
            log_failure(Route::Raw, &error);
            error.into_route_response(Route::Raw)
        }
    }
}

async fn fallback_handler() -> Response {
    not_found_response()
}
