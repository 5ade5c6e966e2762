//! Unified error response handling for the relay routes
//!
//! Callers only ever see `{ "error": ... }` or `{ "error": ..., "details": ... }`.
//! The status and wording depend on which route failed: the guided route
//! summarises upstream failures, the raw route echoes the upstream status and
//! its diagnostic text.

use crate::forwarder::{ForwardError, UpstreamError};
use crate::proxy::headers::messages;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Standard error response format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Upstream diagnostic text (raw route only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// Which caller-facing route produced the error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Guided,
    Raw,
}

/// Extension trait for consistent error formatting
pub trait ErrorResponseExt {
    /// Convert to the caller-visible body
    fn to_error_response(&self, route: Route) -> ErrorResponse;

    /// Get the appropriate HTTP status code
    fn status_code(&self, route: Route) -> StatusCode;

    fn into_route_response(self, route: Route) -> Response
    where
        Self: Sized,
    {
        let status = self.status_code(route);
        self.to_error_response(route).into_response_with_status(status)
    }
}

impl ErrorResponseExt for ForwardError {
    fn to_error_response(&self, route: Route) -> ErrorResponse {
        use ForwardError::*;

        match (self, route) {
            (Validation(e), _) => ErrorResponse::new(e.to_string()),
            (Configuration(_), _) => ErrorResponse::new(messages::CONFIGURATION_MISSING),
            (Upstream(e @ UpstreamError::Status { details, .. }), Route::Raw) => {
                ErrorResponse::new(e.to_string()).with_details(details.clone())
            }
            (Upstream(_) | UpstreamProtocol(_) | Serialization(_), _) => {
                ErrorResponse::new(messages::GENERIC_FAILURE)
            }
        }
    }

    fn status_code(&self, route: Route) -> StatusCode {
        use ForwardError::*;

        match (self, route) {
            (Validation(_), _) => StatusCode::BAD_REQUEST,
            (Upstream(UpstreamError::Status { status, .. }), Route::Raw) => *status,
            (Configuration(_) | Upstream(_) | UpstreamProtocol(_) | Serialization(_), _) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// JSON 404 for paths the relay does not serve
pub fn not_found_response() -> Response {
    ErrorResponse::new(messages::NOT_FOUND).into_response_with_status(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forwarder::{ConfigurationError, ValidationError};
    use std::time::Duration;

    fn upstream_status(status: StatusCode, details: &str) -> ForwardError {
        ForwardError::Upstream(UpstreamError::Status {
            status,
            details: details.to_string(),
        })
    }

    #[test]
    fn test_error_response_serialization_omits_missing_details() {
        let body = serde_json::to_value(ErrorResponse::new("Prompt is required")).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Prompt is required" }));
    }

    #[test]
    fn test_missing_prompt_is_bad_request_on_both_routes() {
        let error = ForwardError::from(ValidationError::MissingPrompt);

        for route in [Route::Guided, Route::Raw] {
            assert_eq!(error.status_code(route), StatusCode::BAD_REQUEST);
            assert_eq!(
                error.to_error_response(route),
                ErrorResponse::new("Prompt is required")
            );
        }
    }

    #[test]
    fn test_malformed_body_message_omits_parser_text() {
        let error = ForwardError::from(ValidationError::MalformedBody(
            "key must be a string at line 1 column 2".to_string(),
        ));

        for route in [Route::Guided, Route::Raw] {
            assert_eq!(error.status_code(route), StatusCode::BAD_REQUEST);
            assert_eq!(
                error.to_error_response(route),
                ErrorResponse::new("Invalid JSON body")
            );
        }
    }

    #[test]
    fn test_configuration_error_wording() {
        let error = ForwardError::from(ConfigurationError::MissingApiKey);

        assert_eq!(
            error.status_code(Route::Guided),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            error.to_error_response(Route::Guided).error,
            messages::CONFIGURATION_MISSING
        );
    }

    #[test]
    fn test_guided_route_summarises_upstream_status() {
        let error = upstream_status(StatusCode::TOO_MANY_REQUESTS, "rate limited");

        assert_eq!(
            error.status_code(Route::Guided),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            error.to_error_response(Route::Guided),
            ErrorResponse::new(messages::GENERIC_FAILURE)
        );
    }

    #[test]
    fn test_raw_route_echoes_upstream_status() {
        let error = upstream_status(StatusCode::TOO_MANY_REQUESTS, "rate limited");

        assert_eq!(error.status_code(Route::Raw), StatusCode::TOO_MANY_REQUESTS);

        let body = error.to_error_response(Route::Raw);
        assert!(body.error.contains("429"));
        assert_eq!(body.details.as_deref(), Some("rate limited"));
    }

    #[test]
    fn test_transport_failures_are_generic_on_raw_route() {
        let errors = [
            ForwardError::Upstream(UpstreamError::Timeout(Duration::from_secs(30))),
            ForwardError::Upstream(UpstreamError::Network("refused".to_string())),
            ForwardError::UpstreamProtocol("not json".to_string()),
        ];

        for error in errors {
            assert_eq!(
                error.status_code(Route::Raw),
                StatusCode::INTERNAL_SERVER_ERROR
            );
            let body = error.to_error_response(Route::Raw);
            assert_eq!(body.error, messages::GENERIC_FAILURE);
            assert!(body.details.is_none());
        }
    }
}
