//! HTTP header constants and utilities for the relay
//!
//! This module centralizes header names, well-known paths and fixed
//! response texts used by the router, middleware and transport.

use ::http::header;

/// Header name for request ID used for tracing and correlation
pub const X_REQUEST_ID: &str = "x-request-id";

/// Header carrying the upstream secret; never logged
pub const API_KEY_HEADER: &str = "api-key";

/// Standard header re-exports for convenience
pub use header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE,
};

/// Well-known paths
pub mod paths {
    pub const ROOT: &str = "/";

    /// Health check endpoint path
    pub const HEALTH: &str = "/health";

    /// Guided chat endpoint
    pub const ASK_MILO: &str = "/api/ask-milo";

    /// Pass-through endpoint
    pub const OPENAI_RAW: &str = "/api/openai-raw";
}

pub mod content_types {
    pub const APPLICATION_JSON: &str = "application/json";
    pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
}

/// Values for the cross-origin headers added to every response
pub mod cors {
    pub const ALLOW_ORIGIN: &str = "*";
    pub const ALLOW_HEADERS: &str = "Content-Type";
    pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
}

/// Fixed texts returned to callers
pub mod messages {
    pub const WELCOME: &str = "Welcome to the Milo AI Buddy API";
    pub const HEALTHY: &str = "Server is running";
    pub const CONFIGURATION_MISSING: &str =
        "Azure OpenAI configuration is missing. Please check environment variables.";
    pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again later.";
    pub const NOT_FOUND: &str = "Not found";
}
