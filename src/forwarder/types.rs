//! Type definitions for the upstream forwarder

use crate::config::UpstreamSettings;
use http::StatusCode;
use nutype::nutype;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

// ========== Constants ==========

/// Deployment used when none is configured
pub const DEFAULT_DEPLOYMENT_NAME: &str = "gpt-4o-mini";

/// Chat completions API version pinned by the relay
pub const DEFAULT_API_VERSION: &str = "2024-10-21";

/// Token ceiling applied to every guided completion
pub const MAX_COMPLETION_TOKENS: u32 = 200;

// ========== Upstream Configuration Types ==========

/// Base URL of the Azure OpenAI resource, e.g. `https://my-resource.openai.azure.com`
#[nutype(
    sanitize(trim),
    validate(predicate = |s: &str| s.starts_with("http://") || s.starts_with("https://")),
    derive(Clone, Debug, Display, PartialEq, Eq, AsRef),
)]
pub struct EndpointUrl(String);

/// Secret key sent in the `api-key` header
#[nutype(
    sanitize(trim),
    validate(predicate = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_graphic())),
    derive(Clone, PartialEq, Eq, AsRef),
)]
pub struct ApiKey(String);

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Name of the model deployment inside the Azure resource
#[nutype(
    sanitize(trim),
    validate(not_empty),
    default = "gpt-4o-mini",
    derive(Clone, Debug, Display, Default, PartialEq, Eq, AsRef),
)]
pub struct DeploymentName(String);

/// Value of the `api-version` query parameter
#[nutype(
    sanitize(trim),
    validate(not_empty),
    default = "2024-10-21",
    derive(Clone, Debug, Display, Default, PartialEq, Eq, AsRef),
)]
pub struct ApiVersion(String);

/// Non-empty prompt text from the caller
#[nutype(
    validate(not_empty),
    derive(Clone, Debug, Display, PartialEq, Eq, AsRef, Serialize),
)]
pub struct Prompt(String);

/// Upstream deployment configuration, built once at startup and never mutated.
///
/// Endpoint and key are optional so the process can start (and answer
/// `/health`) without them; requests that need them fail with
/// [`ConfigurationError`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpstreamConfig {
    pub endpoint: Option<EndpointUrl>,
    pub api_key: Option<ApiKey>,
    pub deployment_name: DeploymentName,
    pub api_version: ApiVersion,
}

impl UpstreamConfig {
    /// Build from loaded settings. Empty or malformed values are treated as absent.
    pub fn from_settings(settings: &UpstreamSettings) -> Self {
        let endpoint = non_empty(settings.endpoint.as_deref()).and_then(|raw| {
            EndpointUrl::try_new(raw.to_string())
                .map_err(|_| warn!(endpoint = raw, "Ignoring endpoint that is not an http(s) URL"))
                .ok()
        });

        let api_key = non_empty(settings.api_key.as_deref()).and_then(|raw| {
            ApiKey::try_new(raw.to_string())
                .map_err(|_| warn!("Ignoring API key containing non-printable characters"))
                .ok()
        });

        let deployment_name =
            DeploymentName::try_new(settings.deployment_name.clone()).unwrap_or_default();
        let api_version = ApiVersion::try_new(settings.api_version.clone()).unwrap_or_default();

        Self {
            endpoint,
            api_key,
            deployment_name,
            api_version,
        }
    }

    /// Whether both endpoint and key are present
    pub fn is_complete(&self) -> bool {
        self.endpoint.is_some() && self.api_key.is_some()
    }

    /// Resolve the chat completions URL and key, or report what is missing
    pub fn target(&self) -> Result<UpstreamTarget<'_>, ConfigurationError> {
        let endpoint = self
            .endpoint
            .as_ref()
            .ok_or(ConfigurationError::MissingEndpoint)?;
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(ConfigurationError::MissingApiKey)?;

        let url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            endpoint.as_ref().trim_end_matches('/'),
            self.deployment_name,
            self.api_version,
        );

        Ok(UpstreamTarget { url, api_key })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Resolved destination of a single outbound call
#[derive(Debug)]
pub struct UpstreamTarget<'a> {
    pub url: String,
    pub api_key: &'a ApiKey,
}

// ========== Responses ==========

/// Successful result of the guided endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

// ========== Errors ==========

/// Caller input failed a precondition
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Prompt is required")]
    MissingPrompt,

    /// Parser diagnostic is kept for logs only
    #[error("Invalid JSON body")]
    MalformedBody(String),
}

/// Required deployment configuration is absent
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Azure OpenAI endpoint is not configured")]
    MissingEndpoint,

    #[error("Azure OpenAI API key is not configured")]
    MissingApiKey,
}

/// The upstream call failed or answered with a non-success status
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Azure OpenAI API error: {status}")]
    Status { status: StatusCode, details: String },

    #[error("Upstream request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Connection error: {0}")]
    Network(String),
}

/// Every way a forwarding operation can fail
#[derive(Error, Debug)]
pub enum ForwardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("Unexpected upstream payload: {0}")]
    UpstreamProtocol(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for forwarder operations
pub type ForwardResult<T> = Result<T, ForwardError>;
