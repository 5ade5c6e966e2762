//! Upstream forwarder for chat completion requests
//!
//! Each operation is one linear pass: validate, build, send, interpret.
//! - Guided: wraps a caller prompt with the persona message and returns only
//!   the first candidate's text
//! - Raw: forwards an opaque JSON body and returns the upstream payload as-is
//!
//! The forwarder holds no mutable state. The configuration is passed in by
//! reference so many invocations can run concurrently against the same
//! [`UpstreamConfig`].

pub mod persona;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;


pub use transport::{HttpTransport, UpstreamReply, UpstreamTransport};
pub use types::*;

use crate::forwarder::persona::{extract_reply, CompletionRequest};
use bytes::Bytes;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Default bound on a single upstream call
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Forwards caller requests to the configured completion endpoint
#[derive(Clone)]
pub struct Forwarder {
    transport: Arc<dyn UpstreamTransport>,
    timeout: Duration,
}

impl Forwarder {
    pub fn new(transport: Arc<dyn UpstreamTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Send a prompt wrapped in the persona message and return the first reply.
    ///
    /// An empty or absent prompt fails before the configuration is consulted
    /// and before any network call.
    #[instrument(skip_all, fields(deployment = %config.deployment_name))]
    pub async fn forward_guided_chat(
        &self,
        prompt: Option<&str>,
        config: &UpstreamConfig,
    ) -> ForwardResult<ChatReply> {
        let prompt = Prompt::try_new(prompt.unwrap_or_default().to_string())
            .map_err(|_| ValidationError::MissingPrompt)?;
        let target = config.target()?;

        let body = serde_json::to_vec(&CompletionRequest::guided(&prompt))?;
        let reply = self.send(&target, Bytes::from(body)).await?;

        let reply = extract_reply(&reply.body)?;
        Ok(ChatReply { reply })
    }

    /// Forward an arbitrary chat completions body and return the upstream JSON untouched
    #[instrument(skip_all, fields(deployment = %config.deployment_name))]
    pub async fn forward_raw(&self, body: &Value, config: &UpstreamConfig) -> ForwardResult<Value> {
        let target = config.target()?;

        let body = serde_json::to_vec(body)?;
        let reply = self.send(&target, Bytes::from(body)).await?;

        serde_json::from_slice(&reply.body)
            .map_err(|e| ForwardError::UpstreamProtocol(format!("response is not JSON: {e}")))
    }

    async fn send(&self, target: &UpstreamTarget<'_>, body: Bytes) -> ForwardResult<UpstreamReply> {
        let started = Instant::now();

        let call = self.transport.post_json(&target.url, target.api_key, body);
        let reply = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| UpstreamError::Timeout(self.timeout))??;

        let duration_ms = started.elapsed().as_millis();
        if !reply.status.is_success() {
            warn!(
                status = reply.status.as_u16(),
                duration_ms, "Upstream returned non-success status"
            );
            return Err(UpstreamError::Status {
                status: reply.status,
                details: String::from_utf8_lossy(&reply.body).into_owned(),
            }
            .into());
        }

        debug!(status = reply.status.as_u16(), duration_ms, "Upstream call completed");
        Ok(reply)
    }
}

impl std::fmt::Debug for Forwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forwarder")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
