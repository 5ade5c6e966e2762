//! Outbound HTTP transport for the forwarder
//!
//! The forwarder talks to the upstream only through [`UpstreamTransport`], so
//! tests can swap in a scripted transport and count calls.

use crate::forwarder::types::{ApiKey, UpstreamError};
use crate::proxy::headers::{content_types, API_KEY_HEADER, CONTENT_TYPE};
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderValue, StatusCode};

/// Raw answer from the upstream
#[derive(Clone, Debug)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Sends one JSON POST to the upstream completion endpoint
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        api_key: &ApiKey,
        body: Bytes,
    ) -> Result<UpstreamReply, UpstreamError>;
}

/// Production transport backed by a shared `reqwest` client
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl UpstreamTransport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        api_key: &ApiKey,
        body: Bytes,
    ) -> Result<UpstreamReply, UpstreamError> {
        let mut key_header = HeaderValue::from_str(api_key.as_ref())
            .map_err(|_| UpstreamError::Network("API key is not a valid header value".to_string()))?;
        key_header.set_sensitive(true);

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_types::APPLICATION_JSON)
            .header(API_KEY_HEADER, key_header)
            .body(body)
            .send()
            .await
            .map_err(|e| UpstreamError::Network(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Network(e.without_url().to_string()))?;

        Ok(UpstreamReply { status, body })
    }
}
