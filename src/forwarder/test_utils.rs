//! Scripted transport and fixtures shared by forwarder and router tests

use crate::config::UpstreamSettings;
use crate::forwarder::transport::{UpstreamReply, UpstreamTransport};
use crate::forwarder::types::*;
use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const TEST_ENDPOINT: &str = "https://milo-test.openai.azure.com";
pub const TEST_API_KEY: &str = "test-secret-key";

/// What the scripted transport does when called
#[derive(Clone, Debug)]
pub enum Script {
    Reply { status: StatusCode, body: Bytes },
    Fail(String),
    Hang(Duration),
}

/// A request the scripted transport received
#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub url: String,
    pub api_key: String,
    pub body: Bytes,
}

impl RecordedCall {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// In-memory transport that replays a fixed script and records every call
#[derive(Debug)]
pub struct ScriptedTransport {
    script: Script,
    calls: AtomicUsize,
    recorded: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            recorded: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self::new(Script::Reply {
            status,
            body: body.into(),
        })
    }

    pub fn replying_json(body: Value) -> Self {
        Self::replying(StatusCode::OK, body.to_string())
    }

    pub fn completion(text: &str) -> Self {
        Self::replying_json(completion_payload(text))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.recorded.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl UpstreamTransport for ScriptedTransport {
    async fn post_json(
        &self,
        url: &str,
        api_key: &ApiKey,
        body: Bytes,
    ) -> Result<UpstreamReply, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.recorded.lock().unwrap().push(RecordedCall {
            url: url.to_string(),
            api_key: api_key.as_ref().to_string(),
            body,
        });

        match &self.script {
            Script::Reply { status, body } => Ok(UpstreamReply {
                status: *status,
                body: body.clone(),
            }),
            Script::Fail(message) => Err(UpstreamError::Network(message.clone())),
            Script::Hang(duration) => {
                tokio::time::sleep(*duration).await;
                Err(UpstreamError::Network("hung transport woke up".to_string()))
            }
        }
    }
}

/// Chat completions payload with a single candidate
pub fn completion_payload(text: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "finish_reason": "stop",
            "message": { "role": "assistant", "content": text }
        }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 9, "total_tokens": 21 }
    })
}

pub fn configured() -> UpstreamConfig {
    UpstreamConfig::from_settings(&UpstreamSettings {
        endpoint: Some(TEST_ENDPOINT.to_string()),
        api_key: Some(TEST_API_KEY.to_string()),
        deployment_name: DEFAULT_DEPLOYMENT_NAME.to_string(),
        api_version: DEFAULT_API_VERSION.to_string(),
        timeout_secs: 30,
    })
}

pub fn unconfigured() -> UpstreamConfig {
    UpstreamConfig::from_settings(&UpstreamSettings {
        endpoint: None,
        api_key: None,
        deployment_name: DEFAULT_DEPLOYMENT_NAME.to_string(),
        api_version: DEFAULT_API_VERSION.to_string(),
        timeout_secs: 30,
    })
}
