//! `POST {base_url}{invoke_path}` tool transport.

use super::describe;
use crate::registry::{
    domain::ServerDescriptor,
    ports::{ToolTransport, TransportError, TransportResult},
};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;

/// Default invocation path appended to a server's base URL.
pub const DEFAULT_INVOKE_PATH: &str = "/invoke";

const MAX_UPSTREAM_MESSAGE_CHARS: usize = 512;

#[derive(Serialize)]
struct InvokePayload<'a> {
    tool_name: &'a str,
    arguments: &'a Map<String, Value>,
}

/// Forwards tool calls as JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpToolTransport {
    client: reqwest::Client,
    invoke_path: String,
    timeout: Duration,
}

impl HttpToolTransport {
    /// Creates a transport posting to `invoke_path` with a per-call timeout.
    #[must_use]
    pub fn new(client: reqwest::Client, invoke_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            invoke_path: invoke_path.into(),
            timeout,
        }
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::TimedOut(self.timeout)
        } else {
            TransportError::Unreachable(describe(err))
        }
    }
}

#[async_trait]
impl ToolTransport for HttpToolTransport {
    async fn invoke(
        &self,
        server: &ServerDescriptor,
        tool_name: &str,
        arguments: &Map<String, Value>,
    ) -> TransportResult<Value> {
        let url = server.base_url().join(&self.invoke_path);
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&InvokePayload {
                tool_name,
                arguments,
            })
            .send()
            .await
            .map_err(|err| self.classify(err))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|err| self.classify(err))?;

        if !status.is_success() {
            return Err(TransportError::UpstreamStatus {
                status: status.as_u16(),
                message: upstream_message(&body),
            });
        }

        if body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&body).map_err(|err| TransportError::InvalidResponse(err.to_string()))
    }
}

/// Extracts a short error message from a failed response body.
fn upstream_message(body: &[u8]) -> String {
    if let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) {
        let candidate = ["detail", "message", "error_message", "error"]
            .iter()
            .filter_map(|key| fields.get(*key))
            .find_map(|value| match value {
                Value::String(text) => Some(text.clone()),
                Value::Object(nested) => nested
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_owned),
                _ => None,
            });
        if let Some(message) = candidate {
            return truncate(&message);
        }
    }

    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        "empty response body".to_owned()
    } else {
        truncate(trimmed)
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_UPSTREAM_MESSAGE_CHARS {
        return text.to_owned();
    }
    let mut shortened: String = text.chars().take(MAX_UPSTREAM_MESSAGE_CHARS).collect();
    shortened.push_str("...");
    shortened
}
