//! Tool call request and response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A request to invoke one capability on a registered server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Target server name.
    pub server_name: String,
    /// Capability to invoke.
    pub tool_name: String,
    /// Invocation arguments.
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolCallRequest {
    /// Creates a request with the given arguments.
    #[must_use]
    pub fn new(
        server_name: impl Into<String>,
        tool_name: impl Into<String>,
        arguments: Map<String, Value>,
    ) -> Self {
        Self {
            server_name: server_name.into(),
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

/// Stable machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed caller input.
    ValidationError,
    /// Unknown server.
    NotFound,
    /// The server does not advertise the requested capability.
    UnknownCapability,
    /// The downstream call failed.
    InvocationError,
    /// The server is currently marked unhealthy.
    ServerUnavailable,
    /// The registry itself failed.
    InternalError,
}

/// Error details carried by a failed [`ToolCallResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error category.
    pub kind: ErrorKind,
    /// Human-readable message.
    #[serde(rename = "error_message")]
    pub message: String,
    /// HTTP status returned by the downstream server, when one was received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
}

/// Outcome envelope returned to callers.
///
/// Failures serialize flat: `{"status": "error", "kind", "error_message"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolCallResponse {
    /// The call succeeded.
    Ok {
        /// Downstream result payload.
        result: Value,
    },
    /// The call failed.
    Error {
        /// Failure details, flattened beside the status tag.
        #[serde(flatten)]
        error: ErrorBody,
    },
}

impl ToolCallResponse {
    /// Builds a success envelope.
    #[must_use]
    pub const fn ok(result: Value) -> Self {
        Self::Ok { result }
    }

    /// Builds a failure envelope.
    #[must_use]
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Error {
            error: ErrorBody {
                kind,
                message: message.into(),
                upstream_status: None,
            },
        }
    }

    /// Returns the error message of a failure envelope.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Ok { .. } => None,
            Self::Error { error } => Some(&error.message),
        }
    }
}
