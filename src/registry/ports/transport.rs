//! Downstream invocation port.

use crate::registry::domain::ServerDescriptor;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Forwards a tool call to a registered server.
#[async_trait]
pub trait ToolTransport: Send + Sync {
    /// Sends `{tool_name, arguments}` to the server and returns its JSON
    /// response body.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on transport failure, timeout, a non-2xx
    /// status or an unreadable body.
    async fn invoke(
        &self,
        server: &ServerDescriptor,
        tool_name: &str,
        arguments: &Map<String, Value>,
    ) -> TransportResult<Value>;
}

/// Failures of a downstream call.
///
/// Messages never include the server URL.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The call did not complete in time.
    #[error("call timed out after {0:?}")]
    TimedOut(Duration),

    /// The server could not be reached.
    #[error("server unreachable: {0}")]
    Unreachable(String),

    /// The server answered with a non-success status.
    #[error("server returned status {status}: {message}")]
    UpstreamStatus {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// The server answered 2xx with a body that is not JSON.
    #[error("invalid response body: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    /// Returns the upstream HTTP status, when one was received.
    #[must_use]
    pub const fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::UpstreamStatus { status, .. } => Some(*status),
            Self::TimedOut(_) | Self::Unreachable(_) | Self::InvalidResponse(_) => None,
        }
    }
}
