//! Invocation routing to registered servers.

use crate::registry::{
    domain::{
        HealthStatus, RegistryDomainError, ServerName, ToolCallRequest, ToolCallResponse,
    },
    ports::{DescriptorStore, DescriptorStoreError, ToolTransport, TransportError},
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Routing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterSettings {
    /// Upper bound on one downstream call.
    pub invoke_timeout: Duration,
    /// Refuse calls to servers whose last probe failed.
    pub block_unhealthy: bool,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            invoke_timeout: Duration::from_secs(30),
            block_unhealthy: false,
        }
    }
}

/// Errors returned while routing a tool call.
#[derive(Debug, Error)]
pub enum InvocationRouterError {
    /// No server is registered under the requested name.
    #[error("server '{0}' is not registered")]
    NotFound(String),

    /// The server does not advertise the requested capability.
    #[error("server '{server}' has no capability '{tool}'")]
    UnknownCapability {
        /// Target server.
        server: ServerName,
        /// Requested capability.
        tool: String,
    },

    /// The arguments do not satisfy the capability schema.
    #[error(transparent)]
    Validation(#[from] RegistryDomainError),

    /// The server is marked unhealthy and blocking is enabled.
    #[error("server '{0}' is currently unhealthy")]
    ServerUnavailable(ServerName),

    /// The downstream call failed.
    #[error("invocation of '{tool}' on '{server}' failed: {source}")]
    Invocation {
        /// Target server.
        server: ServerName,
        /// Invoked capability.
        tool: String,
        /// Transport failure.
        #[source]
        source: TransportError,
    },

    /// Store lookup failed.
    #[error(transparent)]
    Store(#[from] DescriptorStoreError),
}

/// Result type for invocation routing.
pub type InvocationRouterResult<T> = Result<T, InvocationRouterError>;

/// Resolves tool calls against the registry and forwards them.
///
/// Calls are never retried.
#[derive(Clone)]
pub struct InvocationRouter<S, T>
where
    S: DescriptorStore,
    T: ToolTransport,
{
    store: Arc<S>,
    transport: Arc<T>,
    settings: RouterSettings,
}

impl<S, T> InvocationRouter<S, T>
where
    S: DescriptorStore,
    T: ToolTransport,
{
    /// Creates a router.
    #[must_use]
    pub const fn new(store: Arc<S>, transport: Arc<T>, settings: RouterSettings) -> Self {
        Self {
            store,
            transport,
            settings,
        }
    }

    /// Routes one tool call.
    ///
    /// Lookup, capability and argument checks happen before any network
    /// traffic.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationRouterError`] describing the first failed step.
    pub async fn invoke(
        &self,
        request: ToolCallRequest,
    ) -> InvocationRouterResult<ToolCallResponse> {
        let ToolCallRequest {
            server_name,
            tool_name,
            arguments,
        } = request;

        let not_found = || InvocationRouterError::NotFound(server_name.trim().to_owned());
        let name = ServerName::new(server_name.as_str()).map_err(|_| not_found())?;
        let server = self.store.get(&name).await?.ok_or_else(not_found)?;

        if !server.capabilities().check_arguments(&tool_name, &arguments)? {
            return Err(InvocationRouterError::UnknownCapability {
                server: name,
                tool: tool_name,
            });
        }

        if self.settings.block_unhealthy && server.health_status() == HealthStatus::Unhealthy {
            return Err(InvocationRouterError::ServerUnavailable(name));
        }

        debug!(server = %name, tool = %tool_name, "forwarding tool call");
        let timeout = self.settings.invoke_timeout;
        let outcome = tokio::time::timeout(
            timeout,
            self.transport.invoke(&server, &tool_name, &arguments),
        )
        .await
        .unwrap_or(Err(TransportError::TimedOut(timeout)));

        match outcome {
            Ok(body) => Ok(ToolCallResponse::ok(unwrap_result(body))),
            Err(source) => {
                warn!(server = %name, tool = %tool_name, error = %source, "tool call failed");
                Err(InvocationRouterError::Invocation {
                    server: name,
                    tool: tool_name,
                    source,
                })
            }
        }
    }
}

/// Returns the `result` member of a `{"result": ..}` body, or the body
/// itself.
///
/// Bodies carrying anything beside `result` pass through unchanged.
fn unwrap_result(body: Value) -> Value {
    match body {
        Value::Object(mut fields) if fields.len() == 1 && fields.contains_key("result") => {
            fields.remove("result").unwrap_or(Value::Null)
        }
        other => other,
    }
}
