//! Liveness probe port.

use crate::registry::domain::ServerDescriptor;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result type for probe operations.
pub type ProbeResult = Result<(), ProbeError>;

/// Checks whether a registered server is ready to accept calls.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Probes the server once.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError`] when the server is unreachable or not ready.
    async fn probe(&self, server: &ServerDescriptor) -> ProbeResult;
}

/// Reasons a probe failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProbeError {
    /// The server could not be reached.
    #[error("server unreachable: {0}")]
    Unreachable(String),

    /// The server answered with a non-success status.
    #[error("health endpoint returned status {0}")]
    UnhealthyStatus(u16),

    /// The server did not answer in time.
    #[error("probe timed out after {0:?}")]
    TimedOut(Duration),
}
