//! `GET {base_url}/health` liveness probe.

use super::describe;
use crate::registry::{
    domain::ServerDescriptor,
    ports::{HealthProbe, ProbeError, ProbeResult},
};
use async_trait::async_trait;
use std::time::Duration;

/// Path probed on every server.
pub const HEALTH_PATH: &str = "/health";

/// Probes servers over HTTP; any 2xx answer counts as healthy.
#[derive(Debug, Clone)]
pub struct HttpHealthProbe {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpHealthProbe {
    /// Creates a probe with a per-request timeout.
    #[must_use]
    pub const fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn probe(&self, server: &ServerDescriptor) -> ProbeResult {
        let url = server.base_url().join(HEALTH_PATH);
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ProbeError::TimedOut(self.timeout)
                } else {
                    ProbeError::Unreachable(describe(err))
                }
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ProbeError::UnhealthyStatus(status.as_u16()))
        }
    }
}
