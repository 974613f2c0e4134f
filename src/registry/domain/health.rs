//! Server health status domain types.

use super::ParseHealthStatusError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Advisory health status of a registered server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Health has not been probed since the last registration.
    #[default]
    Unknown,
    /// The last probe succeeded.
    Healthy,
    /// The last probe failed or timed out.
    Unhealthy,
}

impl HealthStatus {
    /// Returns the canonical text representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for HealthStatus {
    type Error = ParseHealthStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "unknown" => Ok(Self::Unknown),
            "healthy" => Ok(Self::Healthy),
            "unhealthy" => Ok(Self::Unhealthy),
            _ => Err(ParseHealthStatusError(value.to_owned())),
        }
    }
}

/// Probe bookkeeping attached to a descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthRecord {
    health_status: HealthStatus,
    last_probed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    consecutive_failures: u32,
}

impl HealthRecord {
    /// Creates a record for a server that has never been probed.
    #[must_use]
    pub const fn unknown() -> Self {
        Self {
            health_status: HealthStatus::Unknown,
            last_probed_at: None,
            consecutive_failures: 0,
        }
    }

    /// Records a successful probe.
    pub fn record_success(&mut self, probed_at: DateTime<Utc>) {
        self.health_status = HealthStatus::Healthy;
        self.last_probed_at = Some(probed_at);
        self.consecutive_failures = 0;
    }

    /// Records a failed probe.
    pub fn record_failure(&mut self, probed_at: DateTime<Utc>) {
        self.health_status = HealthStatus::Unhealthy;
        self.last_probed_at = Some(probed_at);
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> HealthStatus {
        self.health_status
    }

    /// Returns when the server was last probed.
    #[must_use]
    pub const fn last_probed_at(&self) -> Option<DateTime<Utc>> {
        self.last_probed_at
    }

    /// Returns the number of failed probes since the last success.
    #[must_use]
    pub const fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}
