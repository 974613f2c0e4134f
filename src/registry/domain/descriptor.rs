//! Server descriptor aggregate root.

use super::{
    Capabilities, CapabilityEntry, CapabilityKind, HealthRecord, HealthStatus,
    ParseServerKindError, RegistrationId, RegistryDomainError, ServerName,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use url::Url;

/// Role a server plays for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerKind {
    /// Exposes invocable tools.
    Tool,
    /// Exposes readable resources.
    Resource,
    /// Exposes both tools and resources.
    Hybrid,
}

impl ServerKind {
    /// Returns the canonical text representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tool => "tool",
            Self::Resource => "resource",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for ServerKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ServerKind {
    type Error = ParseServerKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "tool" => Ok(Self::Tool),
            "resource" => Ok(Self::Resource),
            "hybrid" => Ok(Self::Hybrid),
            _ => Err(ParseServerKindError(value.to_owned())),
        }
    }
}

/// Validated absolute `http`/`https` base URL of a server.
///
/// The text is kept as supplied (trimmed) so a stored descriptor compares
/// equal to its registration input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Parses and validates a base URL.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError`] when the URL is empty, malformed, has
    /// no host, or uses a scheme other than `http`/`https`.
    pub fn new(value: impl Into<String>) -> Result<Self, RegistryDomainError> {
        let normalized = value.into().trim().to_owned();
        if normalized.is_empty() {
            return Err(RegistryDomainError::EmptyBaseUrl);
        }

        let parsed = Url::parse(&normalized).map_err(|err| RegistryDomainError::InvalidBaseUrl {
            url: normalized.clone(),
            reason: err.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RegistryDomainError::UnsupportedUrlScheme(
                parsed.scheme().to_owned(),
            ));
        }

        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(RegistryDomainError::InvalidBaseUrl {
                url: normalized,
                reason: "missing host".to_owned(),
            });
        }

        Ok(Self(normalized))
    }

    /// Returns the URL text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Appends an absolute path to the base URL.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.0.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Validated registration input for a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSpec {
    /// Unique server name.
    pub name: ServerName,
    /// Server role.
    pub kind: ServerKind,
    /// Location of the server.
    pub base_url: BaseUrl,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Optional server version.
    pub version: Option<String>,
    /// Advertised capabilities.
    pub capabilities: Capabilities,
    /// Free-form metadata.
    pub metadata: Map<String, Value>,
}

/// The registry's record of a registered server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerDescriptor {
    id: RegistrationId,
    name: ServerName,
    kind: ServerKind,
    base_url: BaseUrl,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    capabilities: Capabilities,
    #[serde(default)]
    metadata: Map<String, Value>,
    #[serde(flatten)]
    health: HealthRecord,
    registered_at: DateTime<Utc>,
}

impl ServerDescriptor {
    /// Creates a freshly registered descriptor with unknown health.
    #[must_use]
    pub fn register(spec: ServerSpec, clock: &impl Clock) -> Self {
        let ServerSpec {
            name,
            kind,
            base_url,
            description,
            version,
            capabilities,
            metadata,
        } = spec;

        Self {
            id: RegistrationId::new(),
            name,
            kind,
            base_url,
            description,
            version,
            capabilities,
            metadata,
            health: HealthRecord::unknown(),
            registered_at: clock.utc(),
        }
    }

    /// Returns the registration identifier.
    #[must_use]
    pub const fn id(&self) -> RegistrationId {
        self.id
    }

    /// Returns the unique server name.
    #[must_use]
    pub const fn name(&self) -> &ServerName {
        &self.name
    }

    /// Returns the server kind.
    #[must_use]
    pub const fn kind(&self) -> ServerKind {
        self.kind
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the version, if any.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns the advertised capabilities.
    #[must_use]
    pub const fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Returns the free-form metadata.
    #[must_use]
    pub const fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// Returns the advisory health status.
    #[must_use]
    pub const fn health_status(&self) -> HealthStatus {
        self.health.status()
    }

    /// Returns when the server was last probed.
    #[must_use]
    pub const fn last_probed_at(&self) -> Option<DateTime<Utc>> {
        self.health.last_probed_at()
    }

    /// Returns the number of failed probes since the last success.
    #[must_use]
    pub const fn consecutive_failures(&self) -> u32 {
        self.health.consecutive_failures()
    }

    /// Returns the registration timestamp.
    #[must_use]
    pub const fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    /// Records the outcome of a liveness probe.
    pub fn record_probe(&mut self, healthy: bool, clock: &impl Clock) {
        let probed_at = clock.utc();
        if healthy {
            self.health.record_success(probed_at);
        } else {
            self.health.record_failure(probed_at);
        }
    }

    /// Flattens capabilities of one kind into owner-annotated entries.
    #[must_use]
    pub fn capability_entries(&self, kind: CapabilityKind) -> Vec<CapabilityEntry> {
        self.capabilities
            .iter()
            .filter(|(_, definition)| definition.kind() == kind)
            .map(|(name, definition)| CapabilityEntry {
                name: name.to_owned(),
                definition: definition.clone(),
                server: self.name.clone(),
                server_kind: self.kind,
                server_url: self.base_url.to_string(),
            })
            .collect()
    }
}
