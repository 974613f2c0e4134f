//! Unvalidated registration payload.

use super::{
    BaseUrl, Capabilities, CapabilityDefinition, RegistryDomainError, ServerKind, ServerName,
    ServerSpec,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Registration payload as received over HTTP or from seed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterServerRequest {
    /// Requested unique server name.
    pub name: String,
    /// Server role.
    pub kind: ServerKind,
    /// Absolute `http`/`https` URL of the server.
    pub base_url: String,
    /// Optional human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional server version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Advertised capabilities; must be present, may be empty.
    #[serde(default)]
    pub capabilities: Option<BTreeMap<String, CapabilityDefinition>>,
    /// Free-form metadata.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl RegisterServerRequest {
    /// Creates a request with an empty capability map.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ServerKind, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            base_url: base_url.into(),
            description: None,
            version: None,
            capabilities: Some(BTreeMap::new()),
            metadata: Map::new(),
        }
    }

    /// Adds or replaces one capability.
    #[must_use]
    pub fn with_capability(
        mut self,
        name: impl Into<String>,
        definition: CapabilityDefinition,
    ) -> Self {
        self.capabilities
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), definition);
        self
    }

    /// Validates the payload into a [`ServerSpec`].
    ///
    /// # Errors
    ///
    /// Returns the first [`RegistryDomainError`] found.
    pub fn validate(self) -> Result<ServerSpec, RegistryDomainError> {
        let name = ServerName::new(self.name)?;
        let base_url = BaseUrl::new(self.base_url)?;
        let capabilities = self
            .capabilities
            .ok_or(RegistryDomainError::MissingCapabilities)?;

        Ok(ServerSpec {
            name,
            kind: self.kind,
            base_url,
            description: non_blank(self.description),
            version: non_blank(self.version),
            capabilities: Capabilities::new(capabilities)?,
            metadata: self.metadata,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}
