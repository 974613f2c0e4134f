//! Capability definitions advertised by registered servers.

use super::{RegistryDomainError, SchemaNode, ServerKind, ServerName};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Whether a capability is an invocable tool or a readable resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    /// An operation with side effects or computed output.
    #[default]
    Tool,
    /// A readable data source.
    Resource,
}

/// Metadata and parameter schema of one named capability.
///
/// Unknown keys are rejected, so a bare JSON schema posted in place of a
/// definition fails instead of silently accepting any arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapabilityDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    kind: CapabilityKind,
    #[serde(default)]
    parameters: SchemaNode,
}

impl CapabilityDefinition {
    /// Creates a tool capability with the given parameter schema.
    #[must_use]
    pub const fn tool(parameters: SchemaNode) -> Self {
        Self {
            description: None,
            kind: CapabilityKind::Tool,
            parameters,
        }
    }

    /// Creates a resource capability with the given parameter schema.
    #[must_use]
    pub const fn resource(parameters: SchemaNode) -> Self {
        Self {
            description: None,
            kind: CapabilityKind::Resource,
            parameters,
        }
    }

    /// Sets a human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let normalized = description.into().trim().to_owned();
        self.description = (!normalized.is_empty()).then_some(normalized);
        self
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the capability kind.
    #[must_use]
    pub const fn kind(&self) -> CapabilityKind {
        self.kind
    }

    /// Returns the parameter schema.
    #[must_use]
    pub const fn parameters(&self) -> &SchemaNode {
        &self.parameters
    }

    fn check_schema(&self, name: &str) -> Result<(), RegistryDomainError> {
        if !matches!(self.parameters, SchemaNode::Object { .. }) {
            return Err(RegistryDomainError::ParametersMustBeObject(name.to_owned()));
        }

        self.parameters
            .find_undefined_required()
            .map_or(Ok(()), |property| {
                Err(RegistryDomainError::UndefinedRequiredProperty {
                    capability: name.to_owned(),
                    property,
                })
            })
    }
}

/// Validated set of capabilities keyed by capability name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capabilities(BTreeMap<String, CapabilityDefinition>);

impl Capabilities {
    /// Validates capability names and parameter schemas.
    ///
    /// Names are trimmed. An empty map is accepted; a server may register
    /// before advertising anything.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError`] when a name is empty or a schema is
    /// inconsistent.
    pub fn new(
        definitions: impl IntoIterator<Item = (String, CapabilityDefinition)>,
    ) -> Result<Self, RegistryDomainError> {
        let mut validated = BTreeMap::new();
        for (raw_name, definition) in definitions {
            let name = raw_name.trim().to_owned();
            if name.is_empty() {
                return Err(RegistryDomainError::EmptyCapabilityName);
            }
            definition.check_schema(&name)?;
            validated.insert(name, definition);
        }
        Ok(Self(validated))
    }

    /// Looks up a capability by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CapabilityDefinition> {
        self.0.get(name)
    }

    /// Returns whether a capability with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Iterates capabilities in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CapabilityDefinition)> {
        self.0.iter().map(|(name, definition)| (name.as_str(), definition))
    }

    /// Returns the number of capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no capabilities are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Counts capabilities of the given kind.
    #[must_use]
    pub fn count_of(&self, kind: CapabilityKind) -> usize {
        self.0
            .values()
            .filter(|definition| definition.kind == kind)
            .count()
    }

    /// Validates invocation arguments against the named capability.
    ///
    /// Returns `Ok(false)` when no capability has that name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::InvalidArguments`] when the arguments
    /// do not satisfy the capability schema.
    pub fn check_arguments(
        &self,
        name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<bool, RegistryDomainError> {
        let Some(definition) = self.0.get(name) else {
            return Ok(false);
        };

        definition
            .parameters
            .validate_arguments(arguments)
            .map_err(|violation| RegistryDomainError::InvalidArguments {
                capability: name.to_owned(),
                violation: violation.to_string(),
            })?;
        Ok(true)
    }
}

/// A capability flattened together with the server that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityEntry {
    /// Capability name.
    pub name: String,
    /// Capability metadata and schema.
    #[serde(flatten)]
    pub definition: CapabilityDefinition,
    /// Owning server.
    pub server: ServerName,
    /// Kind of the owning server.
    pub server_kind: ServerKind,
    /// Base URL of the owning server.
    pub server_url: String,
}

impl CapabilityEntry {
    /// Returns whether the query matches the name or description.
    ///
    /// Matching is a case-insensitive substring test.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self
                .definition
                .description()
                .is_some_and(|description| description.to_lowercase().contains(&needle))
    }
}
