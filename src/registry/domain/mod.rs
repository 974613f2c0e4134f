//! Domain model for the server registry and invocation routing.
//!
//! Descriptors, capabilities and parameter schemas are validated on
//! construction, so anything that reaches the store or the router is already
//! well-formed. Transport concerns remain outside this boundary.

mod capability;
mod descriptor;
mod error;
mod health;
mod ids;
mod invocation;
mod registration;
mod schema;

pub use capability::{Capabilities, CapabilityDefinition, CapabilityEntry, CapabilityKind};
pub use descriptor::{BaseUrl, ServerDescriptor, ServerKind, ServerSpec};
pub use error::{ParseHealthStatusError, ParseServerKindError, RegistryDomainError};
pub use health::{HealthRecord, HealthStatus};
pub use ids::{RegistrationId, ServerName};
pub use invocation::{ErrorBody, ErrorKind, ToolCallRequest, ToolCallResponse};
pub use registration::RegisterServerRequest;
pub use schema::{SchemaNode, SchemaViolation};
