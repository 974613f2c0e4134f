//! Error types for registry domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing registry domain values.
///
/// Every variant describes malformed caller input; the HTTP surface reports
/// them as `validation_error`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryDomainError {
    /// The server name is empty after trimming.
    #[error("server name must not be empty")]
    EmptyServerName,

    /// The server name contains characters outside `[A-Za-z0-9_.-]`.
    #[error(
        "server name '{0}' contains invalid characters (only alphanumerics, '-', '_' and '.' allowed)"
    )]
    InvalidServerName(String),

    /// The server name exceeds the 100-character limit.
    #[error("server name exceeds 100 character limit: {0}")]
    ServerNameTooLong(String),

    /// The base URL is empty after trimming.
    #[error("base URL must not be empty")]
    EmptyBaseUrl,

    /// The base URL could not be parsed as an absolute URL.
    #[error("base URL '{url}' is not a well-formed URL: {reason}")]
    InvalidBaseUrl {
        /// Rejected URL text.
        url: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The base URL uses a scheme other than `http` or `https`.
    #[error("base URL scheme '{0}' is not supported (expected http or https)")]
    UnsupportedUrlScheme(String),

    /// The capability map is missing or null.
    #[error("capabilities must be provided")]
    MissingCapabilities,

    /// A capability name is empty after trimming.
    #[error("capability name must not be empty")]
    EmptyCapabilityName,

    /// A capability parameter schema is not an object schema.
    #[error("parameters of capability '{0}' must be an object schema")]
    ParametersMustBeObject(String),

    /// An object schema lists a required property it does not define.
    #[error("capability '{capability}' requires undefined property '{property}'")]
    UndefinedRequiredProperty {
        /// Capability whose schema is malformed.
        capability: String,
        /// Path of the missing property definition.
        property: String,
    },

    /// Invocation arguments do not satisfy the capability schema.
    #[error("invalid arguments for '{capability}': {violation}")]
    InvalidArguments {
        /// Capability being invoked.
        capability: String,
        /// First schema violation found.
        violation: String,
    },
}

/// Error returned while parsing a server kind from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown server kind: {0}")]
pub struct ParseServerKindError(pub String);

/// Error returned while parsing a health status from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown server health status: {0}")]
pub struct ParseHealthStatusError(pub String);
