//! Parameter schema nodes for capability definitions.
//!
//! Schemas are a small, typed subset of JSON Schema. They are checked for
//! internal consistency when a server registers and are reused to validate
//! invocation arguments before any call leaves the registry.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// A node of a capability parameter schema, tagged by its JSON `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchemaNode {
    /// A JSON string, optionally restricted to an enumeration.
    String {
        /// Human-readable description.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        /// Allowed values; empty means any string.
        #[serde(default, rename = "enum", skip_serializing_if = "Vec::is_empty")]
        allowed: Vec<String>,
    },
    /// A JSON number without a fractional part.
    Integer {
        /// Human-readable description.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    /// Any JSON number.
    Number {
        /// Human-readable description.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    /// A JSON boolean.
    Boolean {
        /// Human-readable description.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    /// A JSON array whose elements share one schema.
    Array {
        /// Schema of each element.
        items: Box<SchemaNode>,
        /// Human-readable description.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    /// A JSON object with named properties.
    Object {
        /// Property schemas keyed by property name.
        #[serde(default)]
        properties: BTreeMap<String, SchemaNode>,
        /// Properties that must be present.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        required: Vec<String>,
        /// Whether properties without a schema are accepted.
        #[serde(default = "allow_additional", rename = "additionalProperties")]
        additional_properties: bool,
        /// Human-readable description.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

const fn allow_additional() -> bool {
    true
}

impl Default for SchemaNode {
    fn default() -> Self {
        Self::empty_object()
    }
}

/// First mismatch found while validating a value against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    path: String,
    problem: String,
}

impl SchemaViolation {
    fn new(path: &str, problem: impl Into<String>) -> Self {
        Self {
            path: path.to_owned(),
            problem: problem.into(),
        }
    }

    /// Returns the dotted path of the offending value.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns a short description of the mismatch.
    #[must_use]
    pub fn problem(&self) -> &str {
        &self.problem
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}: {}", self.path, self.problem)
    }
}

impl SchemaNode {
    /// Returns an object schema that accepts any object.
    #[must_use]
    pub const fn empty_object() -> Self {
        Self::Object {
            properties: BTreeMap::new(),
            required: Vec::new(),
            additional_properties: true,
            description: None,
        }
    }

    /// Returns the JSON type name of this node.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::String { .. } => "string",
            Self::Integer { .. } => "integer",
            Self::Number { .. } => "number",
            Self::Boolean { .. } => "boolean",
            Self::Array { .. } => "array",
            Self::Object { .. } => "object",
        }
    }

    /// Returns the node description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::String { description, .. }
            | Self::Integer { description }
            | Self::Number { description }
            | Self::Boolean { description }
            | Self::Array { description, .. }
            | Self::Object { description, .. } => description.as_deref(),
        }
    }

    /// Finds the first `required` entry that has no property schema.
    ///
    /// Returns the dotted path of the undefined property.
    #[must_use]
    pub fn find_undefined_required(&self) -> Option<String> {
        self.undefined_required_at("$")
    }

    fn undefined_required_at(&self, path: &str) -> Option<String> {
        match self {
            Self::Array { items, .. } => items.undefined_required_at(&format!("{path}[]")),
            Self::Object {
                properties,
                required,
                ..
            } => required
                .iter()
                .find(|name| !properties.contains_key(name.as_str()))
                .map(|name| format!("{path}.{name}"))
                .or_else(|| {
                    properties.iter().find_map(|(name, node)| {
                        node.undefined_required_at(&format!("{path}.{name}"))
                    })
                }),
            _ => None,
        }
    }

    /// Validates invocation arguments against this schema.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaViolation`] found.
    pub fn validate_arguments(&self, arguments: &Map<String, Value>) -> Result<(), SchemaViolation> {
        self.validate_object("$", arguments)
    }

    fn validate_at(&self, path: &str, value: &Value) -> Result<(), SchemaViolation> {
        match (self, value) {
            (Self::String { allowed, .. }, Value::String(text)) => {
                if allowed.is_empty() || allowed.iter().any(|candidate| candidate == text) {
                    Ok(())
                } else {
                    Err(SchemaViolation::new(
                        path,
                        format!("'{text}' is not one of [{}]", allowed.join(", ")),
                    ))
                }
            }
            (Self::Integer { .. }, Value::Number(number)) if is_integral(number) => Ok(()),
            (Self::Number { .. }, Value::Number(_)) | (Self::Boolean { .. }, Value::Bool(_)) => {
                Ok(())
            }
            (Self::Array { items, .. }, Value::Array(elements)) => {
                elements.iter().enumerate().try_for_each(|(index, element)| {
                    items.validate_at(&format!("{path}[{index}]"), element)
                })
            }
            (Self::Object { .. }, Value::Object(fields)) => self.validate_object(path, fields),
            (expected, actual) => Err(SchemaViolation::new(
                path,
                format!("expected {}, got {}", expected.type_name(), json_type_name(actual)),
            )),
        }
    }

    fn validate_object(&self, path: &str, fields: &Map<String, Value>) -> Result<(), SchemaViolation> {
        let Self::Object {
            properties,
            required,
            additional_properties,
            ..
        } = self
        else {
            return Err(SchemaViolation::new(
                path,
                format!("expected {}, got object", self.type_name()),
            ));
        };

        if let Some(missing) = required.iter().find(|name| !fields.contains_key(name.as_str())) {
            return Err(SchemaViolation::new(
                &format!("{path}.{missing}"),
                "required property is missing",
            ));
        }

        for (name, value) in fields {
            let field_path = format!("{path}.{name}");
            match properties.get(name) {
                // Optional properties may be sent as explicit nulls.
                Some(_) if value.is_null() && !required.contains(name) => {}
                Some(node) => node.validate_at(&field_path, value)?,
                None if *additional_properties => {}
                None => {
                    return Err(SchemaViolation::new(
                        &field_path,
                        "property is not allowed",
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Integers may arrive as floats with no fractional part, such as `5.0`.
fn is_integral(number: &serde_json::Number) -> bool {
    number.is_i64()
        || number.is_u64()
        || number
            .as_f64()
            .is_some_and(|float| float.is_finite() && float.fract().abs() < f64::EPSILON)
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
