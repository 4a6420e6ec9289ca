//! Error types for reflection and value transformation

use thiserror::Error;

use crate::types::TypeDescriptor;

/// Result type for reflection operations
pub type Result<T> = std::result::Result<T, ReflectionError>;

/// Reflection errors
///
/// Every variant names the offending declaration so the class can be fixed
/// without further diagnosis.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReflectionError {
    #[error("Unsupported base class: {type_name} does not derive from the reflectable root")]
    UnsupportedBaseClass { type_name: String },

    #[error("Cannot ignore non-existent property '{property}' on {class}")]
    CannotIgnoreNonExistantProperty { property: String, class: String },

    #[error("Cannot ignore errors for non-existent property '{property}' on {class}")]
    CannotIgnoreErrorsForNonExistantProperty { property: String, class: String },

    #[error("Cannot map non-existent property '{property}' on {class}")]
    CannotMapNonExistantProperty { property: String, class: String },

    #[error("Cannot transform non-existent property '{property}' on {class}")]
    CannotTransformNonExistantProperty { property: String, class: String },

    #[error("Property '{property}' on {class} is both mapped and ignored")]
    CannotMapAndIgnoreProperty { property: String, class: String },

    #[error("Property '{property}' on {class} is both transformed and ignored")]
    CannotTransformAndIgnoreProperty { property: String, class: String },

    #[error("Properties {properties:?} on {class} all map to key '{conflict_key}'")]
    MappedPropertyConflict {
        properties: Vec<String>,
        conflict_key: String,
        class: String,
    },

    #[error("Property '{property}' on {class} has unsupported value type {value_type}")]
    UnsupportedPropertyValueType {
        property: String,
        value_type: TypeDescriptor,
        class: String,
    },

    #[error("Optional number property '{property}' on {class} cannot represent a missing value")]
    OptionalPrimitiveNumberNotBridgable { property: String, class: String },

    #[error("Property '{property}' of type {value_type} on {class} is not accessible dynamically")]
    PropertyNotBridgable {
        property: String,
        value_type: TypeDescriptor,
        class: String,
    },

    #[error("Property '{property}' on {class} is read-only")]
    ReadOnlyProperty { property: String, class: String },
}

impl ReflectionError {
    /// The property the error is about, if it is a property-level error
    pub fn property(&self) -> Option<&str> {
        match self {
            ReflectionError::UnsupportedBaseClass { .. }
            | ReflectionError::MappedPropertyConflict { .. } => None,
            ReflectionError::CannotIgnoreNonExistantProperty { property, .. }
            | ReflectionError::CannotIgnoreErrorsForNonExistantProperty { property, .. }
            | ReflectionError::CannotMapNonExistantProperty { property, .. }
            | ReflectionError::CannotTransformNonExistantProperty { property, .. }
            | ReflectionError::CannotMapAndIgnoreProperty { property, .. }
            | ReflectionError::CannotTransformAndIgnoreProperty { property, .. }
            | ReflectionError::UnsupportedPropertyValueType { property, .. }
            | ReflectionError::OptionalPrimitiveNumberNotBridgable { property, .. }
            | ReflectionError::PropertyNotBridgable { property, .. }
            | ReflectionError::ReadOnlyProperty { property, .. } => Some(property),
        }
    }
}

/// Failure reading or writing a property through dynamic access
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccessError {
    #[error("No property named '{0}'")]
    UnknownProperty(String),

    #[error("Property '{property}' expects {expected}")]
    TypeMismatch { property: String, expected: String },

    #[error("Property '{0}' is read-only")]
    ReadOnly(String),
}

/// Transformer failures
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Transformer {transformer} cannot convert {value} to {target}")]
    UnsupportedValue {
        transformer: String,
        value: String,
        target: String,
    },

    #[error("Type {0} has no factory to build instances from")]
    MissingFactory(String),

    #[error("Property access failed: {0}")]
    Access(#[from] AccessError),

    #[error("Value cannot be represented as JSON: {0}")]
    NotRepresentable(String),

    #[error("Reflection failed: {0}")]
    Reflection(#[from] ReflectionError),
}

/// Failures loading or resolving data-driven class specs
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("Invalid type expression '{expr}': {reason}")]
    InvalidType { expr: String, reason: String },

    #[error("Class {class} property '{property}' names unknown transformer '{kind}'")]
    UnknownTransformer {
        class: String,
        property: String,
        kind: String,
    },

    #[error("Unknown class: {0}")]
    UnknownClass(String),

    #[error("Unsupported spec file format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}
