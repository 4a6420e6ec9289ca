//! Reflection output: semantic property types and property records

use serde::{Serialize, Serializer};
use std::fmt;

use crate::transformer::TransformerHandle;
use crate::types::TypeDescriptor;

/// Semantic type of a property, as consumed by encoders and decoders
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyType {
    Bool,
    Number,
    String,
    /// Opaque payload passed through unchanged
    AnyObject,
    Optional(Box<PropertyType>),
    Array(Box<PropertyType>),
    /// String-keyed dictionary; only the value type is classified
    Dictionary(Box<PropertyType>),
    Transformable {
        transformer: TransformerHandle,
        target_type: TypeDescriptor,
    },
}

impl PropertyType {
    pub fn optional(wrapped: PropertyType) -> Self {
        PropertyType::Optional(Box::new(wrapped))
    }

    pub fn array(element: PropertyType) -> Self {
        PropertyType::Array(Box::new(element))
    }

    pub fn dictionary(value: PropertyType) -> Self {
        PropertyType::Dictionary(Box::new(value))
    }

    pub fn transformable(transformer: TransformerHandle, target_type: TypeDescriptor) -> Self {
        PropertyType::Transformable {
            transformer,
            target_type,
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyType::Bool => f.write_str("bool"),
            PropertyType::Number => f.write_str("number"),
            PropertyType::String => f.write_str("string"),
            PropertyType::AnyObject => f.write_str("any"),
            PropertyType::Optional(wrapped) => write!(f, "optional<{wrapped}>"),
            PropertyType::Array(element) => write!(f, "array<{element}>"),
            PropertyType::Dictionary(value) => write!(f, "dictionary<{value}>"),
            PropertyType::Transformable {
                transformer,
                target_type,
            } => write!(f, "transformable<{} -> {}>", transformer.kind(), target_type),
        }
    }
}

impl Serialize for PropertyType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One reflected property
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    /// Declared name
    pub name: String,
    /// Key exposed to the encoder/decoder
    pub external_name: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    /// Listed in the ignore-errors directive
    pub suppress_errors: bool,
}

impl Property {
    pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
        let name = name.into();
        Self {
            external_name: name.clone(),
            name,
            property_type,
            suppress_errors: false,
        }
    }

    pub fn with_external_name(mut self, external_name: impl Into<String>) -> Self {
        self.external_name = external_name.into();
        self
    }

    pub fn with_suppressed_errors(mut self, suppress_errors: bool) -> Self {
        self.suppress_errors = suppress_errors;
        self
    }
}
