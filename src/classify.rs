//! Type Classification
//!
//! Resolves a declared type into the closed [`PropertyType`] set. Rules apply
//! in a fixed priority order:
//!
//! 1. transformer match (first supporting transformer in registry order)
//! 2. optional unwrap, one layer per recursion
//! 3. primitives: bool, any integer or float width, text
//! 4. ordered containers, untyped ones holding `AnyObject`
//! 5. keyed containers, untyped ones holding `AnyObject`
//! 6. fallback to `AnyObject`
//!
//! Classification never fails. Whether a fallback is acceptable is decided by
//! the reflector, using the trace returned by [`TypeClassifier::classify_traced`].

use tracing::trace;

use crate::property::PropertyType;
use crate::transformer::TransformerRegistry;
use crate::types::{TypeDescriptor, TypeKind};

/// Classification result with the details the reflector needs
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub property_type: PropertyType,
    /// Whether any transformer claimed a type during classification
    pub transformer_matched: bool,
    /// First type that reached `AnyObject` only through the fallback rule
    pub unsupported: Option<TypeDescriptor>,
}

impl Classification {
    pub fn is_supported(&self) -> bool {
        self.unsupported.is_none()
    }
}

/// Classifier bound to a transformer registry
#[derive(Debug, Clone, Copy)]
pub struct TypeClassifier<'a> {
    registry: &'a TransformerRegistry,
}

#[derive(Default)]
struct Trace {
    transformer_matched: bool,
    unsupported: Option<TypeDescriptor>,
}

impl<'a> TypeClassifier<'a> {
    pub fn new(registry: &'a TransformerRegistry) -> Self {
        Self { registry }
    }

    pub fn classify(&self, declared: &TypeDescriptor) -> PropertyType {
        self.classify_traced(declared).property_type
    }

    pub fn classify_traced(&self, declared: &TypeDescriptor) -> Classification {
        let mut trace = Trace::default();
        let property_type = self.resolve(declared, &mut trace);
        trace!(declared = %declared, resolved = %property_type, "Classified type");
        Classification {
            property_type,
            transformer_matched: trace.transformer_matched,
            unsupported: trace.unsupported,
        }
    }

    fn resolve(&self, declared: &TypeDescriptor, trace: &mut Trace) -> PropertyType {
        if let Some(transformer) = self.registry.first_supporting(declared) {
            trace.transformer_matched = true;
            return PropertyType::transformable(transformer.clone(), declared.clone());
        }

        match declared.kind() {
            TypeKind::Optional(inner) => PropertyType::optional(self.resolve(inner, trace)),
            TypeKind::Bool => PropertyType::Bool,
            TypeKind::Integer { .. } | TypeKind::Float { .. } => PropertyType::Number,
            TypeKind::Text => PropertyType::String,
            TypeKind::Sequence(element) => PropertyType::array(self.resolve(element, trace)),
            TypeKind::UntypedSequence => PropertyType::array(PropertyType::AnyObject),
            TypeKind::Map(value) => PropertyType::dictionary(self.resolve(value, trace)),
            TypeKind::UntypedMap => PropertyType::dictionary(PropertyType::AnyObject),
            TypeKind::AnyObject => PropertyType::AnyObject,
            TypeKind::Record(_) | TypeKind::Opaque => {
                if trace.unsupported.is_none() {
                    trace.unsupported = Some(declared.clone());
                }
                PropertyType::AnyObject
            }
        }
    }
}

/// Classify a declared type against a transformer registry
pub fn classify(declared: &TypeDescriptor, registry: &TransformerRegistry) -> PropertyType {
    TypeClassifier::new(registry).classify(declared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Capability;
    use crate::transformer::{ReflectableTransformer, TransformerHandle};
    use crate::types::{RecordType, Typed};
    use std::collections::HashMap;

    fn defaults() -> TransformerRegistry {
        TransformerRegistry::default()
    }

    #[test]
    fn test_primitives() {
        let registry = defaults();
        assert_eq!(classify(&bool::type_descriptor(), &registry), PropertyType::Bool);
        assert_eq!(classify(&i64::type_descriptor(), &registry), PropertyType::Number);
        assert_eq!(classify(&u8::type_descriptor(), &registry), PropertyType::Number);
        assert_eq!(classify(&f64::type_descriptor(), &registry), PropertyType::Number);
        assert_eq!(classify(&String::type_descriptor(), &registry), PropertyType::String);
    }

    #[test]
    fn test_nested_optionals_keep_depth() {
        let registry = defaults();
        let ty = <Option<Option<bool>>>::type_descriptor();
        assert_eq!(
            classify(&ty, &registry),
            PropertyType::optional(PropertyType::optional(PropertyType::Bool))
        );
    }

    #[test]
    fn test_transformer_wins_over_shape() {
        let record = TypeDescriptor::new("Listish", TypeKind::Record(RecordType::new(Capability::Inherited)));
        let registry = defaults();
        assert_eq!(
            classify(&TypeDescriptor::sequence(record.clone()), &registry),
            PropertyType::array(PropertyType::transformable(
                TransformerHandle::new(ReflectableTransformer::new()),
                record,
            ))
        );
    }

    #[test]
    fn test_fallback_is_traced() {
        let registry = defaults();
        let classifier = TypeClassifier::new(&registry);

        let data = classifier.classify_traced(&TypeDescriptor::opaque("Data"));
        assert_eq!(data.property_type, PropertyType::AnyObject);
        assert_eq!(data.unsupported, Some(TypeDescriptor::opaque("Data")));

        let any = classifier.classify_traced(&serde_json::Value::type_descriptor());
        assert_eq!(any.property_type, PropertyType::AnyObject);
        assert!(any.is_supported());
    }

    #[test]
    fn test_nested_fallback_is_traced() {
        let registry = defaults();
        let ty = TypeDescriptor::map(TypeDescriptor::opaque("Data"));
        let result = TypeClassifier::new(&registry).classify_traced(&ty);
        assert_eq!(result.property_type, PropertyType::dictionary(PropertyType::AnyObject));
        assert!(!result.is_supported());
    }

    #[test]
    fn test_untyped_containers() {
        let registry = defaults();
        assert_eq!(
            classify(&<HashMap<String, serde_json::Value>>::type_descriptor(), &registry),
            PropertyType::dictionary(PropertyType::AnyObject)
        );
        assert_eq!(
            classify(&<serde_json::Map<String, serde_json::Value>>::type_descriptor(), &registry),
            PropertyType::dictionary(PropertyType::AnyObject)
        );
        assert_eq!(
            classify(&<Vec<serde_json::Value>>::type_descriptor(), &registry),
            PropertyType::array(PropertyType::AnyObject)
        );
    }
}
