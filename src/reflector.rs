//! Reflector
//!
//! Derives the ordered property list of a reflectable object:
//!
//! 1. walk the superclass chain and reject classes outside the root's hierarchy
//! 2. enumerate the class's own properties in declaration order
//! 3. validate directives (no per-property work happens when they are invalid)
//! 4. classify each non-ignored property, applying transformer overrides and
//!    the bridging / read-only / support checks
//!
//! Nothing is cached; every call re-derives from the current class info.

use tracing::{debug, trace, warn};

use crate::class::{Bridging, Capability, ClassInfo, DirectiveSet, PropertyDescriptor, Reflectable};
use crate::classify::{Classification, TypeClassifier};
use crate::directives;
use crate::error::{ReflectionError, Result};
use crate::property::{Property, PropertyType};
use crate::transformer::TransformerRegistry;

/// Reflection engine
#[derive(Debug, Clone, Default)]
pub struct Reflector {
    transformers: TransformerRegistry,
}

impl Reflector {
    /// Reflector using the default transformer registry
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transformers(transformers: TransformerRegistry) -> Self {
        Self { transformers }
    }

    pub fn transformers(&self) -> &TransformerRegistry {
        &self.transformers
    }

    /// Reflect an object instance
    pub fn reflect(&self, object: &dyn Reflectable) -> Result<Vec<Property>> {
        self.reflect_class(&object.class_info())
    }

    /// Reflect a class descriptor directly
    pub fn reflect_class(&self, class: &ClassInfo) -> Result<Vec<Property>> {
        check_capability_chain(class)?;

        let descriptors = class.properties();
        let names: Vec<&str> = descriptors.iter().map(|p| p.name.as_str()).collect();
        let directives = class.effective_directives();
        debug!(
            class = class.name(),
            properties = names.len(),
            "Reflecting class"
        );

        directives::validate(class.name(), &names, &directives)?;

        let classifier = TypeClassifier::new(&self.transformers);
        let mut properties = Vec::with_capacity(descriptors.len());

        for descriptor in descriptors {
            let name = descriptor.name.as_str();
            if directives.is_ignored(name) {
                trace!(class = class.name(), property = name, "Ignoring property");
                continue;
            }

            let classification = classify_property(&classifier, descriptor, &directives);
            let suppress_errors = directives.ignores_errors(name);

            if let Some(err) = property_failure(class.name(), descriptor, &classification) {
                if suppress_errors {
                    warn!(class = class.name(), property = name, error = %err, "Omitting property");
                    continue;
                }
                return Err(err);
            }

            let external_name = directives.external_name(name).unwrap_or(name);
            trace!(
                class = class.name(),
                property = name,
                external = external_name,
                property_type = %classification.property_type,
                "Reflected property"
            );
            properties.push(
                Property::new(name, classification.property_type)
                    .with_external_name(external_name)
                    .with_suppressed_errors(suppress_errors),
            );
        }

        debug!(class = class.name(), reflected = properties.len(), "Reflection complete");
        Ok(properties)
    }
}

/// Every ancestor must descend from the capability root
fn check_capability_chain(class: &ClassInfo) -> Result<()> {
    let unsupported = |class: &ClassInfo| ReflectionError::UnsupportedBaseClass {
        type_name: class.name().to_string(),
    };

    let chain = std::iter::once(class).chain(class.ancestors());
    for (depth, current) in chain.enumerate() {
        match current.capability() {
            Capability::Root => return Ok(()),
            Capability::Inherited if current.superclass().is_some() => {}
            Capability::Adopted if depth == 0 => {}
            Capability::Inherited | Capability::Adopted | Capability::None => {
                debug!(class = class.name(), ancestor = current.name(), "Rejected class chain");
                return Err(unsupported(current));
            }
        }
    }

    Ok(())
}

fn classify_property(
    classifier: &TypeClassifier<'_>,
    descriptor: &PropertyDescriptor,
    directives: &DirectiveSet,
) -> Classification {
    match directives.transformer(&descriptor.name) {
        Some(transformer) if transformer.supports_type(&descriptor.declared) => Classification {
            property_type: PropertyType::transformable(
                transformer.clone(),
                descriptor.declared.clone(),
            ),
            transformer_matched: true,
            unsupported: None,
        },
        _ => classifier.classify_traced(&descriptor.declared),
    }
}

/// The first per-property check that fails, in fixed order
fn property_failure(
    class: &str,
    descriptor: &PropertyDescriptor,
    classification: &Classification,
) -> Option<ReflectionError> {
    let property = descriptor.name.clone();
    let class = class.to_string();

    if !descriptor.is_bridgable() {
        return Some(ReflectionError::PropertyNotBridgable {
            property,
            value_type: descriptor.declared.clone(),
            class,
        });
    }

    if descriptor.is_read_only() {
        return Some(ReflectionError::ReadOnlyProperty { property, class });
    }

    let optional_number = descriptor
        .declared
        .optional_inner()
        .map(|inner| inner.is_numeric())
        .unwrap_or(false);
    if optional_number && descriptor.bridging == Bridging::Native {
        return Some(ReflectionError::OptionalPrimitiveNumberNotBridgable { property, class });
    }

    if !classification.is_supported() {
        return Some(ReflectionError::UnsupportedPropertyValueType {
            property,
            value_type: descriptor.declared.clone(),
            class,
        });
    }

    None
}
