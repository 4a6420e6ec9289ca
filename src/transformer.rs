//! Value transformers
//!
//! A transformer converts between a property's in-memory value and its
//! external representation, and may claim classification authority over a
//! declared type. Transformers are consulted in registry order.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use tracing::trace;

use crate::error::TransformError;
use crate::property::PropertyType;
use crate::reflector::Reflector;
use crate::types::TypeDescriptor;
use crate::value::Value;

/// Which way a transform runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformDirection {
    /// Read a value out of its transformed representation
    Forwards,
    /// Write a value into its transformed representation
    Backwards,
}

/// Pluggable conversion between in-memory and external values
pub trait ValueTransformer: fmt::Debug + Send + Sync {
    /// Identity used for equality between handles
    fn kind(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Whether this transformer claims the declared type
    fn supports_type(&self, target_type: &TypeDescriptor) -> bool;

    /// Whether a concrete value can be transformed
    fn supports_value(
        &self,
        value: &Value,
        target_type: &TypeDescriptor,
        direction: TransformDirection,
    ) -> bool;

    fn transform(
        &self,
        value: Value,
        target_type: &TypeDescriptor,
        direction: TransformDirection,
    ) -> Result<Value, TransformError>;
}

/// Shared transformer reference; handles compare by transformer kind
#[derive(Clone)]
pub struct TransformerHandle(Arc<dyn ValueTransformer>);

impl TransformerHandle {
    pub fn new(transformer: impl ValueTransformer + 'static) -> Self {
        Self(Arc::new(transformer))
    }
}

impl From<Arc<dyn ValueTransformer>> for TransformerHandle {
    fn from(transformer: Arc<dyn ValueTransformer>) -> Self {
        Self(transformer)
    }
}

impl Deref for TransformerHandle {
    type Target = dyn ValueTransformer;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl PartialEq for TransformerHandle {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind()
    }
}

impl fmt::Debug for TransformerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transformer({})", self.kind())
    }
}

/// Ordered transformer list; the first supporting transformer wins
///
/// The built-in [`ReflectableTransformer`] is bound to the registry that owns
/// it, so nested records are reflected with the same transformers as the
/// outer object.
#[derive(Debug, Clone)]
pub struct TransformerRegistry {
    transformers: Vec<TransformerHandle>,
}

impl Default for TransformerRegistry {
    fn default() -> Self {
        Self {
            transformers: vec![TransformerHandle::new(ReflectableTransformer::new())],
        }
    }
}

impl TransformerRegistry {
    /// A registry without the built-in transformer
    pub fn empty() -> Self {
        Self {
            transformers: Vec::new(),
        }
    }

    /// Append a transformer after those already registered
    pub fn with(mut self, transformer: TransformerHandle) -> Self {
        self.push(transformer);
        self
    }

    pub fn push(&mut self, transformer: TransformerHandle) {
        self.transformers.push(transformer);
        self.bind_reflectable();
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransformerHandle> {
        self.transformers.iter()
    }

    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }

    pub fn first_supporting(&self, target_type: &TypeDescriptor) -> Option<&TransformerHandle> {
        self.transformers.iter().find(|t| t.supports_type(target_type))
    }

    pub fn by_kind(&self, kind: &str) -> Option<&TransformerHandle> {
        self.transformers.iter().find(|t| t.kind() == kind)
    }

    fn reflectable_position(&self) -> Option<usize> {
        self.transformers
            .iter()
            .position(|t| t.kind() == ReflectableTransformer::KIND)
    }

    /// Everything except the entry at `position`, in order
    fn companions(&self, position: Option<usize>) -> Vec<TransformerHandle> {
        self.transformers
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != position)
            .map(|(_, transformer)| transformer.clone())
            .collect()
    }

    /// Rebuild the built-in entry so it sees the current companions
    fn bind_reflectable(&mut self) {
        let Some(position) = self.reflectable_position() else {
            return;
        };
        let bound = ReflectableTransformer {
            companions: self.companions(Some(position)),
            position,
        };
        self.transformers[position] = TransformerHandle::new(bound);
    }
}

/// Converts between reflectable objects and dictionaries keyed by external name
///
/// Holds the other transformers of its registry and its own position among
/// them, and rebuilds that registry when it reflects a nested record.
#[derive(Debug, Clone, Default)]
pub struct ReflectableTransformer {
    companions: Vec<TransformerHandle>,
    position: usize,
}

impl ReflectableTransformer {
    pub const KIND: &'static str = "reflectable";

    /// Transformer bound to the default registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Transformer that reflects nested records with `registry`
    ///
    /// A registry without the built-in gets it appended after its own entries.
    pub fn bound_to(registry: &TransformerRegistry) -> Self {
        let position = registry.reflectable_position();
        let companions = registry.companions(position);
        Self {
            position: position.unwrap_or(companions.len()),
            companions,
        }
    }

    /// The registry this transformer belongs to, itself included
    pub fn registry(&self) -> TransformerRegistry {
        let mut transformers = self.companions.clone();
        let position = self.position.min(transformers.len());
        transformers.insert(position, TransformerHandle::new(self.clone()));
        TransformerRegistry { transformers }
    }

    pub fn reflector(&self) -> Reflector {
        Reflector::with_transformers(self.registry())
    }
}

impl ValueTransformer for ReflectableTransformer {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn supports_type(&self, target_type: &TypeDescriptor) -> bool {
        target_type
            .as_record()
            .map(|record| record.capability().is_reflectable())
            .unwrap_or(false)
    }

    fn supports_value(
        &self,
        value: &Value,
        target_type: &TypeDescriptor,
        direction: TransformDirection,
    ) -> bool {
        let shape_ok = match direction {
            TransformDirection::Forwards => matches!(value, Value::Dictionary(_)),
            TransformDirection::Backwards => matches!(value, Value::Object(_)),
        };
        shape_ok && self.supports_type(target_type)
    }

    fn transform(
        &self,
        value: Value,
        target_type: &TypeDescriptor,
        direction: TransformDirection,
    ) -> Result<Value, TransformError> {
        let reflector = self.reflector();
        match (direction, value) {
            (TransformDirection::Forwards, Value::Dictionary(mut entries)) => {
                let mut instance = target_type
                    .as_record()
                    .and_then(|record| record.instantiate())
                    .ok_or_else(|| TransformError::MissingFactory(target_type.to_string()))?;

                for property in reflector.reflect(instance.as_ref())? {
                    let Some(raw) = entries.remove(&property.external_name) else {
                        continue;
                    };
                    let converted = transform_nested(raw, &property.property_type, direction)?;
                    trace!(property = %property.name, "Setting property from dictionary");
                    instance.set_value(&property.name, converted)?;
                }
                Ok(Value::Object(instance))
            }
            (TransformDirection::Backwards, Value::Object(object)) => {
                let mut entries = BTreeMap::new();
                for property in reflector.reflect(object.as_ref())? {
                    let Some(raw) = object.value(&property.name) else {
                        continue;
                    };
                    let converted = transform_nested(raw, &property.property_type, direction)?;
                    entries.insert(property.external_name, converted);
                }
                Ok(Value::Dictionary(entries))
            }
            (_, other) => Err(TransformError::UnsupportedValue {
                transformer: Self::KIND.to_string(),
                value: other.kind_name(),
                target: target_type.to_string(),
            }),
        }
    }
}

/// Apply transformers found anywhere inside a property type to a value
pub fn transform_nested(
    value: Value,
    property_type: &PropertyType,
    direction: TransformDirection,
) -> Result<Value, TransformError> {
    match (property_type, value) {
        (_, Value::Null) => Ok(Value::Null),
        (
            PropertyType::Transformable {
                transformer,
                target_type,
            },
            value,
        ) => {
            if transformer.supports_value(&value, target_type, direction) {
                transformer.transform(value, target_type, direction)
            } else {
                Ok(value)
            }
        }
        (PropertyType::Optional(wrapped), value) => transform_nested(value, wrapped, direction),
        (PropertyType::Array(element), Value::Array(items)) => items
            .into_iter()
            .map(|item| transform_nested(item, element, direction))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        (PropertyType::Dictionary(value_type), Value::Dictionary(entries)) => entries
            .into_iter()
            .map(|(key, item)| transform_nested(item, value_type, direction).map(|v| (key, v)))
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Value::Dictionary),
        (_, value) => Ok(value),
    }
}
