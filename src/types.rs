//! Declared type handles
//!
//! Rust erases types at runtime, so every property declares its type through
//! an explicit [`TypeDescriptor`]. Descriptors are plain values: they can be
//! built by hand, derived from a Rust type through [`Typed`], or inferred
//! from parsed JSON with [`TypeDescriptor::of_json`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::class::{Capability, Reflectable};

/// Builds a fresh instance of a record type
pub type Factory = Arc<dyn Fn() -> Box<dyn Reflectable> + Send + Sync>;

/// A declared type: a display name plus its structural kind
#[derive(Clone, PartialEq)]
pub struct TypeDescriptor {
    name: String,
    kind: TypeKind,
}

/// Structural kind of a declared type
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Bool,
    Integer { bits: u8, signed: bool },
    Float { bits: u8 },
    Text,
    /// One optional layer around the inner type
    Optional(Box<TypeDescriptor>),
    /// Ordered, indexable container with a known element type
    Sequence(Box<TypeDescriptor>),
    /// Ordered container obtained from untyped data
    UntypedSequence,
    /// String-keyed container with a known value type
    Map(Box<TypeDescriptor>),
    /// Keyed container obtained from untyped data
    UntypedMap,
    /// Intentionally opaque payload
    AnyObject,
    /// Another class
    Record(RecordType),
    /// A named type no classification rule understands
    Opaque,
}

/// Class-typed property target
#[derive(Clone)]
pub struct RecordType {
    capability: Capability,
    factory: Option<Factory>,
}

impl RecordType {
    pub fn new(capability: Capability) -> Self {
        Self {
            capability,
            factory: None,
        }
    }

    pub fn with_factory(mut self, factory: Factory) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Build a fresh instance, if the record knows how
    pub fn instantiate(&self) -> Option<Box<dyn Reflectable>> {
        self.factory.as_ref().map(|make| make())
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        self.capability == other.capability
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("capability", &self.capability)
            .field("has_factory", &self.factory.is_some())
            .finish()
    }
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn bool() -> Self {
        Self::new("bool", TypeKind::Bool)
    }

    pub fn integer(bits: u8, signed: bool) -> Self {
        let prefix = if signed { 'i' } else { 'u' };
        Self::new(format!("{prefix}{bits}"), TypeKind::Integer { bits, signed })
    }

    pub fn float(bits: u8) -> Self {
        Self::new(format!("f{bits}"), TypeKind::Float { bits })
    }

    pub fn text() -> Self {
        Self::new("String", TypeKind::Text)
    }

    pub fn optional(inner: TypeDescriptor) -> Self {
        Self::new(format!("Option<{}>", inner.name), TypeKind::Optional(Box::new(inner)))
    }

    pub fn sequence(element: TypeDescriptor) -> Self {
        Self::new(format!("Vec<{}>", element.name), TypeKind::Sequence(Box::new(element)))
    }

    pub fn untyped_sequence() -> Self {
        Self::new("JsonArray", TypeKind::UntypedSequence)
    }

    pub fn map(value: TypeDescriptor) -> Self {
        Self::new(
            format!("Map<String, {}>", value.name),
            TypeKind::Map(Box::new(value)),
        )
    }

    pub fn untyped_map() -> Self {
        Self::new("JsonObject", TypeKind::UntypedMap)
    }

    pub fn any_object() -> Self {
        Self::new("Any", TypeKind::AnyObject)
    }

    pub fn opaque(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Opaque)
    }

    /// Describe a reflectable class through a default instance
    pub fn record<T: Reflectable + Default>() -> Self {
        let info = T::default().class_info();
        let factory: Factory = Arc::new(|| Box::new(T::default()) as Box<dyn Reflectable>);
        Self::new(
            info.name(),
            TypeKind::Record(RecordType::new(info.capability()).with_factory(factory)),
        )
    }

    /// Runtime type of a value parsed from untyped JSON
    pub fn of_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::any_object(),
            serde_json::Value::Bool(_) => Self::bool(),
            serde_json::Value::Number(n) if n.is_f64() => Self::float(64),
            serde_json::Value::Number(n) if n.is_u64() => Self::integer(64, false),
            serde_json::Value::Number(_) => Self::integer(64, true),
            serde_json::Value::String(_) => Self::text(),
            serde_json::Value::Array(_) => Self::untyped_sequence(),
            serde_json::Value::Object(_) => Self::untyped_map(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, TypeKind::Integer { .. } | TypeKind::Float { .. })
    }

    /// The wrapped type when this is an optional
    pub fn optional_inner(&self) -> Option<&TypeDescriptor> {
        match &self.kind {
            TypeKind::Optional(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordType> {
        match &self.kind {
            TypeKind::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDescriptor({})", self.name)
    }
}

/// Rust types with a known declared-type descriptor
pub trait Typed {
    fn type_descriptor() -> TypeDescriptor;
}

macro_rules! typed_integer {
    ($($ty:ty => $bits:expr, $signed:expr;)*) => {
        $(
            impl Typed for $ty {
                fn type_descriptor() -> TypeDescriptor {
                    TypeDescriptor::integer($bits, $signed)
                }
            }
        )*
    };
}

typed_integer! {
    i8 => 8, true;
    i16 => 16, true;
    i32 => 32, true;
    i64 => 64, true;
    isize => 64, true;
    u8 => 8, false;
    u16 => 16, false;
    u32 => 32, false;
    u64 => 64, false;
    usize => 64, false;
}

impl Typed for bool {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::bool()
    }
}

impl Typed for f32 {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::float(32)
    }
}

impl Typed for f64 {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::float(64)
    }
}

impl Typed for String {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::text()
    }
}

impl<T: Typed> Typed for Option<T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::optional(T::type_descriptor())
    }
}

impl<T: Typed> Typed for Vec<T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::sequence(T::type_descriptor())
    }
}

impl<T: Typed> Typed for HashMap<String, T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::map(T::type_descriptor())
    }
}

impl<T: Typed> Typed for BTreeMap<String, T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::map(T::type_descriptor())
    }
}

impl Typed for serde_json::Value {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::any_object()
    }
}

impl Typed for serde_json::Map<String, serde_json::Value> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::untyped_map()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composed_names() {
        assert_eq!(<Option<i64>>::type_descriptor().name(), "Option<i64>");
        assert_eq!(
            <HashMap<String, Vec<u8>>>::type_descriptor().name(),
            "Map<String, Vec<u8>>"
        );
    }

    #[test]
    fn test_of_json_containers() {
        let array: serde_json::Value = serde_json::from_str("[1, 2, 3]").unwrap();
        let object: serde_json::Value = serde_json::from_str(r#"{"test": true}"#).unwrap();
        assert_eq!(TypeDescriptor::of_json(&array).kind(), &TypeKind::UntypedSequence);
        assert_eq!(TypeDescriptor::of_json(&object).kind(), &TypeKind::UntypedMap);
    }

    #[test]
    fn test_optional_inner() {
        let ty = <Option<f32>>::type_descriptor();
        assert_eq!(ty.optional_inner(), Some(&TypeDescriptor::float(32)));
        assert!(TypeDescriptor::float(32).optional_inner().is_none());
    }
}
