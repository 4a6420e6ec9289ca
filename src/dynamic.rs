//! Data-driven classes
//!
//! Classes can be declared in JSON or TOML instead of Rust code. A
//! [`SpecCatalog`] holds the loaded [`ClassSpec`]s, resolves `record:Name`
//! references between them, and builds [`DynamicObject`]s whose property
//! values live in a JSON map.
//!
//! ## Example spec (TOML)
//! ```toml
//! name = "User"
//! ignored = ["cache"]
//! mapped = { display_name = "displayName" }
//!
//! [[properties]]
//! name = "display_name"
//! type = "string"
//!
//! [[properties]]
//! name = "friends"
//! type = "[record:User]"
//!
//! [[properties]]
//! name = "cache"
//! type = "opaque:Cache"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::class::{Bridging, Capability, ClassInfo, Directives, PropertyDescriptor, Reflectable};
use crate::error::{AccessError, SpecError, TransformError};
use crate::transformer::{ReflectableTransformer, TransformDirection, TransformerRegistry, ValueTransformer};
use crate::types::{Factory, RecordType, TypeDescriptor, TypeKind};
use crate::value::Value;

// =============================================================================
// Type Expressions
// =============================================================================

/// Textual declared type, e.g. `"{string: [int?]}"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeExpr {
    Bool,
    Integer { bits: u8, signed: bool },
    Float { bits: u8 },
    Text,
    Any,
    UntypedArray,
    UntypedObject,
    Optional(Box<TypeExpr>),
    Array(Box<TypeExpr>),
    Dictionary(Box<TypeExpr>),
    Opaque(String),
    Record(String),
}

impl TypeExpr {
    pub fn parse(expr: &str) -> Result<Self, SpecError> {
        let trimmed = expr.trim();
        let invalid = |reason: &str| SpecError::InvalidType {
            expr: expr.to_string(),
            reason: reason.to_string(),
        };

        if trimmed.is_empty() {
            return Err(invalid("empty type"));
        }

        if let Some(inner) = trimmed.strip_suffix('?') {
            return Ok(TypeExpr::Optional(Box::new(Self::parse(inner)?)));
        }

        if let Some(inner) = trimmed.strip_prefix('[') {
            let inner = inner.strip_suffix(']').ok_or_else(|| invalid("unclosed '['"))?;
            return Ok(TypeExpr::Array(Box::new(Self::parse(inner)?)));
        }

        if let Some(inner) = trimmed.strip_prefix('{') {
            let inner = inner.strip_suffix('}').ok_or_else(|| invalid("unclosed '{'"))?;
            let (key, value) = inner
                .split_once(':')
                .ok_or_else(|| invalid("dictionary needs 'string: <type>'"))?;
            if key.trim() != "string" {
                return Err(invalid("dictionary keys must be string"));
            }
            return Ok(TypeExpr::Dictionary(Box::new(Self::parse(value)?)));
        }

        if let Some(name) = trimmed.strip_prefix("record:") {
            return Ok(TypeExpr::Record(name.trim().to_string()));
        }

        if let Some(name) = trimmed.strip_prefix("opaque:") {
            return Ok(TypeExpr::Opaque(name.trim().to_string()));
        }

        Ok(match trimmed {
            "bool" => TypeExpr::Bool,
            "int" => TypeExpr::Integer { bits: 64, signed: true },
            "i8" => TypeExpr::Integer { bits: 8, signed: true },
            "i16" => TypeExpr::Integer { bits: 16, signed: true },
            "i32" => TypeExpr::Integer { bits: 32, signed: true },
            "i64" => TypeExpr::Integer { bits: 64, signed: true },
            "u8" => TypeExpr::Integer { bits: 8, signed: false },
            "u16" => TypeExpr::Integer { bits: 16, signed: false },
            "u32" => TypeExpr::Integer { bits: 32, signed: false },
            "u64" => TypeExpr::Integer { bits: 64, signed: false },
            "float" | "f32" => TypeExpr::Float { bits: 32 },
            "double" | "f64" => TypeExpr::Float { bits: 64 },
            "string" => TypeExpr::Text,
            "any" => TypeExpr::Any,
            "array" => TypeExpr::UntypedArray,
            "object" => TypeExpr::UntypedObject,
            _ => return Err(invalid("unknown type name")),
        })
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Bool => f.write_str("bool"),
            TypeExpr::Integer { bits, signed } => {
                write!(f, "{}{}", if *signed { 'i' } else { 'u' }, bits)
            }
            TypeExpr::Float { bits } => write!(f, "f{bits}"),
            TypeExpr::Text => f.write_str("string"),
            TypeExpr::Any => f.write_str("any"),
            TypeExpr::UntypedArray => f.write_str("array"),
            TypeExpr::UntypedObject => f.write_str("object"),
            TypeExpr::Optional(inner) => write!(f, "{inner}?"),
            TypeExpr::Array(element) => write!(f, "[{element}]"),
            TypeExpr::Dictionary(value) => write!(f, "{{string: {value}}}"),
            TypeExpr::Opaque(name) => write!(f, "opaque:{name}"),
            TypeExpr::Record(name) => write!(f, "record:{name}"),
        }
    }
}

impl TryFrom<String> for TypeExpr {
    type Error = SpecError;

    fn try_from(expr: String) -> Result<Self, Self::Error> {
        Self::parse(&expr)
    }
}

impl From<TypeExpr> for String {
    fn from(expr: TypeExpr) -> Self {
        expr.to_string()
    }
}

// =============================================================================
// Class Specs
// =============================================================================

/// A property declared in a spec file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySpec {
    pub name: String,
    #[serde(rename = "type")]
    pub type_expr: TypeExpr,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub bridging: Bridging,
}

/// A class declared in a spec file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSpec {
    pub name: String,

    #[serde(default = "default_capability")]
    pub capability: Capability,

    /// Superclass, declared inline
    #[serde(default)]
    pub superclass: Option<Box<ClassSpec>>,

    #[serde(default)]
    pub properties: Vec<PropertySpec>,

    #[serde(default)]
    pub ignored: Option<Vec<String>>,

    #[serde(default)]
    pub ignore_errors: Option<Vec<String>>,

    /// Property name to external key
    #[serde(default)]
    pub mapped: Option<BTreeMap<String, String>>,

    /// Property name to transformer kind
    #[serde(default)]
    pub transformed: Option<BTreeMap<String, String>>,
}

fn default_capability() -> Capability {
    Capability::Inherited
}

/// A spec file holds either one class or a `classes` list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SpecFile {
    Many { classes: Vec<ClassSpec> },
    One(ClassSpec),
}

/// Read class specs from a `.json` or `.toml` file
pub fn load_specs(path: &Path) -> Result<Vec<ClassSpec>, SpecError> {
    let content = std::fs::read_to_string(path)?;
    let file: SpecFile = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&content)?,
        Some("toml") => toml::from_str(&content)?,
        _ => return Err(SpecError::UnsupportedFormat(path.display().to_string())),
    };

    let specs = match file {
        SpecFile::Many { classes } => classes,
        SpecFile::One(spec) => vec![spec],
    };
    debug!(path = %path.display(), classes = specs.len(), "Loaded class specs");
    Ok(specs)
}

// =============================================================================
// Catalog
// =============================================================================

/// Loaded class specs plus the transformers their directives may name
#[derive(Debug, Clone, Default)]
pub struct SpecCatalog {
    specs: BTreeMap<String, Arc<ClassSpec>>,
    transformers: TransformerRegistry,
}

impl SpecCatalog {
    pub fn new(transformers: TransformerRegistry) -> Self {
        Self {
            specs: BTreeMap::new(),
            transformers,
        }
    }

    /// Add a spec; transformer kinds are checked here so class building cannot fail later
    pub fn insert(&mut self, spec: ClassSpec) -> Result<(), SpecError> {
        self.check_transformers(&spec)?;
        if self.specs.contains_key(&spec.name) {
            warn!(class = %spec.name, "Replacing previously loaded class spec");
        }
        self.specs.insert(spec.name.clone(), Arc::new(spec));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ClassSpec> {
        self.specs.get(name).map(Arc::as_ref)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn transformers(&self) -> &TransformerRegistry {
        &self.transformers
    }

    /// Build a fresh object for a named class
    pub fn instantiate(self: &Arc<Self>, name: &str) -> Result<DynamicObject, SpecError> {
        let spec = self
            .specs
            .get(name)
            .cloned()
            .ok_or_else(|| SpecError::UnknownClass(name.to_string()))?;
        let class_info = self.class_info_for(&spec);
        Ok(DynamicObject {
            class_info,
            values: BTreeMap::new(),
            transformers: self.transformers.clone(),
        })
    }

    fn check_transformers(&self, spec: &ClassSpec) -> Result<(), SpecError> {
        if let Some(transformed) = &spec.transformed {
            for (property, kind) in transformed {
                if self.transformers.by_kind(kind).is_none() {
                    return Err(SpecError::UnknownTransformer {
                        class: spec.name.clone(),
                        property: property.clone(),
                        kind: kind.clone(),
                    });
                }
            }
        }
        match &spec.superclass {
            Some(parent) => self.check_transformers(parent),
            None => Ok(()),
        }
    }

    fn class_info_for(self: &Arc<Self>, spec: &ClassSpec) -> ClassInfo {
        let mut info = match spec.capability {
            Capability::Root => ClassInfo::root_named(&spec.name),
            Capability::Adopted => ClassInfo::adopting(&spec.name),
            Capability::Inherited => ClassInfo::new(&spec.name),
            Capability::None => ClassInfo::plain(&spec.name),
        };
        if let Some(parent) = &spec.superclass {
            info = info
                .subclass_of(self.class_info_for(parent))
                .with_capability(spec.capability);
        }

        for property in &spec.properties {
            let mut descriptor = PropertyDescriptor::new(&property.name, self.resolve(&property.type_expr))
                .bridging(property.bridging);
            if property.read_only {
                descriptor = descriptor.read_only();
            }
            info = info.descriptor(descriptor);
        }

        let transformed = spec.transformed.as_ref().map(|transformed| {
            transformed
                .iter()
                .filter_map(|(property, kind)| {
                    let handle = self.transformers.by_kind(kind)?;
                    Some((property.clone(), handle.clone()))
                })
                .collect()
        });

        info.with_directives(Directives {
            ignored: spec.ignored.clone(),
            ignore_errors: spec.ignore_errors.clone(),
            mapped: spec
                .mapped
                .as_ref()
                .map(|mapped| mapped.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
            transformed,
        })
    }

    /// Turn a type expression into a declared type
    pub fn resolve(self: &Arc<Self>, expr: &TypeExpr) -> TypeDescriptor {
        match expr {
            TypeExpr::Bool => TypeDescriptor::bool(),
            TypeExpr::Integer { bits, signed } => TypeDescriptor::integer(*bits, *signed),
            TypeExpr::Float { bits } => TypeDescriptor::float(*bits),
            TypeExpr::Text => TypeDescriptor::text(),
            TypeExpr::Any => TypeDescriptor::any_object(),
            TypeExpr::UntypedArray => TypeDescriptor::untyped_sequence(),
            TypeExpr::UntypedObject => TypeDescriptor::untyped_map(),
            TypeExpr::Optional(inner) => TypeDescriptor::optional(self.resolve(inner)),
            TypeExpr::Array(element) => TypeDescriptor::sequence(self.resolve(element)),
            TypeExpr::Dictionary(value) => TypeDescriptor::map(self.resolve(value)),
            TypeExpr::Opaque(name) => TypeDescriptor::opaque(name),
            TypeExpr::Record(name) => self.record(name),
        }
    }

    fn record(self: &Arc<Self>, name: &str) -> TypeDescriptor {
        let Some(spec) = self.specs.get(name) else {
            return TypeDescriptor::new(name, TypeKind::Record(RecordType::new(Capability::None)));
        };

        let catalog = Arc::clone(self);
        let target = name.to_string();
        let factory: Factory = Arc::new(move || {
            let object = catalog
                .instantiate(&target)
                .unwrap_or_else(|_| DynamicObject::detached(&target));
            Box::new(object) as Box<dyn Reflectable>
        });

        TypeDescriptor::new(
            name,
            TypeKind::Record(RecordType::new(spec.capability).with_factory(factory)),
        )
    }
}

// =============================================================================
// Dynamic Objects
// =============================================================================

/// Object backed by a class spec, storing values as JSON
///
/// Nested objects are stored in dictionary form, converted with the
/// transformers of the catalog that built the object.
#[derive(Debug, Clone)]
pub struct DynamicObject {
    class_info: ClassInfo,
    values: BTreeMap<String, serde_json::Value>,
    transformers: TransformerRegistry,
}

impl DynamicObject {
    /// Placeholder for a class missing from its catalog; it fails reflection
    fn detached(name: &str) -> Self {
        Self {
            class_info: ClassInfo::plain(name),
            values: BTreeMap::new(),
            transformers: TransformerRegistry::default(),
        }
    }

    pub fn get_json(&self, property: &str) -> Option<&serde_json::Value> {
        self.values.get(property)
    }

    pub fn values(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.values
    }

    fn descriptor(&self, property: &str) -> Option<&PropertyDescriptor> {
        self.class_info
            .properties()
            .iter()
            .find(|descriptor| descriptor.name == property)
    }
}

impl Reflectable for DynamicObject {
    fn class_info(&self) -> ClassInfo {
        self.class_info.clone()
    }

    fn value(&self, property: &str) -> Option<Value> {
        self.values.get(property).cloned().map(Value::from)
    }

    fn set_value(&mut self, property: &str, value: Value) -> Result<(), AccessError> {
        let descriptor = self
            .descriptor(property)
            .ok_or_else(|| AccessError::UnknownProperty(property.to_string()))?;
        if descriptor.is_read_only() {
            return Err(AccessError::ReadOnly(property.to_string()));
        }

        let flattener = ReflectableTransformer::bound_to(&self.transformers);
        let json = flatten_objects(&flattener, value)
            .and_then(Value::into_json)
            .map_err(|_| AccessError::TypeMismatch {
                property: property.to_string(),
                expected: "a JSON-representable value".to_string(),
            })?;
        self.values.insert(property.to_string(), json);
        Ok(())
    }
}

/// Replace nested objects with their dictionary form
fn flatten_objects(flattener: &ReflectableTransformer, value: Value) -> Result<Value, TransformError> {
    match value {
        Value::Object(object) => {
            let target = TypeDescriptor::any_object();
            let dictionary =
                flattener.transform(Value::Object(object), &target, TransformDirection::Backwards)?;
            flatten_objects(flattener, dictionary)
        }
        Value::Array(items) => items
            .into_iter()
            .map(|item| flatten_objects(flattener, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Dictionary(entries) => entries
            .into_iter()
            .map(|(key, item)| flatten_objects(flattener, item).map(|item| (key, item)))
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Value::Dictionary),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_expressions() {
        let expr = TypeExpr::parse("{string: [int?]}?").unwrap();
        assert_eq!(
            expr,
            TypeExpr::Optional(Box::new(TypeExpr::Dictionary(Box::new(TypeExpr::Array(
                Box::new(TypeExpr::Optional(Box::new(TypeExpr::Integer { bits: 64, signed: true })))
            )))))
        );
        assert_eq!(expr.to_string(), "{string: [i64?]}?");
    }

    #[test]
    fn test_parse_rejects_bad_expressions() {
        assert!(matches!(TypeExpr::parse("[int"), Err(SpecError::InvalidType { .. })));
        assert!(matches!(TypeExpr::parse("{int: bool}"), Err(SpecError::InvalidType { .. })));
        assert!(matches!(TypeExpr::parse("quaternion"), Err(SpecError::InvalidType { .. })));
        assert!(matches!(TypeExpr::parse(""), Err(SpecError::InvalidType { .. })));
    }

    #[test]
    fn test_unknown_transformer_rejected_on_insert() {
        let spec: ClassSpec = serde_json::from_value(serde_json::json!({
            "name": "Object1",
            "properties": [{"name": "when", "type": "string"}],
            "transformed": {"when": "date"}
        }))
        .unwrap();
        let mut catalog = SpecCatalog::default();
        let err = catalog.insert(spec).unwrap_err();
        assert!(matches!(err, SpecError::UnknownTransformer { kind, .. } if kind == "date"));
    }

    #[test]
    fn test_unknown_record_is_not_reflectable() {
        let catalog = Arc::new(SpecCatalog::default());
        let ty = catalog.resolve(&TypeExpr::Record("Missing".into()));
        assert_eq!(ty.as_record().map(|r| r.capability()), Some(Capability::None));
    }

    #[test]
    fn test_set_value_respects_read_only() {
        let spec: ClassSpec = serde_json::from_value(serde_json::json!({
            "name": "Object1",
            "properties": [{"name": "id", "type": "string", "read_only": true}]
        }))
        .unwrap();
        let mut catalog = SpecCatalog::default();
        catalog.insert(spec).unwrap();
        let catalog = Arc::new(catalog);

        let mut object = catalog.instantiate("Object1").unwrap();
        let err = object.set_value("id", Value::from("x")).unwrap_err();
        assert_eq!(err, AccessError::ReadOnly("id".into()));
        assert!(object.set_value("nope", Value::Null).is_err());
    }
}
