//! Class descriptors
//!
//! A [`ClassInfo`] is the explicit property table a type author supplies in
//! place of runtime reflection: the class name, where it sits relative to the
//! reflectable root, its own properties in declaration order, and the
//! directives customizing how those properties are exposed.

use serde::{Deserialize, Serialize};

use crate::error::AccessError;
use crate::transformer::TransformerHandle;
use crate::types::{TypeDescriptor, Typed};
use crate::value::Value;

/// Name of the recognized capability root class
pub const ROOT_CLASS_NAME: &str = "Reflection";

/// How a class holds the reflectable capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// The capability root itself
    Root,
    /// Declares the capability directly, outside the root's hierarchy
    Adopted,
    /// Gains the capability from its superclass
    Inherited,
    /// Not reflectable
    None,
}

impl Capability {
    pub fn is_reflectable(self) -> bool {
        !matches!(self, Capability::None)
    }
}

/// Property mutability as seen by dynamic access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    #[default]
    ReadWrite,
    ReadOnly,
}

/// How a property is exposed to dynamic get/set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bridging {
    /// Accessible; primitive numbers are stored unboxed
    #[default]
    Native,
    /// Accessible; numbers are stored boxed and may be absent
    Boxed,
    /// Not reachable through dynamic access at all
    Unavailable,
}

/// One declared property
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    pub name: String,
    pub declared: TypeDescriptor,
    pub access: Access,
    pub bridging: Bridging,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, declared: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            declared,
            access: Access::ReadWrite,
            bridging: Bridging::Native,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.access = Access::ReadOnly;
        self
    }

    pub fn bridging(mut self, bridging: Bridging) -> Self {
        self.bridging = bridging;
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.access == Access::ReadOnly
    }

    pub fn is_bridgable(&self) -> bool {
        self.bridging != Bridging::Unavailable
    }
}

/// Per-class directives as declared
///
/// A collection left as `None` is inherited from the nearest ancestor that
/// declares it; a declared collection, even an empty one, overrides.
#[derive(Debug, Clone, Default)]
pub struct Directives {
    pub ignored: Option<Vec<String>>,
    pub ignore_errors: Option<Vec<String>>,
    pub mapped: Option<Vec<(String, String)>>,
    pub transformed: Option<Vec<(String, TransformerHandle)>>,
}

/// Directives after inheritance has been resolved
#[derive(Debug, Clone, Default)]
pub struct DirectiveSet {
    pub ignored: Vec<String>,
    pub ignore_errors: Vec<String>,
    pub mapped: Vec<(String, String)>,
    pub transformed: Vec<(String, TransformerHandle)>,
}

impl DirectiveSet {
    pub fn is_ignored(&self, property: &str) -> bool {
        self.ignored.iter().any(|name| name == property)
    }

    pub fn ignores_errors(&self, property: &str) -> bool {
        self.ignore_errors.iter().any(|name| name == property)
    }

    pub fn external_name(&self, property: &str) -> Option<&str> {
        self.mapped
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, key)| key.as_str())
    }

    pub fn transformer(&self, property: &str) -> Option<&TransformerHandle> {
        self.transformed
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, transformer)| transformer)
    }
}

/// Class descriptor
#[derive(Debug, Clone)]
pub struct ClassInfo {
    name: String,
    capability: Capability,
    superclass: Option<Box<ClassInfo>>,
    properties: Vec<PropertyDescriptor>,
    directives: Directives,
}

impl ClassInfo {
    /// A class deriving directly from the capability root
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capability: Capability::Inherited,
            superclass: Some(Box::new(Self::root())),
            properties: Vec::new(),
            directives: Directives::default(),
        }
    }

    /// The capability root class
    pub fn root() -> Self {
        Self::root_named(ROOT_CLASS_NAME)
    }

    /// A class acting as a capability root under its own name
    pub fn root_named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capability: Capability::Root,
            superclass: None,
            properties: Vec::new(),
            directives: Directives::default(),
        }
    }

    /// A class that declares the capability itself and has no superclass
    pub fn adopting(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capability: Capability::Adopted,
            superclass: None,
            properties: Vec::new(),
            directives: Directives::default(),
        }
    }

    /// A class without the capability
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capability: Capability::None,
            superclass: None,
            properties: Vec::new(),
            directives: Directives::default(),
        }
    }

    /// Derive from another class, inheriting its capability
    pub fn subclass_of(mut self, parent: ClassInfo) -> Self {
        self.capability = Capability::Inherited;
        self.superclass = Some(Box::new(parent));
        self
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capability = capability;
        self
    }

    pub fn property(mut self, name: impl Into<String>, declared: TypeDescriptor) -> Self {
        self.properties.push(PropertyDescriptor::new(name, declared));
        self
    }

    pub fn typed<T: Typed>(self, name: impl Into<String>) -> Self {
        self.property(name, T::type_descriptor())
    }

    pub fn descriptor(mut self, descriptor: PropertyDescriptor) -> Self {
        self.properties.push(descriptor);
        self
    }

    pub fn ignored<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.directives.ignored = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn ignore_errors<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.directives.ignore_errors = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Declare external keys; a repeated property name keeps its last key
    pub fn mapped<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut mapped: Vec<(String, String)> = Vec::new();
        for (name, key) in pairs {
            let (name, key) = (name.into(), key.into());
            match mapped.iter_mut().find(|(existing, _)| *existing == name) {
                Some(entry) => entry.1 = key,
                None => mapped.push((name, key)),
            }
        }
        self.directives.mapped = Some(mapped);
        self
    }

    /// Attach a transformer override to one property
    pub fn transformed(mut self, name: impl Into<String>, transformer: TransformerHandle) -> Self {
        let name = name.into();
        let transformed = self.directives.transformed.get_or_insert_with(Vec::new);
        transformed.retain(|(existing, _)| *existing != name);
        transformed.push((name, transformer));
        self
    }

    pub fn with_directives(mut self, directives: Directives) -> Self {
        self.directives = directives;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn superclass(&self) -> Option<&ClassInfo> {
        self.superclass.as_deref()
    }

    /// Properties declared directly on this class, in declaration order
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn directives(&self) -> &Directives {
        &self.directives
    }

    /// Superclasses from the nearest upward
    pub fn ancestors(&self) -> impl Iterator<Item = &ClassInfo> {
        std::iter::successors(self.superclass(), |class| class.superclass())
    }

    /// Resolve each directive collection against the superclass chain
    ///
    /// Collections declared on this class are taken whole. An inherited
    /// collection keeps only the entries naming properties this class
    /// declares, since the ancestor's other properties are not reflected here.
    pub fn effective_directives(&self) -> DirectiveSet {
        DirectiveSet {
            ignored: self.resolve_directive(|d| d.ignored.as_ref(), |name| name),
            ignore_errors: self.resolve_directive(|d| d.ignore_errors.as_ref(), |name| name),
            mapped: self.resolve_directive(|d| d.mapped.as_ref(), |(name, _)| name),
            transformed: self.resolve_directive(|d| d.transformed.as_ref(), |(name, _)| name),
        }
    }

    fn resolve_directive<T: Clone>(
        &self,
        pick: impl Fn(&Directives) -> Option<&Vec<T>>,
        property_of: impl Fn(&T) -> &String,
    ) -> Vec<T> {
        if let Some(own) = pick(&self.directives) {
            return own.clone();
        }
        self.ancestors()
            .find_map(|ancestor| pick(&ancestor.directives))
            .map(|inherited| {
                inherited
                    .iter()
                    .filter(|entry| self.declares(property_of(*entry)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn declares(&self, property: &str) -> bool {
        self.properties.iter().any(|p| p.name == property)
    }
}

/// A type the reflector may introspect
///
/// `class_info` plays the property-enumeration role; `value` and `set_value`
/// are the dynamic access mechanism. Classes without dynamic storage can rely
/// on the defaults.
pub trait Reflectable: Send + 'static {
    fn class_info(&self) -> ClassInfo;

    fn value(&self, _property: &str) -> Option<Value> {
        None
    }

    fn set_value(&mut self, property: &str, _value: Value) -> Result<(), AccessError> {
        Err(AccessError::UnknownProperty(property.to_string()))
    }
}
