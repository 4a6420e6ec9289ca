//! Schema Reflector
//!
//! Runtime object-schema introspection for marshalling layers. Given an
//! object, the reflector derives an ordered, semantically typed description of
//! its properties and validates the class's directives (ignore, ignore-errors,
//! rename, transform) against the properties it actually declares.
//!
//! ## Architecture
//!
//! ```text
//! object ─► ClassInfo ─► capability chain check
//!                     ─► directive validation (directives.rs)
//!                     ─► per-property classification (classify.rs)
//!                     ─► Vec<Property> in declaration order
//! ```
//!
//! Rust has no runtime reflection, so classes describe themselves through
//! [`Reflectable::class_info`], either in code or from data-driven specs
//! ([`dynamic`]).
//!
//! ## Example
//!
//! ```
//! use schema_reflector::{ClassInfo, PropertyType, Reflectable, Reflector};
//!
//! #[derive(Default)]
//! struct User;
//!
//! impl Reflectable for User {
//!     fn class_info(&self) -> ClassInfo {
//!         ClassInfo::new("User")
//!             .typed::<String>("name")
//!             .typed::<Vec<i64>>("scores")
//!             .mapped([("name", "display_name")])
//!     }
//! }
//!
//! let properties = Reflector::new().reflect(&User).unwrap();
//! assert_eq!(properties[0].external_name, "display_name");
//! assert_eq!(properties[1].property_type, PropertyType::array(PropertyType::Number));
//! ```

pub mod checksum;
pub mod class;
pub mod classify;
pub mod config;
pub mod directives;
pub mod dynamic;
pub mod error;
pub mod property;
pub mod reflector;
pub mod transformer;
pub mod types;
pub mod value;

pub use checksum::Checksum;
pub use class::{
    Access, Bridging, Capability, ClassInfo, DirectiveSet, Directives, PropertyDescriptor,
    Reflectable, ROOT_CLASS_NAME,
};
pub use classify::{classify, Classification, TypeClassifier};
pub use config::{OutputFormat, ReflectorConfig};
pub use dynamic::{load_specs, ClassSpec, DynamicObject, PropertySpec, SpecCatalog, TypeExpr};
pub use error::{AccessError, ReflectionError, Result, SpecError, TransformError};
pub use property::{Property, PropertyType};
pub use reflector::Reflector;
pub use transformer::{
    transform_nested, ReflectableTransformer, TransformDirection, TransformerHandle,
    TransformerRegistry, ValueTransformer,
};
pub use types::{Factory, RecordType, TypeDescriptor, TypeKind, Typed};
pub use value::Value;
