//! Reflection error taxonomy

use schema_reflector::{
    Bridging, ClassInfo, PropertyDescriptor, PropertyType, Reflectable, ReflectableTransformer,
    ReflectionError, Reflector, TransformDirection, TransformError, TransformerHandle,
    TypeDescriptor, Typed, Value, ValueTransformer,
};

/// Wraps a class descriptor so each test can declare its own class inline
struct Declared(ClassInfo);

impl Reflectable for Declared {
    fn class_info(&self) -> ClassInfo {
        self.0.clone()
    }
}

fn reflect(class: ClassInfo) -> Result<Vec<schema_reflector::Property>, ReflectionError> {
    Reflector::new().reflect(&Declared(class))
}

#[derive(Debug)]
struct DummyTransformer;

impl ValueTransformer for DummyTransformer {
    fn supports_type(&self, _target_type: &TypeDescriptor) -> bool {
        true
    }

    fn supports_value(&self, _: &Value, _: &TypeDescriptor, _: TransformDirection) -> bool {
        true
    }

    fn transform(
        &self,
        value: Value,
        _: &TypeDescriptor,
        _: TransformDirection,
    ) -> Result<Value, TransformError> {
        Ok(value)
    }
}

#[test]
fn test_unsupported_base_class() {
    // Deriving from a class that adopted the capability itself is rejected
    let object1 = ClassInfo::adopting("Object1");
    let object2 = ClassInfo::new("Object2").subclass_of(object1);
    match reflect(object2) {
        Err(ReflectionError::UnsupportedBaseClass { type_name }) => assert_eq!(type_name, "Object1"),
        other => panic!("Expected UnsupportedBaseClass, got {:?}", other),
    }

    // Deriving through the root's hierarchy is fine
    let object3 = ClassInfo::new("Object3");
    let object4 = ClassInfo::new("Object4").subclass_of(object3);
    assert!(reflect(object4).is_ok());

    // Adopting directly, without deriving, is fine too
    assert!(reflect(ClassInfo::adopting("Object5")).is_ok());
}

#[test]
fn test_cannot_ignore_non_existant_property() {
    let class = ClassInfo::adopting("Object1").ignored(["does_not_exist"]);
    assert_eq!(
        reflect(class).unwrap_err(),
        ReflectionError::CannotIgnoreNonExistantProperty {
            property: "does_not_exist".into(),
            class: "Object1".into(),
        }
    );
}

#[test]
fn test_cannot_ignore_errors_for_non_existant_property() {
    let class = ClassInfo::adopting("Object1").ignore_errors(["does_not_exist"]);
    assert_eq!(
        reflect(class).unwrap_err(),
        ReflectionError::CannotIgnoreErrorsForNonExistantProperty {
            property: "does_not_exist".into(),
            class: "Object1".into(),
        }
    );
}

#[test]
fn test_cannot_map_and_ignore_property() {
    let class = ClassInfo::adopting("Object1")
        .typed::<bool>("someProperty")
        .mapped([("someProperty", "someProperty")])
        .ignored(["someProperty"]);
    assert_eq!(
        reflect(class).unwrap_err(),
        ReflectionError::CannotMapAndIgnoreProperty {
            property: "someProperty".into(),
            class: "Object1".into(),
        }
    );
}

#[test]
fn test_map_and_ignore_wins_over_unsupported_type() {
    let class = ClassInfo::adopting("Object1")
        .property("blob", TypeDescriptor::opaque("Data"))
        .mapped([("blob", "b")])
        .ignored(["blob"]);
    assert!(matches!(
        reflect(class),
        Err(ReflectionError::CannotMapAndIgnoreProperty { .. })
    ));
}

#[test]
fn test_cannot_transform_and_ignore_property() {
    let class = ClassInfo::adopting("Object1")
        .typed::<bool>("someProperty")
        .transformed("someProperty", TransformerHandle::new(DummyTransformer))
        .ignored(["someProperty"]);
    assert_eq!(
        reflect(class).unwrap_err(),
        ReflectionError::CannotTransformAndIgnoreProperty {
            property: "someProperty".into(),
            class: "Object1".into(),
        }
    );
}

#[test]
fn test_cannot_map_non_existant_property() {
    let class = ClassInfo::adopting("Object1").mapped([("does_not_exist", "something_else")]);
    assert_eq!(
        reflect(class).unwrap_err(),
        ReflectionError::CannotMapNonExistantProperty {
            property: "does_not_exist".into(),
            class: "Object1".into(),
        }
    );
}

#[test]
fn test_cannot_transform_non_existant_property() {
    let class = ClassInfo::adopting("Object1")
        .transformed("does_not_exist", TransformerHandle::new(ReflectableTransformer::new()));
    assert_eq!(
        reflect(class).unwrap_err(),
        ReflectionError::CannotTransformNonExistantProperty {
            property: "does_not_exist".into(),
            class: "Object1".into(),
        }
    );
}

#[test]
fn test_mapped_property_conflict() {
    let class = ClassInfo::adopting("Object1")
        .typed::<String>("test1")
        .typed::<Vec<serde_json::Value>>("test2")
        .mapped([("test1", "conflict_test"), ("test2", "conflict_test")]);
    match reflect(class) {
        Err(ReflectionError::MappedPropertyConflict {
            mut properties,
            conflict_key,
            class,
        }) => {
            properties.sort();
            assert_eq!(properties, vec!["test1", "test2"]);
            assert_eq!(conflict_key, "conflict_test");
            assert_eq!(class, "Object1");
        }
        other => panic!("Expected MappedPropertyConflict, got {:?}", other),
    }
}

#[test]
fn test_unsupported_property_value_type() {
    let class = ClassInfo::adopting("Object1").property("test", TypeDescriptor::opaque("Data"));
    match reflect(class) {
        Err(ReflectionError::UnsupportedPropertyValueType {
            property,
            value_type,
            class,
        }) => {
            assert_eq!(property, "test");
            assert_eq!(value_type, TypeDescriptor::opaque("Data"));
            assert_eq!(class, "Object1");
        }
        other => panic!("Expected UnsupportedPropertyValueType, got {:?}", other),
    }
}

#[test]
fn test_optional_primitive_number_not_bridgable() {
    let class = ClassInfo::adopting("Object1").typed::<Option<i64>>("test");
    assert_eq!(
        reflect(class).unwrap_err(),
        ReflectionError::OptionalPrimitiveNumberNotBridgable {
            property: "test".into(),
            class: "Object1".into(),
        }
    );
}

#[test]
fn test_property_not_bridgable() {
    let class = ClassInfo::adopting("Object1").descriptor(
        PropertyDescriptor::new("test", bool::type_descriptor()).bridging(Bridging::Unavailable),
    );
    match reflect(class) {
        Err(ReflectionError::PropertyNotBridgable {
            property,
            value_type,
            class,
        }) => {
            assert_eq!(property, "test");
            assert_eq!(value_type, TypeDescriptor::bool());
            assert_eq!(class, "Object1");
        }
        other => panic!("Expected PropertyNotBridgable, got {:?}", other),
    }
}

#[test]
fn test_read_only_property() {
    let class = ClassInfo::adopting("Object1")
        .descriptor(PropertyDescriptor::new("test", bool::type_descriptor()).read_only());
    assert_eq!(
        reflect(class).unwrap_err(),
        ReflectionError::ReadOnlyProperty {
            property: "test".into(),
            class: "Object1".into(),
        }
    );
}

#[test]
fn test_no_properties() {
    let properties = reflect(ClassInfo::adopting("Object1")).unwrap();
    assert!(properties.is_empty());
}

#[test]
fn test_ignore_errors_omits_failing_property() {
    let class = ClassInfo::adopting("Object1")
        .typed::<String>("name")
        .descriptor(PropertyDescriptor::new("locked", bool::type_descriptor()).read_only())
        .property("blob", TypeDescriptor::opaque("Data"))
        .typed::<bool>("flag")
        .ignore_errors(["locked", "blob", "flag"]);

    let properties = reflect(class).unwrap();
    let names: Vec<&str> = properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["name", "flag"]);
    assert!(!properties[0].suppress_errors);
    assert!(properties[1].suppress_errors);
}

#[test]
fn test_ignored_property_is_never_checked() {
    let class = ClassInfo::adopting("Object1")
        .typed::<String>("name")
        .descriptor(PropertyDescriptor::new("locked", bool::type_descriptor()).read_only())
        .ignored(["locked"]);
    let properties = reflect(class).unwrap();
    assert_eq!(properties.len(), 1);
    assert_eq!(properties[0].name, "name");
}

#[test]
fn test_first_failing_property_in_declaration_order() {
    let class = ClassInfo::adopting("Object1")
        .typed::<Option<f64>>("ratio")
        .descriptor(PropertyDescriptor::new("locked", bool::type_descriptor()).read_only());
    assert!(matches!(
        reflect(class),
        Err(ReflectionError::OptionalPrimitiveNumberNotBridgable { property, .. }) if property == "ratio"
    ));
}

#[test]
fn test_mapping_sets_external_name() {
    let class = ClassInfo::adopting("Object1")
        .typed::<String>("first_name")
        .typed::<i32>("age")
        .mapped([("first_name", "firstName")]);
    let properties = reflect(class).unwrap();
    assert_eq!(properties[0].external_name, "firstName");
    assert_eq!(properties[1].external_name, "age");
}

#[test]
fn test_transformer_override_claims_property() {
    let class = ClassInfo::adopting("Object1")
        .property("created", TypeDescriptor::opaque("Date"))
        .transformed("created", TransformerHandle::new(DummyTransformer));
    let properties = reflect(class).unwrap();
    assert_eq!(
        properties[0].property_type,
        PropertyType::transformable(
            TransformerHandle::new(DummyTransformer),
            TypeDescriptor::opaque("Date")
        )
    );
}

#[test]
fn test_subclass_inherits_directives() {
    let parent = ClassInfo::new("Parent").typed::<String>("name");
    let child = ClassInfo::new("Child")
        .subclass_of(parent.mapped([("name", "n")]))
        .typed::<String>("name");
    let properties = reflect(child).unwrap();
    assert_eq!(properties[0].external_name, "n");
}

#[test]
fn test_errors_name_their_property() {
    let err = reflect(ClassInfo::adopting("Object1").ignored(["ghost"])).unwrap_err();
    assert_eq!(err.property(), Some("ghost"));
    assert!(err.to_string().contains("ghost"));
}

#[test]
fn test_subclass_without_parent_properties_drops_inherited_entries() {
    let parent = ClassInfo::new("Parent")
        .typed::<String>("secret")
        .ignored(["secret"])
        .mapped([("secret", "s")]);
    let child = ClassInfo::new("Child").subclass_of(parent).typed::<String>("name");

    let properties = reflect(child).unwrap();
    assert_eq!(properties.len(), 1);
    assert_eq!(properties[0].name, "name");
    assert_eq!(properties[0].external_name, "name");
}

#[test]
fn test_subclass_own_directives_still_checked() {
    let parent = ClassInfo::new("Parent").typed::<String>("secret");
    let child = ClassInfo::new("Child")
        .subclass_of(parent)
        .typed::<String>("name")
        .ignored(["secret"]);
    assert_eq!(
        reflect(child).unwrap_err(),
        ReflectionError::CannotIgnoreNonExistantProperty {
            property: "secret".into(),
            class: "Child".into(),
        }
    );
}

#[test]
fn test_ignore_errors_omits_unbridgable_property() {
    let class = ClassInfo::adopting("Object1")
        .typed::<String>("name")
        .descriptor(
            PropertyDescriptor::new("hidden", bool::type_descriptor()).bridging(Bridging::Unavailable),
        )
        .ignore_errors(["hidden"]);
    let properties = reflect(class).unwrap();
    let names: Vec<&str> = properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["name"]);
}

#[test]
fn test_map_and_ignore_reported_before_transform_and_ignore() {
    let class = ClassInfo::adopting("Object1")
        .typed::<bool>("someProperty")
        .mapped([("someProperty", "other")])
        .transformed("someProperty", TransformerHandle::new(DummyTransformer))
        .ignored(["someProperty"]);
    assert!(matches!(
        reflect(class),
        Err(ReflectionError::CannotMapAndIgnoreProperty { property, .. }) if property == "someProperty"
    ));
}

#[test]
fn test_missing_mapped_reported_before_missing_transformed() {
    let class = ClassInfo::adopting("Object1")
        .mapped([("ghost_mapped", "g")])
        .transformed("ghost_transformed", TransformerHandle::new(DummyTransformer));
    assert!(matches!(
        reflect(class),
        Err(ReflectionError::CannotMapNonExistantProperty { property, .. }) if property == "ghost_mapped"
    ));
}

#[test]
fn test_transform_and_ignore_reported_before_conflict() {
    let class = ClassInfo::adopting("Object1")
        .typed::<bool>("a")
        .typed::<bool>("b")
        .typed::<bool>("c")
        .mapped([("a", "key"), ("b", "key")])
        .transformed("c", TransformerHandle::new(DummyTransformer))
        .ignored(["c"]);
    assert!(matches!(
        reflect(class),
        Err(ReflectionError::CannotTransformAndIgnoreProperty { property, .. }) if property == "c"
    ));
}

#[test]
fn test_mapped_key_taken_by_unmapped_property() {
    let class = ClassInfo::adopting("Object1")
        .typed::<String>("a")
        .typed::<String>("b")
        .mapped([("a", "b")]);
    match reflect(class) {
        Err(ReflectionError::MappedPropertyConflict {
            properties,
            conflict_key,
            ..
        }) => {
            assert_eq!(properties, vec!["a", "b"]);
            assert_eq!(conflict_key, "b");
        }
        other => panic!("Expected MappedPropertyConflict, got {:?}", other),
    }
}

#[test]
fn test_optional_container_of_optional_numbers() {
    let class = ClassInfo::adopting("Object1").typed::<Option<Vec<Option<i64>>>>("scores");
    let properties = reflect(class).unwrap();
    assert_eq!(
        properties[0].property_type,
        PropertyType::optional(PropertyType::array(PropertyType::optional(PropertyType::Number)))
    );
}
