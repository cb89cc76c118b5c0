//! End-to-end attribute resolution over encoded class files

use std::sync::Arc;

use strata_classfile::{AnnotationDef, BytecodeWriter, ClassFile, FieldDef, MethodDef};
use strata_model::{
    markers, AccessKind, DescriptorRegistry, FixtureSource, MemberKind, ModelError,
};

fn field(name: &str, type_name: &str, annotations: Vec<AnnotationDef>) -> FieldDef {
    FieldDef {
        name: name.to_string(),
        type_name: type_name.to_string(),
        annotations,
    }
}

fn getter(name: &str, type_name: &str, annotations: Vec<AnnotationDef>) -> MethodDef {
    MethodDef {
        name: name.to_string(),
        param_count: 0,
        returns_value: true,
        type_name: type_name.to_string(),
        annotations,
        code: Vec::new(),
    }
}

fn setter(name: &str, type_name: &str) -> MethodDef {
    MethodDef {
        name: name.to_string(),
        param_count: 1,
        returns_value: false,
        type_name: type_name.to_string(),
        annotations: Vec::new(),
        code: Vec::new(),
    }
}

/// A getter whose compiled body loads `self`, reads `field`, and returns it.
fn getter_reading(class: &mut ClassFile, name: &str, field: &str) -> MethodDef {
    let index = class.pool.intern(field);
    let mut writer = BytecodeWriter::new();
    writer.emit_load_local_0();
    writer.emit_load_field(index);
    writer.emit_return();
    MethodDef {
        name: name.to_string(),
        param_count: 0,
        returns_value: true,
        type_name: "String".to_string(),
        annotations: Vec::new(),
        code: writer.into_bytes(),
    }
}

fn registry_with(classes: &[&ClassFile]) -> DescriptorRegistry {
    let mut source = FixtureSource::new();
    for class in classes {
        source.add(class);
    }
    DescriptorRegistry::new(Box::new(source))
}

#[test]
fn test_plain_field_entity() {
    // Identifier on a field, no overrides anywhere: everything resolves to
    // direct field access and each attribute is its own storage field.
    let mut class = ClassFile::new("com.example.Person");
    class
        .fields
        .push(field("id", "i64", vec![AnnotationDef::marker(markers::ID)]));
    class.fields.push(field("name", "String", Vec::new()));

    let registry = registry_with(&[&class]);
    let person = registry.resolve_descriptor("com.example.Person").unwrap();

    assert_eq!(person.attributes.len(), 2);
    for attribute in person.attributes.values() {
        assert_eq!(attribute.access, AccessKind::Field);
        assert!(!attribute.explicit_access);
        assert_eq!(attribute.backing.kind(), MemberKind::Field);
        assert_eq!(attribute.backing.name(), attribute.underlying_field.name);
    }
    let names: Vec<&String> = person.attributes.keys().collect();
    assert_eq!(names, ["id", "name"]);
}

#[test]
fn test_property_entity_resolves_through_getters() {
    // Identifier on the getter: the whole type resolves to property access
    // and each getter finds its field by naming convention.
    let mut class = ClassFile::new("com.example.Person");
    class.fields.push(field("id", "i64", Vec::new()));
    class.fields.push(field("name", "String", Vec::new()));
    let mut get_id = getter_reading(&mut class, "getId", "id");
    get_id.annotations.push(AnnotationDef::marker(markers::ID));
    get_id.type_name = "i64".to_string();
    class.methods.push(get_id);
    let get_name = getter_reading(&mut class, "getName", "name");
    class.methods.push(get_name);
    class.methods.push(setter("setName", "String"));

    let registry = registry_with(&[&class]);
    let person = registry.resolve_descriptor("com.example.Person").unwrap();

    assert_eq!(person.attributes.len(), 2);
    let id = person.get_persistent_attribute("id").unwrap();
    assert_eq!(id.access, AccessKind::Property);
    assert_eq!(id.backing.kind(), MemberKind::Method);
    assert_eq!(id.backing.name(), "getId");
    assert_eq!(id.underlying_field.name, "id");

    let name = person.get_persistent_attribute("name").unwrap();
    assert_eq!(name.underlying_field.name, "name");
}

#[test]
fn test_unconventional_getter_falls_back_to_body_scan() {
    // getPrimaryName has no `primaryName` field; the compiled body reads
    // `name`, which becomes the underlying field of the attribute.
    let mut class = ClassFile::new("com.example.Person");
    class
        .annotations
        .push(AnnotationDef::valued(markers::ACCESS, "PROPERTY"));
    class.fields.push(field("name", "String", Vec::new()));
    let get_primary_name = getter_reading(&mut class, "getPrimaryName", "name");
    class.methods.push(get_primary_name);

    let registry = registry_with(&[&class]);
    let person = registry.resolve_descriptor("com.example.Person").unwrap();

    assert_eq!(person.attributes.len(), 1);
    let attribute = person.get_persistent_attribute("primaryName").unwrap();
    assert_eq!(attribute.access, AccessKind::Property);
    assert_eq!(attribute.backing.name(), "getPrimaryName");
    assert_eq!(attribute.underlying_field.name, "name");
}

#[test]
fn test_inherited_override_applies_to_subtype() {
    // The root declares Access(FIELD); the subtype's identifier sits on a
    // getter, but the inherited override still wins.
    let mut base = ClassFile::new("com.example.Base");
    base.annotations
        .push(AnnotationDef::valued(markers::ACCESS, "FIELD"));
    base.fields
        .push(field("id", "i64", vec![AnnotationDef::marker(markers::ID)]));

    let mut sub = ClassFile::new("com.example.Sub");
    sub.super_name = Some("com.example.Base".to_string());
    sub.fields.push(field("title", "String", Vec::new()));
    sub.methods.push(getter(
        "getTitle",
        "String",
        vec![AnnotationDef::marker(markers::ID)],
    ));

    let registry = registry_with(&[&base, &sub]);
    let sub = registry.resolve_descriptor("com.example.Sub").unwrap();

    let title = sub.declared_attribute("title").unwrap();
    assert_eq!(title.access, AccessKind::Field);
    assert_eq!(title.backing.kind(), MemberKind::Field);

    // and the inherited identifier attribute is reachable through the chain
    let id = sub.get_persistent_attribute("id").unwrap();
    assert_eq!(id.access, AccessKind::Field);
}

#[test]
fn test_member_override_mixes_strategies() {
    let mut class = ClassFile::new("com.example.Document");
    class
        .fields
        .push(field("id", "i64", vec![AnnotationDef::marker(markers::ID)]));
    class.fields.push(field("body", "String", Vec::new()));
    let mut get_summary = getter_reading(&mut class, "getSummary", "body");
    get_summary
        .annotations
        .push(AnnotationDef::valued(markers::ACCESS, "PROPERTY"));
    class.methods.push(get_summary);

    let registry = registry_with(&[&class]);
    let document = registry.resolve_descriptor("com.example.Document").unwrap();

    // FIELD type overall, with one opted-in property attribute first; the
    // field the property wraps is claimed by it and is not its own attribute
    let names: Vec<&String> = document.attributes.keys().collect();
    assert_eq!(names, ["summary", "id"]);
    assert!(document.get_persistent_attribute("body").is_none());

    let summary = document.get_persistent_attribute("summary").unwrap();
    assert_eq!(summary.access, AccessKind::Property);
    assert!(summary.explicit_access);
    assert_eq!(summary.underlying_field.name, "body");

    assert_eq!(
        document.get_persistent_attribute("id").unwrap().access,
        AccessKind::Field
    );
}

#[test]
fn test_transient_members_are_excluded() {
    let mut class = ClassFile::new("com.example.Person");
    class
        .fields
        .push(field("id", "i64", vec![AnnotationDef::marker(markers::ID)]));
    class.fields.push(field(
        "cachedDisplay",
        "String",
        vec![AnnotationDef::marker(markers::TRANSIENT)],
    ));

    let registry = registry_with(&[&class]);
    let person = registry.resolve_descriptor("com.example.Person").unwrap();

    assert_eq!(person.attributes.len(), 1);
    assert!(person.get_persistent_attribute("cachedDisplay").is_none());
}

#[test]
fn test_boolean_is_getter() {
    let mut class = ClassFile::new("com.example.Person");
    class
        .annotations
        .push(AnnotationDef::valued(markers::ACCESS, "PROPERTY"));
    class.fields.push(field("active", "bool", Vec::new()));
    let is_active = getter_reading(&mut class, "isActive", "active");
    class.methods.push(is_active);

    let registry = registry_with(&[&class]);
    let person = registry.resolve_descriptor("com.example.Person").unwrap();

    let active = person.get_persistent_attribute("active").unwrap();
    assert_eq!(active.backing.name(), "isActive");
    assert_eq!(active.underlying_field.name, "active");
}

#[test]
fn test_context_default_access() {
    // No overrides, no identifier: the registry-wide default decides.
    let mut class = ClassFile::new("com.example.Note");
    class.fields.push(field("text", "String", Vec::new()));

    let mut source = FixtureSource::new();
    source.add(&class);
    let registry =
        DescriptorRegistry::with_default_access(Box::new(source), Some(AccessKind::Field));

    let note = registry.resolve_descriptor("com.example.Note").unwrap();
    let text = note.get_persistent_attribute("text").unwrap();
    assert_eq!(text.access, AccessKind::Field);
}

#[test]
fn test_placement_violation_surfaces() {
    let mut class = ClassFile::new("com.example.Person");
    class.fields.push(field(
        "name",
        "String",
        vec![
            AnnotationDef::marker(markers::ID),
            AnnotationDef::valued(markers::ACCESS, "PROPERTY"),
        ],
    ));

    let registry = registry_with(&[&class]);
    let result = registry.resolve_descriptor("com.example.Person");
    assert!(matches!(
        result,
        Err(ModelError::PropertyAccessOnField { .. })
    ));
}

#[test]
fn test_failed_resolution_publishes_nothing() {
    let mut class = ClassFile::new("com.example.Person");
    class
        .annotations
        .push(AnnotationDef::valued(markers::ACCESS, "PROPERTY"));
    // getter with no body and no matching field cannot resolve
    class.methods.push(getter("getVirtual", "String", Vec::new()));

    let registry = registry_with(&[&class]);
    assert!(registry.resolve_descriptor("com.example.Person").is_err());
    assert!(registry.find_descriptor("com.example.Person").is_none());
}

#[test]
fn test_repeated_resolution_is_shared() {
    let mut class = ClassFile::new("com.example.Person");
    class
        .fields
        .push(field("id", "i64", vec![AnnotationDef::marker(markers::ID)]));

    let registry = registry_with(&[&class]);
    let first = registry.resolve_descriptor("com.example.Person").unwrap();
    let second = registry.resolve_descriptor("com.example.Person").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_three_level_hierarchy() {
    let mut root = ClassFile::new("com.example.Root");
    root.fields
        .push(field("id", "i64", vec![AnnotationDef::marker(markers::ID)]));

    let mut middle = ClassFile::new("com.example.Middle");
    middle.super_name = Some("com.example.Root".to_string());
    middle.fields.push(field("createdAt", "i64", Vec::new()));

    let mut leaf = ClassFile::new("com.example.Leaf");
    leaf.super_name = Some("com.example.Middle".to_string());
    leaf.fields.push(field("name", "String", Vec::new()));

    let registry = registry_with(&[&root, &middle, &leaf]);
    let leaf = registry.resolve_descriptor("com.example.Leaf").unwrap();

    // each level declares only its own attributes
    assert_eq!(leaf.attributes.len(), 1);
    let middle = leaf.super_descriptor.as_ref().unwrap();
    assert_eq!(middle.attributes.len(), 1);
    let root = middle.super_descriptor.as_ref().unwrap();
    assert_eq!(root.attributes.len(), 1);
    assert!(root.super_descriptor.is_none());

    // identifier placement at the root drives the whole hierarchy to FIELD
    assert_eq!(
        leaf.get_persistent_attribute("name").unwrap().access,
        AccessKind::Field
    );
    assert_eq!(
        leaf.get_persistent_attribute("id").unwrap().access,
        AccessKind::Field
    );
}
