//! Member categorization
//!
//! Partitions a type's declared members into the fields known by name, the
//! fields backing attributes directly, and the getters backing attributes
//! indirectly, honoring member-level overrides.

use crate::access::AccessKind;
use crate::error::ModelError;
use crate::source::{markers, AccessorInfo, ClassInfo, FieldInfo};
use indexmap::IndexMap;

/// The categorized members of one type, keyed in declaration order
#[derive(Debug, Default)]
pub struct CategorizedMembers {
    /// Every non-transient declared field, keyed by field name
    ///
    /// Kept regardless of strategy; convention matching and the bytecode
    /// fallback both look fields up here.
    pub all_fields: IndexMap<String, FieldInfo>,
    /// Fields chosen to back attributes directly, keyed by attribute name
    pub backing_fields: IndexMap<String, FieldInfo>,
    /// Getters chosen to back attributes indirectly, keyed by attribute name
    pub backing_getters: IndexMap<String, AccessorInfo>,
}

/// Categorize a type's members under the given class-level strategy
pub fn categorize_members(
    class: &ClassInfo,
    class_level: AccessKind,
) -> Result<CategorizedMembers, ModelError> {
    let mut members = CategorizedMembers::default();

    for field in &class.fields {
        if field.annotations.has(markers::TRANSIENT) {
            continue;
        }

        members.all_fields.insert(field.name.clone(), field.clone());

        if let Some(value) = field.annotations.value_of(markers::ACCESS) {
            let local = parse_member_access(class, &field.name, value)?;
            validate_field_override(class, field, local)?;
            if local == AccessKind::Field {
                insert_backing_field(class, &mut members.backing_fields, field)?;
            }
        } else if class_level == AccessKind::Field {
            insert_backing_field(class, &mut members.backing_fields, field)?;
        }
    }

    for getter in class.getters() {
        if getter.annotations.has(markers::TRANSIENT) {
            continue;
        }

        if let Some(value) = getter.annotations.value_of(markers::ACCESS) {
            let local = parse_member_access(class, &getter.name, value)?;
            validate_getter_override(class, getter, local)?;
            if local == AccessKind::Property {
                insert_backing_getter(class, &mut members.backing_getters, getter)?;
            }
        } else if class_level == AccessKind::Property {
            insert_backing_getter(class, &mut members.backing_getters, getter)?;
        }
    }

    Ok(members)
}

fn parse_member_access(
    class: &ClassInfo,
    member: &str,
    value: &str,
) -> Result<AccessKind, ModelError> {
    AccessKind::from_value(value).ok_or_else(|| ModelError::UnknownAccessStrategy {
        class: class.name.clone(),
        member: member.to_string(),
        value: value.to_string(),
    })
}

/// An explicit PROPERTY override can never sit on a field
fn validate_field_override(
    class: &ClassInfo,
    field: &FieldInfo,
    declared: AccessKind,
) -> Result<(), ModelError> {
    if declared == AccessKind::Property {
        return Err(ModelError::PropertyAccessOnField {
            class: class.name.clone(),
            member: field.name.clone(),
        });
    }
    Ok(())
}

/// An explicit FIELD override can never sit on an accessor method
fn validate_getter_override(
    class: &ClassInfo,
    getter: &AccessorInfo,
    declared: AccessKind,
) -> Result<(), ModelError> {
    if declared == AccessKind::Field {
        return Err(ModelError::FieldAccessOnMethod {
            class: class.name.clone(),
            member: getter.name.clone(),
        });
    }
    Ok(())
}

fn insert_backing_field(
    class: &ClassInfo,
    sink: &mut IndexMap<String, FieldInfo>,
    field: &FieldInfo,
) -> Result<(), ModelError> {
    let attribute = field.attribute_name().to_string();
    if let Some(previous) = sink.insert(attribute.clone(), field.clone()) {
        if previous.name != field.name {
            return Err(ModelError::AmbiguousBackingMember {
                class: class.name.clone(),
                attribute,
            });
        }
    }
    Ok(())
}

fn insert_backing_getter(
    class: &ClassInfo,
    sink: &mut IndexMap<String, AccessorInfo>,
    getter: &AccessorInfo,
) -> Result<(), ModelError> {
    let attribute = getter.attribute_name();
    if let Some(previous) = sink.insert(attribute.clone(), getter.clone()) {
        if previous.name != getter.name {
            return Err(ModelError::AmbiguousBackingMember {
                class: class.name.clone(),
                attribute,
            });
        }
    }
    Ok(())
}
