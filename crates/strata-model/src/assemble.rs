//! Attribute assembly
//!
//! Ties the pipeline together: resolve the class-level strategy,
//! categorize the declared members, resolve backing fields, and emit the
//! ordered persistent-attribute map for one type.

use crate::access::{determine_class_level_access, find_identifier, AccessKind};
use crate::backing::{resolve_underlying_field, GetterBodies};
use crate::categorize::categorize_members;
use crate::descriptor::{BackingMember, PersistentAttribute};
use crate::error::ModelError;
use crate::source::{markers, ClassInfo, ClassRegistry};
use indexmap::IndexMap;
use log::debug;

/// Build the persistent attributes declared on one type
///
/// Accessor-backed attributes come first, then the remaining field-backed
/// ones, each group in declaration order. Every emitted attribute carries
/// an underlying storage field.
pub fn build_persistent_attributes(
    class: &ClassInfo,
    context_default: Option<AccessKind>,
    registry: &ClassRegistry,
) -> Result<IndexMap<String, PersistentAttribute>, ModelError> {
    let identifier = find_identifier(class, registry)?;
    let class_level =
        determine_class_level_access(class, identifier.as_ref(), context_default, registry)?;
    debug!(
        "Building persistent attributes for {} with {class_level} access",
        class.name
    );

    let mut members = categorize_members(class, class_level)?;
    let mut bodies = GetterBodies::new(class);
    let mut attributes = IndexMap::new();

    let backing_getters = std::mem::take(&mut members.backing_getters);
    for (name, getter) in backing_getters {
        let underlying_field = resolve_underlying_field(&getter, &mut members, &mut bodies)?;
        let explicit_access = getter.annotations.has(markers::ACCESS);
        attributes.insert(
            name.clone(),
            PersistentAttribute {
                name,
                access: AccessKind::Property,
                explicit_access,
                backing: BackingMember::Accessor(getter),
                underlying_field,
            },
        );
    }

    for (name, field) in std::mem::take(&mut members.backing_fields) {
        // contradictory overrides can route one attribute through both sinks
        if attributes.contains_key(&name) {
            return Err(ModelError::AmbiguousBackingMember {
                class: class.name.clone(),
                attribute: name,
            });
        }
        let explicit_access = field.annotations.has(markers::ACCESS);
        attributes.insert(
            name.clone(),
            PersistentAttribute {
                name,
                access: AccessKind::Field,
                explicit_access,
                backing: BackingMember::Field(field.clone()),
                underlying_field: field,
            },
        );
    }

    Ok(attributes)
}
