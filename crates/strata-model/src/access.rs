//! Effective storage-strategy resolution
//!
//! Determines whether a type reads and writes its durable state directly
//! through fields or indirectly through accessor methods.

use crate::error::ModelError;
use crate::source::{markers, ClassInfo, ClassRegistry, MemberId, MemberKind};
use std::fmt;

/// Storage strategy for a type or attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    /// Durable state is read and written directly through fields
    Field,
    /// Durable state is read and written through accessor methods
    Property,
}

impl AccessKind {
    /// Parse an `Access` annotation value
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "FIELD" => Some(Self::Field),
            "PROPERTY" => Some(Self::Property),
            _ => None,
        }
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessKind::Field => write!(f, "FIELD"),
            AccessKind::Property => write!(f, "PROPERTY"),
        }
    }
}

/// The class-level `Access` override declared on a class, if any
pub fn class_access_override(class: &ClassInfo) -> Result<Option<AccessKind>, ModelError> {
    match class.annotations.value_of(markers::ACCESS) {
        Some(value) => {
            let kind =
                AccessKind::from_value(value).ok_or_else(|| ModelError::UnknownAccessStrategy {
                    class: class.name.clone(),
                    member: class.name.clone(),
                    value: value.to_string(),
                })?;
            Ok(Some(kind))
        }
        None => Ok(None),
    }
}

/// Locate the identifier member governing a type
///
/// The type's own identifier if it declares one, otherwise the nearest
/// ancestor's.
pub fn find_identifier(
    class: &ClassInfo,
    registry: &ClassRegistry,
) -> Result<Option<MemberId>, ModelError> {
    if let Some(identifier) = &class.identifier {
        return Ok(Some(identifier.clone()));
    }
    match registry.resolve_super(class)? {
        Some(super_class) => find_identifier(&super_class, registry),
        None => Ok(None),
    }
}

/// Determine the class-level storage strategy for a type
///
/// Priority order: an explicit class-level override wins over anything
/// inherited; an ancestor's resolution wins over identifier placement;
/// identifier placement wins over the caller's default; PROPERTY is the
/// conservative fallback. The hierarchy walk carries the *original*
/// type's identifier member.
pub fn determine_class_level_access(
    class: &ClassInfo,
    identifier: Option<&MemberId>,
    context_default: Option<AccessKind>,
    registry: &ClassRegistry,
) -> Result<AccessKind, ModelError> {
    if let Some(explicit) = class_access_override(class)? {
        return Ok(explicit);
    }

    if let Some(super_class) = registry.resolve_super(class)? {
        return determine_class_level_access(&super_class, identifier, None, registry);
    }

    if let Some(identifier) = identifier {
        return Ok(match identifier.kind {
            MemberKind::Field => AccessKind::Field,
            MemberKind::Method => AccessKind::Property,
        });
    }

    Ok(context_default.unwrap_or(AccessKind::Property))
}
