//! Resolution errors
//!
//! All of these are fatal to the resolution in progress; no partial
//! descriptor is ever published after one of them surfaces.

use strata_classfile::{ClassFileError, DecodeError};
use thiserror::Error;

/// Errors that can occur while resolving the persistent attribute model
#[derive(Debug, Error)]
pub enum ModelError {
    /// `Access(PROPERTY)` declared on a field
    #[error("Field `{class}.{member}` defined Access(PROPERTY); a field cannot carry a property-access override")]
    PropertyAccessOnField {
        /// Owning class name
        class: String,
        /// Field name
        member: String,
    },

    /// `Access(FIELD)` declared on an accessor method
    #[error("Method `{class}.{member}` defined Access(FIELD); a method cannot carry a field-access override")]
    FieldAccessOnMethod {
        /// Owning class name
        class: String,
        /// Method name
        member: String,
    },

    /// Two distinct members resolve to the same attribute name in one backing category
    #[error("Multiple backing members found for attribute `{attribute}` on `{class}`")]
    AmbiguousBackingMember {
        /// Owning class name
        class: String,
        /// Conflicting attribute name
        attribute: String,
    },

    /// No storage field could be located for an accessor-backed attribute
    #[error("Could not locate underlying field for getter `{class}.{accessor}`")]
    UnresolvableBackingField {
        /// Owning class name
        class: String,
        /// Getter method name
        accessor: String,
    },

    /// Identifier markers placed on both a field and an accessor
    #[error("Mismatched placement of identifier markers on `{class}`: {first}, {second}")]
    MismatchedIdentifierPlacement {
        /// Owning class name
        class: String,
        /// First identifier member encountered
        first: String,
        /// Conflicting identifier member
        second: String,
    },

    /// An accessor name does not yield an attribute name stem
    #[error("Could not determine attribute name stem for accessor `{class}.{member}`")]
    UnresolvableNameStem {
        /// Owning class name
        class: String,
        /// Accessor method name
        member: String,
    },

    /// An `Access` annotation carries an unrecognized value
    #[error("Unrecognized access strategy `{value}` on `{class}.{member}`")]
    UnknownAccessStrategy {
        /// Owning class name
        class: String,
        /// Annotated member name (the class name itself for class-level overrides)
        member: String,
        /// The unrecognized value
        value: String,
    },

    /// The metadata provider could not produce class bytes or a compiled-body view
    #[error("Could not access compiled metadata for `{class}`: {reason}")]
    MetadataAccess {
        /// Class name the provider failed on
        class: String,
        /// Underlying cause
        reason: String,
    },
}

impl ModelError {
    /// Wrap a class-file container error as a metadata-access failure
    pub fn metadata(class: &str, cause: ClassFileError) -> Self {
        Self::MetadataAccess {
            class: class.to_string(),
            reason: cause.to_string(),
        }
    }

    /// Wrap a bytecode decode error as a metadata-access failure
    pub fn body_decode(class: &str, cause: DecodeError) -> Self {
        Self::MetadataAccess {
            class: class.to_string(),
            reason: cause.to_string(),
        }
    }
}
