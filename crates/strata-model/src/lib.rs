//! Persistent attribute resolution for Strata managed types
//!
//! Given compiled classes in the Strata class-file format, this crate
//! determines which declared members are persistent attributes, which
//! storage strategy each resolves to, and which storage field ultimately
//! holds each attribute's state. Resolution walks the class hierarchy,
//! honors class- and member-level `Access` overrides, and falls back to
//! scanning compiled getter bodies when naming conventions fail.
//!
//! # Example
//!
//! ```
//! use strata_classfile::{AnnotationDef, ClassFile, FieldDef};
//! use strata_model::{AccessKind, DescriptorRegistry, FixtureSource};
//!
//! let mut class = ClassFile::new("com.example.Person");
//! class.fields.push(FieldDef {
//!     name: "id".to_string(),
//!     type_name: "i64".to_string(),
//!     annotations: vec![AnnotationDef::marker("Id")],
//! });
//! class.fields.push(FieldDef {
//!     name: "name".to_string(),
//!     type_name: "String".to_string(),
//!     annotations: Vec::new(),
//! });
//!
//! let mut source = FixtureSource::new();
//! source.add(&class);
//!
//! let registry = DescriptorRegistry::new(Box::new(source));
//! let person = registry.resolve_descriptor("com.example.Person").unwrap();
//!
//! let name = person.get_persistent_attribute("name").unwrap();
//! assert_eq!(name.access, AccessKind::Field);
//! assert_eq!(name.underlying_field.name, "name");
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod access;
pub mod assemble;
pub mod backing;
pub mod categorize;
pub mod descriptor;
pub mod error;
pub mod source;

pub use access::{class_access_override, determine_class_level_access, find_identifier, AccessKind};
pub use assemble::build_persistent_attributes;
pub use backing::{resolve_underlying_field, GetterBodies};
pub use categorize::{categorize_members, CategorizedMembers};
pub use descriptor::{
    BackingMember, DescriptorRegistry, ManagedTypeDescriptor, PersistentAttribute,
};
pub use error::ModelError;
pub use source::{
    markers, AccessorInfo, AccessorKind, AnnotationSet, ClassInfo, ClassRegistry, ClassSource,
    FieldInfo, FixtureSource, MemberId, MemberKind,
};
