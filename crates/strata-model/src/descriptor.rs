//! Managed-type descriptors
//!
//! The resolved output of the engine: per-type attribute maps linked into
//! a descriptor hierarchy, built once per type and shared.

use crate::access::AccessKind;
use crate::assemble::build_persistent_attributes;
use crate::error::ModelError;
use crate::source::{
    AccessorInfo, AnnotationSet, ClassInfo, ClassRegistry, ClassSource, FieldInfo, MemberKind,
};
use indexmap::IndexMap;
use log::{debug, trace};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// The declared member an attribute reads and writes through
#[derive(Debug, Clone)]
pub enum BackingMember {
    /// A field, accessed directly
    Field(FieldInfo),
    /// A getter method, accessed through the accessor pair
    Accessor(AccessorInfo),
}

impl BackingMember {
    /// The declared name of the backing member
    pub fn name(&self) -> &str {
        match self {
            BackingMember::Field(field) => &field.name,
            BackingMember::Accessor(accessor) => &accessor.name,
        }
    }

    /// Which kind of member this is
    pub fn kind(&self) -> MemberKind {
        match self {
            BackingMember::Field(_) => MemberKind::Field,
            BackingMember::Accessor(_) => MemberKind::Method,
        }
    }

    /// Annotations on the backing member
    pub fn annotations(&self) -> &AnnotationSet {
        match self {
            BackingMember::Field(field) => &field.annotations,
            BackingMember::Accessor(accessor) => &accessor.annotations,
        }
    }
}

/// One resolved persistent attribute of a managed type
#[derive(Debug, Clone)]
pub struct PersistentAttribute {
    /// Logical attribute name
    pub name: String,
    /// Storage strategy the attribute resolved to
    pub access: AccessKind,
    /// Whether the backing member carried its own `Access` override
    pub explicit_access: bool,
    /// The member the attribute is accessed through
    pub backing: BackingMember,
    /// The storage field holding the attribute's state
    ///
    /// For field-backed attributes this is the backing member itself; for
    /// accessor-backed attributes it is the field the getter wraps. Always
    /// present.
    pub underlying_field: FieldInfo,
}

/// The resolved persistent model of one managed type
#[derive(Debug)]
pub struct ManagedTypeDescriptor {
    /// The type's shaped metadata
    pub class: Arc<ClassInfo>,
    /// Attributes declared on this type, in resolution order
    pub attributes: IndexMap<String, PersistentAttribute>,
    /// Descriptor of the super type, if there is one
    pub super_descriptor: Option<Arc<ManagedTypeDescriptor>>,
}

impl ManagedTypeDescriptor {
    /// Qualified name of the described type
    pub fn name(&self) -> &str {
        &self.class.name
    }

    /// Look up an attribute declared on this type only
    pub fn declared_attribute(&self, name: &str) -> Option<&PersistentAttribute> {
        self.attributes.get(name)
    }

    /// Look up an attribute on this type or any ancestor
    pub fn get_persistent_attribute(&self, name: &str) -> Option<&PersistentAttribute> {
        if let Some(attribute) = self.attributes.get(name) {
            return Some(attribute);
        }
        self.super_descriptor
            .as_deref()
            .and_then(|sup| sup.get_persistent_attribute(name))
    }
}

/// Name-keyed cache of resolved [`ManagedTypeDescriptor`]s
///
/// Resolution is memoized: the first reference to a type builds its
/// descriptor (and, transitively, its ancestors'); every later reference
/// returns the same shared value.
pub struct DescriptorRegistry {
    classes: ClassRegistry,
    default_access: Option<AccessKind>,
    descriptors: Mutex<FxHashMap<String, Arc<ManagedTypeDescriptor>>>,
}

impl DescriptorRegistry {
    /// Create a registry over the given class source
    pub fn new(source: Box<dyn ClassSource>) -> Self {
        Self::with_default_access(source, None)
    }

    /// Create a registry with a context-wide default storage strategy
    pub fn with_default_access(
        source: Box<dyn ClassSource>,
        default_access: Option<AccessKind>,
    ) -> Self {
        Self {
            classes: ClassRegistry::new(source),
            default_access,
            descriptors: Mutex::new(FxHashMap::default()),
        }
    }

    /// The class registry descriptors are built over
    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    /// Look up an already-resolved descriptor without building
    pub fn find_descriptor(&self, name: &str) -> Option<Arc<ManagedTypeDescriptor>> {
        self.descriptors.lock().get(name).cloned()
    }

    /// Resolve a type's descriptor, building and caching on first reference
    pub fn resolve_descriptor(&self, name: &str) -> Result<Arc<ManagedTypeDescriptor>, ModelError> {
        trace!("DescriptorRegistry#resolve_descriptor({name})");

        if let Some(existing) = self.find_descriptor(name) {
            return Ok(existing);
        }

        let class = self.classes.resolve(name)?;

        // Ancestors resolve first so the link below is to a finished value
        let super_descriptor = match &class.super_name {
            Some(super_name) => Some(self.resolve_descriptor(super_name)?),
            None => None,
        };

        let attributes = build_persistent_attributes(&class, self.default_access, &self.classes)?;
        debug!(
            "Resolved {} persistent attribute(s) for {name}",
            attributes.len()
        );

        let descriptor = Arc::new(ManagedTypeDescriptor {
            class,
            attributes,
            super_descriptor,
        });

        // First registration wins if two hosts race on the same name
        let mut descriptors = self.descriptors.lock();
        Ok(descriptors
            .entry(name.to_string())
            .or_insert(descriptor)
            .clone())
    }
}

impl std::fmt::Debug for DescriptorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorRegistry")
            .field("classes", &self.classes)
            .field("descriptors", &self.descriptors.lock().len())
            .finish()
    }
}
