//! Class metadata layer
//!
//! Shapes decoded [`ClassFile`]s into the member model the resolution
//! engine works against: fields, getter/setter-shaped accessors, the
//! identifier member, and annotation queries. Classes are registered in a
//! name-keyed registry; super-class and declared-type links are held as
//! names and chased through the registry on demand, so a self-referential
//! class graph never re-enters construction.

use crate::error::ModelError;
use log::{debug, trace};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::io;
use std::sync::Arc;
use strata_classfile::{AnnotationDef, ClassFile};

/// Well-known annotation names the model layer assigns meaning to
pub mod markers {
    /// Storage-strategy override; value is `FIELD` or `PROPERTY`
    pub const ACCESS: &str = "Access";
    /// Marks the identifier member of a type
    pub const ID: &str = "Id";
    /// Excludes a member from the persistent model
    pub const TRANSIENT: &str = "Transient";
}

/// Annotation-presence and annotation-value queries over a member or class
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationSet {
    annotations: Vec<AnnotationDef>,
}

impl AnnotationSet {
    /// Wrap a decoded annotation list
    pub fn new(annotations: Vec<AnnotationDef>) -> Self {
        Self { annotations }
    }

    /// Whether an annotation with the given name is present
    pub fn has(&self, name: &str) -> bool {
        self.annotations.iter().any(|a| a.name == name)
    }

    /// The value of the named annotation, if present and valued
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.annotations
            .iter()
            .find(|a| a.name == name)
            .and_then(|a| a.value.as_deref())
    }
}

/// The member kinds an annotation can target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// A storage field
    Field,
    /// An accessor method
    Method,
}

/// Identity of a member, used for identifier tracking and diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberId {
    /// Which kind of member this is
    pub kind: MemberKind,
    /// The member's declared name
    pub name: String,
}

/// A storage field declared on a managed type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// Field name
    pub name: String,
    /// Declared type name
    pub type_name: String,
    /// Annotations on the field
    pub annotations: AnnotationSet,
}

impl FieldInfo {
    /// The attribute name this field maps to (the field name itself)
    pub fn attribute_name(&self) -> &str {
        &self.name
    }
}

/// Whether an accessor is getter- or setter-shaped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    /// No parameters, non-void return, `get`/`is` prefix
    Getter,
    /// One parameter, void return, `set` prefix
    Setter,
}

/// A getter- or setter-shaped method declared on a managed type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorInfo {
    /// Method name
    pub name: String,
    /// Getter or setter
    pub kind: AccessorKind,
    /// Return type name for getters, parameter type name for setters
    pub type_name: String,
    /// Annotations on the method
    pub annotations: AnnotationSet,
    /// Capitalized attribute-name fragment extracted from the prefix
    pub name_stem: String,
}

impl AccessorInfo {
    /// The logical attribute name (decapitalized name stem)
    pub fn attribute_name(&self) -> String {
        decapitalize(&self.name_stem)
    }

    /// The field name a getter matches by naming convention
    ///
    /// `getName` matches `name`, `isActive` matches `active`. Only
    /// meaningful for getters.
    pub fn simple_match_field_name(&self) -> String {
        decapitalize(&self.name_stem)
    }
}

/// JavaBeans-style decapitalization
///
/// Lowercases the first character unless the first two characters are both
/// uppercase, in which case the name is left as-is (`URL` stays `URL`).
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    if first.is_uppercase() {
        if let Some(second) = chars.next() {
            if second.is_uppercase() {
                return name.to_string();
            }
        }
    }
    first.to_lowercase().chain(name.chars().skip(1)).collect()
}

/// A managed type's shaped metadata
#[derive(Debug)]
pub struct ClassInfo {
    /// Qualified class name
    pub name: String,
    /// Whether the class is abstract
    pub is_abstract: bool,
    /// Super-class name, resolved through the [`ClassRegistry`] on demand
    pub super_name: Option<String>,
    /// Class-level annotations
    pub annotations: AnnotationSet,
    /// Declared fields, in declaration order
    pub fields: Vec<FieldInfo>,
    /// Declared getter/setter-shaped methods, in declaration order
    pub accessors: Vec<AccessorInfo>,
    /// The identifier member, if one is marked
    pub identifier: Option<MemberId>,
    /// The compiled class, retained for the bytecode fallback view
    class_file: ClassFile,
}

impl ClassInfo {
    /// Shape a decoded class file into class metadata
    ///
    /// Methods that are neither getter- nor setter-shaped are not
    /// collected; identifier markers on members of differing kinds are a
    /// modeling error.
    pub fn from_class_file(class_file: ClassFile) -> Result<Self, ModelError> {
        debug!("Creating ClassInfo({})", class_file.name);

        let name = class_file.name.clone();
        let mut identifier: Option<MemberId> = None;

        let mut fields = Vec::with_capacity(class_file.fields.len());
        for field_def in &class_file.fields {
            let field = FieldInfo {
                name: field_def.name.clone(),
                type_name: field_def.type_name.clone(),
                annotations: AnnotationSet::new(field_def.annotations.clone()),
            };
            identifier = check_for_identifier(
                &name,
                MemberId {
                    kind: MemberKind::Field,
                    name: field.name.clone(),
                },
                &field.annotations,
                identifier,
            )?;
            fields.push(field);
        }

        let mut accessors = Vec::new();
        for method_def in &class_file.methods {
            // SETTER
            if !method_def.returns_value
                && method_def.param_count == 1
                && method_def.name.starts_with("set")
            {
                accessors.push(AccessorInfo {
                    name: method_def.name.clone(),
                    kind: AccessorKind::Setter,
                    type_name: method_def.type_name.clone(),
                    annotations: AnnotationSet::new(method_def.annotations.clone()),
                    name_stem: method_def.name["set".len()..].to_string(),
                });
                continue;
            }

            // GETTER
            if method_def.returns_value && method_def.param_count == 0 {
                let stem = if method_def.name.starts_with("get") {
                    Some(&method_def.name["get".len()..])
                } else if method_def.name.starts_with("is") {
                    Some(&method_def.name["is".len()..])
                } else {
                    None
                };
                if let Some(stem) = stem {
                    if stem.is_empty() {
                        return Err(ModelError::UnresolvableNameStem {
                            class: name,
                            member: method_def.name.clone(),
                        });
                    }
                    let accessor = AccessorInfo {
                        name: method_def.name.clone(),
                        kind: AccessorKind::Getter,
                        type_name: method_def.type_name.clone(),
                        annotations: AnnotationSet::new(method_def.annotations.clone()),
                        name_stem: stem.to_string(),
                    };
                    identifier = check_for_identifier(
                        &name,
                        MemberId {
                            kind: MemberKind::Method,
                            name: accessor.name.clone(),
                        },
                        &accessor.annotations,
                        identifier,
                    )?;
                    accessors.push(accessor);
                }
            }
        }

        Ok(Self {
            name,
            is_abstract: class_file.is_abstract(),
            super_name: class_file.super_name.clone(),
            annotations: AnnotationSet::new(class_file.annotations.clone()),
            fields,
            accessors,
            identifier,
            class_file,
        })
    }

    /// The getter-shaped accessors, in declaration order
    pub fn getters(&self) -> impl Iterator<Item = &AccessorInfo> {
        self.accessors
            .iter()
            .filter(|a| a.kind == AccessorKind::Getter)
    }

    /// Look up a declared field by name
    pub fn find_field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The byte-exact compiled class, for the instruction-stream fallback
    pub fn class_file(&self) -> &ClassFile {
        &self.class_file
    }
}

fn check_for_identifier(
    class: &str,
    member: MemberId,
    annotations: &AnnotationSet,
    current: Option<MemberId>,
) -> Result<Option<MemberId>, ModelError> {
    if !annotations.has(markers::ID) {
        return Ok(current);
    }
    if let Some(current) = current {
        if current.kind != member.kind {
            return Err(ModelError::MismatchedIdentifierPlacement {
                class: class.to_string(),
                first: current.name,
                second: member.name,
            });
        }
    }
    Ok(Some(member))
}

/// Supplies compiled class bytes by qualified name
///
/// This is the narrow locate capability of the class metadata provider; a
/// missing class surfaces as [`io::ErrorKind::NotFound`].
pub trait ClassSource: Send + Sync {
    /// Produce the class bytes for the named class
    fn class_bytes(&self, name: &str) -> io::Result<Vec<u8>>;
}

/// Map-backed class source for tests and in-memory embedders
#[derive(Debug, Default)]
pub struct FixtureSource {
    classes: FxHashMap<String, Vec<u8>>,
}

impl FixtureSource {
    /// Create an empty fixture source
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class by encoding it into its byte form
    pub fn add(&mut self, class: &ClassFile) {
        self.classes.insert(class.name.clone(), class.encode());
    }

    /// Register raw class bytes under a name
    pub fn add_bytes(&mut self, name: &str, bytes: Vec<u8>) {
        self.classes.insert(name.to_string(), bytes);
    }
}

impl ClassSource for FixtureSource {
    fn class_bytes(&self, name: &str) -> io::Result<Vec<u8>> {
        self.classes.get(name).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no class bytes for {name}"))
        })
    }
}

/// Name-keyed cache of shaped class metadata
///
/// Guarantees at most one [`ClassInfo`] per class name for its lifetime.
pub struct ClassRegistry {
    source: Box<dyn ClassSource>,
    classes: Mutex<FxHashMap<String, Arc<ClassInfo>>>,
}

impl ClassRegistry {
    /// Create a registry over the given class source
    pub fn new(source: Box<dyn ClassSource>) -> Self {
        Self {
            source,
            classes: Mutex::new(FxHashMap::default()),
        }
    }

    /// Look up an already-resolved class without building
    pub fn find(&self, name: &str) -> Option<Arc<ClassInfo>> {
        self.classes.lock().get(name).cloned()
    }

    /// Resolve a class by name, building and caching on first reference
    pub fn resolve(&self, name: &str) -> Result<Arc<ClassInfo>, ModelError> {
        trace!("ClassRegistry#resolve({name})");

        if let Some(existing) = self.find(name) {
            return Ok(existing);
        }

        let bytes = self.source.class_bytes(name).map_err(|e| {
            ModelError::MetadataAccess {
                class: name.to_string(),
                reason: e.to_string(),
            }
        })?;
        let class_file = ClassFile::decode(&bytes).map_err(|e| ModelError::metadata(name, e))?;
        let info = Arc::new(ClassInfo::from_class_file(class_file)?);

        // First registration wins if two hosts race on the same name
        let mut classes = self.classes.lock();
        Ok(classes.entry(name.to_string()).or_insert(info).clone())
    }

    /// Resolve the super class of the given class, if it has one
    pub fn resolve_super(&self, class: &ClassInfo) -> Result<Option<Arc<ClassInfo>>, ModelError> {
        match &class.super_name {
            Some(super_name) => Ok(Some(self.resolve(super_name)?)),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("classes", &self.classes.lock().len())
            .finish()
    }
}
