//! Backing-field resolution
//!
//! Finds the storage field a getter wraps: by naming convention first,
//! then by scanning the getter's compiled instruction stream. The scan is
//! best-effort and relies on the conventional code shape in which the
//! final field read before return is the field being returned.

use crate::categorize::CategorizedMembers;
use crate::error::ModelError;
use crate::source::{AccessorInfo, ClassInfo, FieldInfo};
use log::debug;
use rustc_hash::FxHashMap;
use strata_classfile::{parse_instructions, Instruction};

/// Lazily parsed getter instruction streams for one type
///
/// Built on first fallback need and memoized, so resolving several
/// accessors of the same type parses each compiled body once.
pub struct GetterBodies<'a> {
    class: &'a ClassInfo,
    bodies: Option<FxHashMap<String, Vec<Instruction>>>,
}

impl<'a> GetterBodies<'a> {
    /// Create an empty, not-yet-parsed view over a type
    pub fn new(class: &'a ClassInfo) -> Self {
        Self {
            class,
            bodies: None,
        }
    }

    fn bodies(&mut self) -> Result<&FxHashMap<String, Vec<Instruction>>, ModelError> {
        let parsed = match self.bodies.take() {
            Some(parsed) => parsed,
            None => {
                debug!(
                    "Parsing getter instruction streams for {}",
                    self.class.name
                );
                let class_file = self.class.class_file();
                let mut parsed = FxHashMap::default();
                for method in &class_file.methods {
                    if method.param_count > 0 {
                        // not getter shaped: takes arguments
                        continue;
                    }
                    if !method.name.starts_with("get") && !method.name.starts_with("is") {
                        continue;
                    }
                    let instructions = parse_instructions(&method.code)
                        .map_err(|e| ModelError::body_decode(&self.class.name, e))?;
                    parsed.insert(method.name.clone(), instructions);
                }
                parsed
            }
        };
        Ok(self.bodies.insert(parsed))
    }
}

/// Resolve the storage field backing a getter-based attribute
///
/// When the convention match fails and the instruction scan locates the
/// field, that field is removed from the plain backing-field set so it is
/// not double-counted as its own direct attribute.
pub fn resolve_underlying_field(
    getter: &AccessorInfo,
    members: &mut CategorizedMembers,
    bodies: &mut GetterBodies<'_>,
) -> Result<FieldInfo, ModelError> {
    let simple_name = getter.simple_match_field_name();
    if let Some(field) = members.all_fields.get(&simple_name) {
        return Ok(field.clone());
    }

    // dig deeper: look at the compiled instruction stream
    let class_name = bodies.class.name.clone();
    let pool = bodies.class.class_file().pool.clone();
    let parsed = bodies.bodies()?;
    let body = parsed.get(&getter.name).ok_or_else(|| ModelError::MetadataAccess {
        class: class_name.clone(),
        reason: format!("no compiled body for getter `{}`", getter.name),
    })?;

    // the last field read before return is, by convention, the returned field
    let mut returned_field: Option<FieldInfo> = None;
    for instruction in body.iter().rev() {
        if instruction.opcode.is_field_read() {
            returned_field = instruction
                .field_name(&pool)
                .and_then(|name| members.all_fields.get(name))
                .cloned();
            break;
        }
    }

    if let Some(field) = returned_field {
        members
            .backing_fields
            .shift_remove(field.attribute_name());
        return Ok(field);
    }

    Err(ModelError::UnresolvableBackingField {
        class: class_name,
        accessor: getter.name.clone(),
    })
}
