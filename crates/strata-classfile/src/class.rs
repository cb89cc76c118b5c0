//! Compiled class container format

use crate::constants::ConstantPool;
use crate::encoder::{BytecodeReader, BytecodeWriter, DecodeError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Magic number for Strata class files: "STCF"
pub const MAGIC: [u8; 4] = *b"STCF";

/// Current class-file version
pub const VERSION: u32 = 1;

/// Class-file flags
pub mod flags {
    /// The class is abstract
    pub const ABSTRACT: u32 = 1 << 0;
}

/// Class-file encoding/decoding errors
#[derive(Debug, Error)]
pub enum ClassFileError {
    /// Decode error
    #[error("Decode error: {0}")]
    DecodeError(#[from] DecodeError),

    /// Invalid magic number
    #[error("Invalid magic number: expected STCF, got {0:?}")]
    InvalidMagic([u8; 4]),

    /// Unsupported version
    #[error("Unsupported version: {0} (current: {VERSION})")]
    UnsupportedVersion(u32),

    /// Checksum mismatch
    #[error("Checksum mismatch: expected {expected:#x}, got {actual:#x}")]
    ChecksumMismatch {
        /// Checksum stored in the header
        expected: u32,
        /// Checksum calculated over the payload
        actual: u32,
    },
}

/// An annotation attached to a class, field or method
///
/// Annotations are name + optional value pairs. The model layer assigns
/// meaning to well-known names such as `Access`, `Id` and `Transient`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationDef {
    /// Annotation name
    pub name: String,
    /// Optional annotation value
    pub value: Option<String>,
}

impl AnnotationDef {
    /// Create a marker annotation with no value
    pub fn marker(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: None,
        }
    }

    /// Create an annotation with a value
    pub fn valued(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: Some(value.to_string()),
        }
    }

    fn encode(&self, writer: &mut BytecodeWriter) {
        writer.emit_string(&self.name);
        match &self.value {
            Some(value) => {
                writer.emit_u8(1);
                writer.emit_string(value);
            }
            None => writer.emit_u8(0),
        }
    }

    fn decode(reader: &mut BytecodeReader<'_>) -> Result<Self, DecodeError> {
        let name = reader.read_string()?;
        let has_value = reader.read_u8()? != 0;
        let value = if has_value {
            Some(reader.read_string()?)
        } else {
            None
        };
        Ok(Self { name, value })
    }
}

fn encode_annotations(annotations: &[AnnotationDef], writer: &mut BytecodeWriter) {
    writer.emit_u32(annotations.len() as u32);
    for annotation in annotations {
        annotation.encode(writer);
    }
}

fn decode_annotations(reader: &mut BytecodeReader<'_>) -> Result<Vec<AnnotationDef>, DecodeError> {
    let count = reader.read_u32()? as usize;
    let mut annotations = Vec::with_capacity(count);
    for _ in 0..count {
        annotations.push(AnnotationDef::decode(reader)?);
    }
    Ok(annotations)
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Declared type name
    pub type_name: String,
    /// Annotations on the field
    pub annotations: Vec<AnnotationDef>,
}

impl FieldDef {
    fn encode(&self, writer: &mut BytecodeWriter) {
        writer.emit_string(&self.name);
        writer.emit_string(&self.type_name);
        encode_annotations(&self.annotations, writer);
    }

    fn decode(reader: &mut BytecodeReader<'_>) -> Result<Self, DecodeError> {
        let name = reader.read_string()?;
        let type_name = reader.read_string()?;
        let annotations = decode_annotations(reader)?;
        Ok(Self {
            name,
            type_name,
            annotations,
        })
    }
}

/// Method definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDef {
    /// Method name
    pub name: String,
    /// Number of declared parameters (not counting `self`)
    pub param_count: usize,
    /// Whether the method returns a value
    pub returns_value: bool,
    /// Return type name for getters, parameter type name for setters
    pub type_name: String,
    /// Annotations on the method
    pub annotations: Vec<AnnotationDef>,
    /// Compiled body instructions
    pub code: Vec<u8>,
}

impl MethodDef {
    fn encode(&self, writer: &mut BytecodeWriter) {
        writer.emit_string(&self.name);
        writer.emit_u32(self.param_count as u32);
        writer.emit_u8(self.returns_value as u8);
        writer.emit_string(&self.type_name);
        encode_annotations(&self.annotations, writer);
        writer.emit_u32(self.code.len() as u32);
        writer.buffer.extend_from_slice(&self.code);
    }

    fn decode(reader: &mut BytecodeReader<'_>) -> Result<Self, DecodeError> {
        let name = reader.read_string()?;
        let param_count = reader.read_u32()? as usize;
        let returns_value = reader.read_u8()? != 0;
        let type_name = reader.read_string()?;
        let annotations = decode_annotations(reader)?;
        let code_len = reader.read_u32()? as usize;
        let code = reader.read_bytes(code_len)?;
        Ok(Self {
            name,
            param_count,
            returns_value,
            type_name,
            annotations,
            code,
        })
    }
}

/// A compiled class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassFile {
    /// Magic number (must be "STCF")
    pub magic: [u8; 4],
    /// Class-file version
    pub version: u32,
    /// Class flags
    pub flags: u32,
    /// Constant pool referenced by method bodies
    pub pool: ConstantPool,
    /// Qualified class name
    pub name: String,
    /// Qualified super-class name, if any
    pub super_name: Option<String>,
    /// Annotations on the class itself
    pub annotations: Vec<AnnotationDef>,
    /// Declared fields, in declaration order
    pub fields: Vec<FieldDef>,
    /// Declared methods, in declaration order
    pub methods: Vec<MethodDef>,
}

impl ClassFile {
    /// Create a new empty class
    pub fn new(name: &str) -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            flags: 0,
            pool: ConstantPool::new(),
            name: name.to_string(),
            super_name: None,
            annotations: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Whether the class is abstract
    pub fn is_abstract(&self) -> bool {
        self.flags & flags::ABSTRACT != 0
    }

    /// Look up a declared method by name
    pub fn find_method(&self, name: &str) -> Option<&MethodDef> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Validate class-file structure
    pub fn validate(&self) -> Result<(), ClassFileError> {
        if self.magic != MAGIC {
            return Err(ClassFileError::InvalidMagic(self.magic));
        }
        if self.version != VERSION {
            return Err(ClassFileError::UnsupportedVersion(self.version));
        }
        Ok(())
    }

    /// Encode the class to binary format (.stc)
    ///
    /// Format:
    /// - Header: magic (4 bytes) + version (u32) + flags (u32) + checksum (u32)
    /// - Constant pool
    /// - Class record: name, super name, annotations
    /// - Field table
    /// - Method table
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = BytecodeWriter::new();

        let header_start = writer.offset();
        writer.buffer.extend_from_slice(&self.magic);
        writer.emit_u32(self.version);
        writer.emit_u32(self.flags);
        let checksum_offset = writer.offset();
        writer.emit_u32(0); // Placeholder for checksum

        self.pool.encode(&mut writer);

        writer.emit_string(&self.name);
        match &self.super_name {
            Some(super_name) => {
                writer.emit_u8(1);
                writer.emit_string(super_name);
            }
            None => writer.emit_u8(0),
        }
        encode_annotations(&self.annotations, &mut writer);

        writer.emit_u32(self.fields.len() as u32);
        for field in &self.fields {
            field.encode(&mut writer);
        }

        writer.emit_u32(self.methods.len() as u32);
        for method in &self.methods {
            method.encode(&mut writer);
        }

        // Checksum covers everything after the 16-byte header
        let payload = &writer.buffer[header_start + 16..];
        let checksum = crc32fast::hash(payload);
        writer.patch_u32(checksum_offset, checksum);

        writer.into_bytes()
    }

    /// Render the class as pretty-printed JSON, for inspection tooling
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Read a class back from its JSON rendering
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Decode a class from binary format
    pub fn decode(data: &[u8]) -> Result<Self, ClassFileError> {
        let mut reader = BytecodeReader::new(data);

        let magic = reader.read_bytes(4)?;
        let magic: [u8; 4] = magic.try_into().expect("read_bytes returned 4 bytes");
        if magic != MAGIC {
            return Err(ClassFileError::InvalidMagic(magic));
        }

        let version = reader.read_u32()?;
        if version != VERSION {
            return Err(ClassFileError::UnsupportedVersion(version));
        }

        let flags = reader.read_u32()?;
        let stored_checksum = reader.read_u32()?;

        let payload = &data[16..];
        let calculated_checksum = crc32fast::hash(payload);
        if stored_checksum != calculated_checksum {
            return Err(ClassFileError::ChecksumMismatch {
                expected: stored_checksum,
                actual: calculated_checksum,
            });
        }

        let pool = ConstantPool::decode(&mut reader)?;

        let name = reader.read_string()?;
        let has_super = reader.read_u8()? != 0;
        let super_name = if has_super {
            Some(reader.read_string()?)
        } else {
            None
        };
        let annotations = decode_annotations(&mut reader)?;

        let field_count = reader.read_u32()? as usize;
        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            fields.push(FieldDef::decode(&mut reader)?);
        }

        let method_count = reader.read_u32()? as usize;
        let mut methods = Vec::with_capacity(method_count);
        for _ in 0..method_count {
            methods.push(MethodDef::decode(&mut reader)?);
        }

        Ok(Self {
            magic,
            version,
            flags,
            pool,
            name,
            super_name,
            annotations,
            fields,
            methods,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::BytecodeWriter;

    #[test]
    fn test_class_creation() {
        let class = ClassFile::new("com.example.Person");
        assert_eq!(class.magic, MAGIC);
        assert_eq!(class.version, VERSION);
        assert!(!class.is_abstract());
        assert!(class.validate().is_ok());
    }

    #[test]
    fn test_empty_class_roundtrip() {
        let class = ClassFile::new("com.example.Person");
        let bytes = class.encode();
        let decoded = ClassFile::decode(&bytes).unwrap();

        assert_eq!(decoded.name, "com.example.Person");
        assert_eq!(decoded.super_name, None);
        assert!(decoded.fields.is_empty());
        assert!(decoded.methods.is_empty());
    }

    #[test]
    fn test_class_with_members_roundtrip() {
        let mut class = ClassFile::new("com.example.Person");
        class.super_name = Some("com.example.Base".to_string());
        class.flags = flags::ABSTRACT;
        class.annotations.push(AnnotationDef::valued("Access", "FIELD"));

        class.fields.push(FieldDef {
            name: "id".to_string(),
            type_name: "i64".to_string(),
            annotations: vec![AnnotationDef::marker("Id")],
        });

        let name_index = class.pool.intern("name");
        let mut writer = BytecodeWriter::new();
        writer.emit_load_local_0();
        writer.emit_load_field(name_index);
        writer.emit_return();

        class.methods.push(MethodDef {
            name: "getName".to_string(),
            param_count: 0,
            returns_value: true,
            type_name: "String".to_string(),
            annotations: Vec::new(),
            code: writer.into_bytes(),
        });

        let bytes = class.encode();
        let decoded = ClassFile::decode(&bytes).unwrap();

        assert!(decoded.is_abstract());
        assert_eq!(decoded.super_name.as_deref(), Some("com.example.Base"));
        assert_eq!(decoded.annotations[0].value.as_deref(), Some("FIELD"));
        assert_eq!(decoded.fields.len(), 1);
        assert_eq!(decoded.fields[0].annotations[0].name, "Id");
        assert_eq!(decoded.methods.len(), 1);
        assert_eq!(decoded.methods[0].name, "getName");
        assert!(decoded.methods[0].returns_value);
        assert_eq!(decoded.find_method("getName").unwrap().code.len(), 7);
        assert_eq!(decoded.pool.get_string(name_index), Some("name"));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut class = ClassFile::new("com.example.Person");
        class.fields.push(FieldDef {
            name: "id".to_string(),
            type_name: "i64".to_string(),
            annotations: vec![AnnotationDef::marker("Id")],
        });

        let json = class.to_json().unwrap();
        assert!(json.contains("com.example.Person"));

        let parsed = ClassFile::from_json(&json).unwrap();
        assert_eq!(parsed.name, class.name);
        assert_eq!(parsed.fields, class.fields);
    }

    #[test]
    fn test_checksum_validation() {
        let class = ClassFile::new("com.example.Person");
        let mut bytes = class.encode();

        if bytes.len() > 20 {
            bytes[20] ^= 0xFF;
            let result = ClassFile::decode(&bytes);
            assert!(matches!(
                result,
                Err(ClassFileError::ChecksumMismatch { .. })
            ));
        }
    }

    #[test]
    fn test_invalid_magic() {
        let mut bytes = vec![b'X', b'X', b'X', b'X'];
        bytes.extend_from_slice(&VERSION.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());

        let result = ClassFile::decode(&bytes);
        assert!(matches!(result, Err(ClassFileError::InvalidMagic(_))));
    }

    #[test]
    fn test_unsupported_version() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"STCF");
        bytes.extend_from_slice(&999u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());

        let result = ClassFile::decode(&bytes);
        assert!(matches!(
            result,
            Err(ClassFileError::UnsupportedVersion(999))
        ));
    }
}
