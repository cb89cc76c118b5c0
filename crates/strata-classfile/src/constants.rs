//! String constant pool for class files
//!
//! Method bodies reference field, method and class names through u32
//! indexes into the pool rather than embedding strings inline.

use crate::encoder::{BytecodeReader, BytecodeWriter, DecodeError};
use serde::{Deserialize, Serialize};

/// Pool of interned strings referenced by bytecode operands
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantPool {
    /// Interned strings, in insertion order
    pub strings: Vec<String>,
}

impl ConstantPool {
    /// Create a new empty constant pool
    pub fn new() -> Self {
        Self {
            strings: Vec::new(),
        }
    }

    /// Add a string to the pool, returning its index
    pub fn add_string(&mut self, value: String) -> u32 {
        self.strings.push(value);
        (self.strings.len() - 1) as u32
    }

    /// Intern a string: reuse the existing index if the value is already pooled
    pub fn intern(&mut self, value: &str) -> u32 {
        if let Some(index) = self.strings.iter().position(|s| s == value) {
            return index as u32;
        }
        self.add_string(value.to_string())
    }

    /// Get a string by index
    pub fn get_string(&self, index: u32) -> Option<&str> {
        self.strings.get(index as usize).map(String::as_str)
    }

    /// Number of pooled strings
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Whether the pool is empty
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Encode the pool to binary
    pub(crate) fn encode(&self, writer: &mut BytecodeWriter) {
        writer.emit_u32(self.strings.len() as u32);
        for value in &self.strings {
            writer.emit_string(value);
        }
    }

    /// Decode a pool from binary
    pub(crate) fn decode(reader: &mut BytecodeReader<'_>) -> Result<Self, DecodeError> {
        let count = reader.read_u32()? as usize;
        let mut strings = Vec::with_capacity(count);
        for _ in 0..count {
            strings.push(reader.read_string()?);
        }
        Ok(Self { strings })
    }
}
