//! Bytecode encoding and decoding utilities
//!
//! This module provides tools for encoding and decoding method-body
//! bytecode and the surrounding class-file container.

use crate::opcode::Opcode;
use thiserror::Error;

/// Errors that can occur during bytecode decoding
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Unexpected end of bytecode stream
    #[error("Unexpected end of bytecode at offset {0}")]
    UnexpectedEnd(usize),

    /// Invalid UTF-8 string
    #[error("Invalid UTF-8 string at offset {0}")]
    InvalidUtf8(usize),

    /// Invalid opcode
    #[error("Invalid opcode {0:#x} at offset {1}")]
    InvalidOpcode(u8, usize),
}

/// Bytecode writer for encoding instructions
///
/// Provides methods for emitting opcodes and their operands into a binary buffer.
pub struct BytecodeWriter {
    /// Internal buffer containing the bytecode
    pub(crate) buffer: Vec<u8>,
}

impl BytecodeWriter {
    /// Create a new bytecode writer
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Create a new bytecode writer with capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Get the current bytecode buffer
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume the writer and return the bytecode buffer
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Get the current offset (length of bytecode)
    pub fn offset(&self) -> usize {
        self.buffer.len()
    }

    // ===== Basic Emission =====

    /// Emit a raw byte
    pub fn emit_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Emit a 16-bit unsigned integer (little-endian)
    pub fn emit_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Emit a 32-bit unsigned integer (little-endian)
    pub fn emit_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Emit a 32-bit signed integer (little-endian)
    pub fn emit_i32(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Emit a 64-bit float (little-endian)
    pub fn emit_f64(&mut self, value: f64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Emit a length-prefixed UTF-8 string
    pub fn emit_string(&mut self, value: &str) {
        self.emit_u32(value.len() as u32);
        self.buffer.extend_from_slice(value.as_bytes());
    }

    /// Patch a previously emitted u32 at the given offset
    pub fn patch_u32(&mut self, offset: usize, value: u32) {
        self.buffer[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    // ===== Opcode Emission =====

    /// Emit an opcode without operands
    pub fn emit_opcode(&mut self, opcode: Opcode) {
        self.emit_u8(opcode.to_u8());
    }

    /// Emit NOP instruction
    pub fn emit_nop(&mut self) {
        self.emit_opcode(Opcode::Nop);
    }

    /// Emit POP instruction
    pub fn emit_pop(&mut self) {
        self.emit_opcode(Opcode::Pop);
    }

    /// Emit DUP instruction
    pub fn emit_dup(&mut self) {
        self.emit_opcode(Opcode::Dup);
    }

    /// Emit CONST_NULL instruction
    pub fn emit_const_null(&mut self) {
        self.emit_opcode(Opcode::ConstNull);
    }

    /// Emit CONST_TRUE instruction
    pub fn emit_const_true(&mut self) {
        self.emit_opcode(Opcode::ConstTrue);
    }

    /// Emit CONST_FALSE instruction
    pub fn emit_const_false(&mut self) {
        self.emit_opcode(Opcode::ConstFalse);
    }

    /// Emit CONST_I32 instruction with value
    pub fn emit_const_i32(&mut self, value: i32) {
        self.emit_opcode(Opcode::ConstI32);
        self.emit_i32(value);
    }

    /// Emit CONST_F64 instruction with value
    pub fn emit_const_f64(&mut self, value: f64) {
        self.emit_opcode(Opcode::ConstF64);
        self.emit_f64(value);
    }

    /// Emit CONST_STR instruction with pool index
    pub fn emit_const_str(&mut self, index: u32) {
        self.emit_opcode(Opcode::ConstStr);
        self.emit_u32(index);
    }

    /// Emit LOAD_LOCAL instruction
    pub fn emit_load_local(&mut self, index: u16) {
        self.emit_opcode(Opcode::LoadLocal);
        self.emit_u16(index);
    }

    /// Emit STORE_LOCAL instruction
    pub fn emit_store_local(&mut self, index: u16) {
        self.emit_opcode(Opcode::StoreLocal);
        self.emit_u16(index);
    }

    /// Emit LOAD_LOCAL_0 instruction (loads `self`)
    pub fn emit_load_local_0(&mut self) {
        self.emit_opcode(Opcode::LoadLocal0);
    }

    /// Emit LOAD_LOCAL_1 instruction
    pub fn emit_load_local_1(&mut self) {
        self.emit_opcode(Opcode::LoadLocal1);
    }

    /// Emit JMP instruction with relative offset
    pub fn emit_jmp(&mut self, offset: i32) {
        self.emit_opcode(Opcode::Jmp);
        self.emit_i32(offset);
    }

    /// Emit JMP_IF_NULL instruction with relative offset
    pub fn emit_jmp_if_null(&mut self, offset: i32) {
        self.emit_opcode(Opcode::JmpIfNull);
        self.emit_i32(offset);
    }

    /// Emit JMP_IF_NOT_NULL instruction with relative offset
    pub fn emit_jmp_if_not_null(&mut self, offset: i32) {
        self.emit_opcode(Opcode::JmpIfNotNull);
        self.emit_i32(offset);
    }

    /// Emit RETURN instruction
    pub fn emit_return(&mut self) {
        self.emit_opcode(Opcode::Return);
    }

    /// Emit RETURN_VOID instruction
    pub fn emit_return_void(&mut self) {
        self.emit_opcode(Opcode::ReturnVoid);
    }

    /// Emit THROW instruction
    pub fn emit_throw(&mut self) {
        self.emit_opcode(Opcode::Throw);
    }

    /// Emit CALL instruction with method-name pool index and argument count
    pub fn emit_call(&mut self, name_index: u32, arg_count: u16) {
        self.emit_opcode(Opcode::Call);
        self.emit_u32(name_index);
        self.emit_u16(arg_count);
    }

    /// Emit LOAD_FIELD instruction with field-name pool index
    pub fn emit_load_field(&mut self, name_index: u32) {
        self.emit_opcode(Opcode::LoadField);
        self.emit_u32(name_index);
    }

    /// Emit STORE_FIELD instruction with field-name pool index
    pub fn emit_store_field(&mut self, name_index: u32) {
        self.emit_opcode(Opcode::StoreField);
        self.emit_u32(name_index);
    }

    /// Emit NEW instruction with class-name pool index
    pub fn emit_new(&mut self, name_index: u32) {
        self.emit_opcode(Opcode::New);
        self.emit_u32(name_index);
    }
}

impl Default for BytecodeWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Bytecode reader for decoding instructions
pub struct BytecodeReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> BytecodeReader<'a> {
    /// Create a new bytecode reader
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Get the current position in the buffer
    pub fn position(&self) -> usize {
        self.position
    }

    /// Get the remaining bytes in the buffer
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Check if there are more bytes to read
    pub fn has_more(&self) -> bool {
        self.position < self.buffer.len()
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        if self.position >= self.buffer.len() {
            return Err(DecodeError::UnexpectedEnd(self.position));
        }
        let value = self.buffer[self.position];
        self.position += 1;
        Ok(value)
    }

    /// Read a 16-bit unsigned integer (little-endian)
    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        if self.position + 2 > self.buffer.len() {
            return Err(DecodeError::UnexpectedEnd(self.position));
        }
        let bytes = [self.buffer[self.position], self.buffer[self.position + 1]];
        self.position += 2;
        Ok(u16::from_le_bytes(bytes))
    }

    /// Read a 32-bit unsigned integer (little-endian)
    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        if self.position + 4 > self.buffer.len() {
            return Err(DecodeError::UnexpectedEnd(self.position));
        }
        let bytes = [
            self.buffer[self.position],
            self.buffer[self.position + 1],
            self.buffer[self.position + 2],
            self.buffer[self.position + 3],
        ];
        self.position += 4;
        Ok(u32::from_le_bytes(bytes))
    }

    /// Read a 32-bit signed integer (little-endian)
    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(self.read_u32()? as i32)
    }

    /// Read a 64-bit float (little-endian)
    pub fn read_f64(&mut self) -> Result<f64, DecodeError> {
        if self.position + 8 > self.buffer.len() {
            return Err(DecodeError::UnexpectedEnd(self.position));
        }
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.buffer[self.position..self.position + 8]);
        self.position += 8;
        Ok(f64::from_le_bytes(bytes))
    }

    /// Read a fixed number of raw bytes
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, DecodeError> {
        if self.position + count > self.buffer.len() {
            return Err(DecodeError::UnexpectedEnd(self.position));
        }
        let bytes = self.buffer[self.position..self.position + count].to_vec();
        self.position += count;
        Ok(bytes)
    }

    /// Read a length-prefixed UTF-8 string
    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        let start = self.position;
        let len = self.read_u32()? as usize;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8(start))
    }
}
