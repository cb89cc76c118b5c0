//! Instruction-stream view of compiled method bodies
//!
//! The model layer scans these streams to find the storage field a getter
//! actually returns, so the parser only needs ordered instructions and the
//! ability to name the field referenced by a field-access instruction.

use crate::constants::ConstantPool;
use crate::encoder::{BytecodeReader, DecodeError};
use crate::opcode::Opcode;

/// A decoded instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Byte offset of the opcode within the method body
    pub offset: usize,
    /// The opcode
    pub opcode: Opcode,
    /// Raw operand bytes following the opcode
    pub operands: Vec<u8>,
}

impl Instruction {
    /// Interpret the operand as a u32 pool index, if the opcode carries one
    pub fn operand_u32(&self) -> Option<u32> {
        if self.operands.len() < 4 {
            return None;
        }
        let bytes: [u8; 4] = [
            self.operands[0],
            self.operands[1],
            self.operands[2],
            self.operands[3],
        ];
        Some(u32::from_le_bytes(bytes))
    }

    /// Resolve the field name this instruction references, if it is a field access
    pub fn field_name<'a>(&self, pool: &'a ConstantPool) -> Option<&'a str> {
        if !self.opcode.is_field_access() {
            return None;
        }
        pool.get_string(self.operand_u32()?)
    }
}

/// Parse a method body into its ordered instruction list
pub fn parse_instructions(code: &[u8]) -> Result<Vec<Instruction>, DecodeError> {
    let mut instructions = Vec::new();
    let mut reader = BytecodeReader::new(code);

    while reader.has_more() {
        let offset = reader.position();
        let byte = reader.read_u8()?;

        let opcode = Opcode::from_u8(byte).ok_or(DecodeError::InvalidOpcode(byte, offset))?;

        let operand_size = opcode.operand_size();
        let operands = if operand_size > 0 {
            reader.read_bytes(operand_size)?
        } else {
            Vec::new()
        };

        instructions.push(Instruction {
            offset,
            opcode,
            operands,
        });
    }

    Ok(instructions)
}
