//! Bytecode opcodes for compiled method bodies
//!
//! The instruction set covers what accessor method bodies actually use:
//! constants, locals, field access, calls, control flow and returns.

/// Bytecode opcode enumeration
///
/// All opcodes are single-byte instructions. Some opcodes take additional
/// operands that follow the opcode byte in the bytecode stream.
///
/// Opcodes are organized into categories:
/// - 0x00-0x0F: Stack manipulation & constants
/// - 0x10-0x1F: Local variables
/// - 0x90-0x9F: Control flow
/// - 0xA0-0xAF: Function calls
/// - 0xB0-0xBF: Object operations
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // ===== Stack Manipulation & Constants (0x00-0x0F) =====
    /// No operation
    Nop = 0x00,
    /// Pop top value from stack
    Pop = 0x01,
    /// Duplicate top stack value
    Dup = 0x02,

    /// Push null constant
    ConstNull = 0x04,
    /// Push true constant
    ConstTrue = 0x05,
    /// Push false constant
    ConstFalse = 0x06,
    /// Push 32-bit integer constant (operand: i32)
    ConstI32 = 0x07,
    /// Push 64-bit float constant (operand: f64)
    ConstF64 = 0x08,
    /// Push string constant from pool (operand: u32 index)
    ConstStr = 0x09,

    // ===== Local Variables (0x10-0x1F) =====
    /// Load local variable onto stack (operand: u16 index)
    LoadLocal = 0x10,
    /// Store top of stack to local variable (operand: u16 index)
    StoreLocal = 0x11,
    /// Load local variable 0, i.e. `self` (optimized, no operand)
    LoadLocal0 = 0x12,
    /// Load local variable 1 (optimized, no operand)
    LoadLocal1 = 0x13,

    // ===== Control Flow (0x90-0x9F) =====
    /// Unconditional jump (operand: i32 relative offset)
    Jmp = 0x90,
    /// Jump if top of stack is false (operand: i32 relative offset)
    JmpIfFalse = 0x91,
    /// Jump if top of stack is true (operand: i32 relative offset)
    JmpIfTrue = 0x92,
    /// Jump if top of stack is null (operand: i32 relative offset)
    JmpIfNull = 0x93,
    /// Jump if top of stack is not null (operand: i32 relative offset)
    JmpIfNotNull = 0x94,
    /// Return top of stack
    Return = 0x98,
    /// Return without a value
    ReturnVoid = 0x99,
    /// Throw top of stack as an error
    Throw = 0x9A,

    // ===== Function Calls (0xA0-0xAF) =====
    /// Call a method by pool-indexed name (operands: u32 name index, u16 arg count)
    Call = 0xA0,

    // ===== Object Operations (0xB0-0xBF) =====
    /// Load a field from the object on the stack (operand: u32 field-name pool index)
    LoadField = 0xB0,
    /// Store top of stack into a field (operand: u32 field-name pool index)
    StoreField = 0xB1,
    /// Instantiate a class by pool-indexed name (operand: u32 class-name index)
    New = 0xB2,
}

impl Opcode {
    /// Convert byte to opcode
    ///
    /// Returns None if the byte does not correspond to a valid opcode.
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            // Stack manipulation & constants
            0x00 => Some(Self::Nop),
            0x01 => Some(Self::Pop),
            0x02 => Some(Self::Dup),
            0x04 => Some(Self::ConstNull),
            0x05 => Some(Self::ConstTrue),
            0x06 => Some(Self::ConstFalse),
            0x07 => Some(Self::ConstI32),
            0x08 => Some(Self::ConstF64),
            0x09 => Some(Self::ConstStr),

            // Local variables
            0x10 => Some(Self::LoadLocal),
            0x11 => Some(Self::StoreLocal),
            0x12 => Some(Self::LoadLocal0),
            0x13 => Some(Self::LoadLocal1),

            // Control flow
            0x90 => Some(Self::Jmp),
            0x91 => Some(Self::JmpIfFalse),
            0x92 => Some(Self::JmpIfTrue),
            0x93 => Some(Self::JmpIfNull),
            0x94 => Some(Self::JmpIfNotNull),
            0x98 => Some(Self::Return),
            0x99 => Some(Self::ReturnVoid),
            0x9A => Some(Self::Throw),

            // Function calls
            0xA0 => Some(Self::Call),

            // Object operations
            0xB0 => Some(Self::LoadField),
            0xB1 => Some(Self::StoreField),
            0xB2 => Some(Self::New),

            _ => None,
        }
    }

    /// Convert opcode to byte
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Get the operand size for this opcode (in bytes)
    pub fn operand_size(self) -> usize {
        match self {
            Self::Nop
            | Self::Pop
            | Self::Dup
            | Self::ConstNull
            | Self::ConstTrue
            | Self::ConstFalse
            | Self::LoadLocal0
            | Self::LoadLocal1
            | Self::Return
            | Self::ReturnVoid
            | Self::Throw => 0,

            // 2-byte operands (u16)
            Self::LoadLocal | Self::StoreLocal => 2,

            // 4-byte operands (i32 or u32)
            Self::ConstI32
            | Self::ConstStr
            | Self::Jmp
            | Self::JmpIfFalse
            | Self::JmpIfTrue
            | Self::JmpIfNull
            | Self::JmpIfNotNull
            | Self::LoadField
            | Self::StoreField
            | Self::New => 4,

            // 6-byte operands (u32 + u16)
            Self::Call => 6,

            // 8-byte operands (f64)
            Self::ConstF64 => 8,
        }
    }

    /// Whether this opcode is a jump
    pub fn is_jump(self) -> bool {
        matches!(
            self,
            Self::Jmp | Self::JmpIfFalse | Self::JmpIfTrue | Self::JmpIfNull | Self::JmpIfNotNull
        )
    }

    /// Whether this opcode is a return
    pub fn is_return(self) -> bool {
        matches!(self, Self::Return | Self::ReturnVoid)
    }

    /// Whether this opcode terminates execution of the current method
    pub fn is_terminator(self) -> bool {
        self.is_return() || self == Self::Throw
    }

    /// Whether this opcode reads a named field from an object
    pub fn is_field_read(self) -> bool {
        self == Self::LoadField
    }

    /// Whether this opcode references a field name in the constant pool
    pub fn is_field_access(self) -> bool {
        matches!(self, Self::LoadField | Self::StoreField)
    }
}
